use super::hash;
use crate::constants::ADDRESS_LENGTH;
use std::fmt;
use std::str::FromStr;

/// An address identifies a key holder: the first 20 bytes of the hash of its public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(hash(public_key).prefix::<ADDRESS_LENGTH>())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAddressError {
    InvalidHex(String),
    InvalidLength(usize),
}

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ParseAddressError {}

impl TryFrom<&[u8]> for Address {
    type Error = ParseAddressError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; ADDRESS_LENGTH] = slice
            .try_into()
            .map_err(|_| ParseAddressError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| ParseAddressError::InvalidHex(s.to_owned()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_public_key_is_20_bytes_of_hash() {
        let pk = [7u8; 32];
        let address = Address::from_public_key(&pk);
        assert_eq!(&address.0[..], &hash(pk).0[..20]);
    }

    #[test]
    fn test_parse_round_trip() {
        let address = Address([0xab; 20]);
        assert_eq!(Address::from_str(&address.to_string()).unwrap(), address);
    }
}
