use crate::types::Pointer;

/// The minimum amount of coin value a transaction has to burn in order to be accepted.
pub const MIN_FUND_AMOUNT: u64 = 100;

/// Package id of the built-in coin package.
pub const COIN_PACKAGE_ID: [u8; 32] = [0u8; 32];

/// Index of the `Coin` class inside the coin package.
pub const COIN_CLASS_IDX: u16 = 0;

/// Class pointer every coin output carries.
pub const COIN_CLASS_PTR: Pointer = Pointer::new(COIN_PACKAGE_ID, COIN_CLASS_IDX);

/// Name of the coin class, both in its own package and as an implicit import.
pub const COIN_CLASS_NAME: &str = "Coin";

/// Name of the numeric property read when funding a transaction with a coin.
pub const COIN_AMOUNT_FIELD: &str = "amount";

/// Length in bytes of an address (a truncated public key hash).
pub const ADDRESS_LENGTH: usize = 20;
