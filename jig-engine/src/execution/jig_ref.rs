use crate::locks::*;
use crate::memory::*;
use crate::types::*;

/// Target of a proxy. Both kinds go through the same host handlers: only the container the
/// values are copied from changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProxyTarget {
    /// The jig lives in the container holding the proxy.
    Local(WasmWord),
    Remote { origin: Pointer, package: PackageId },
}

/// A jig living in a container during the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct JigRef {
    /// Pointer to the jig inside its container.
    pub ptr: WasmWord,
    pub class_idx: u16,
    pub package: PackageId,
    pub origin: Pointer,
    /// Location before the transaction. Equal to the origin for new jigs.
    pub location: Pointer,
    pub lock: JigLock,
    pub is_new: bool,
}

impl JigRef {
    pub fn class_ptr(&self) -> Pointer {
        Pointer::from_hash(self.package, self.class_idx)
    }

    /// How a container holding a proxy of this jig reaches it.
    pub fn proxy_target(&self, from: &PackageId) -> ProxyTarget {
        if self.package == *from {
            ProxyTarget::Local(self.ptr)
        } else {
            ProxyTarget::Remote {
                origin: self.origin,
                package: self.package,
            }
        }
    }

    pub fn change_lock(&mut self, lock: JigLock) {
        self.lock = lock;
    }

    pub fn jig_data(&self) -> JigData {
        JigData {
            origin: self.origin,
            location: self.location,
            class_ptr: self.class_ptr(),
            lock: self.lock.to_lock(),
        }
    }

    /// Wire form of the `Output` object of the jig.
    pub fn output_bytes(&self) -> Vec<u8> {
        self.jig_data().output_bytes()
    }

    /// Wire form of the `JigInitParams` object describing the jig.
    pub fn init_params_bytes(&self) -> Vec<u8> {
        init_params_bytes(&self.origin, &self.location, &self.class_ptr(), &self.lock)
    }
}

pub fn init_params_bytes(
    origin: &Pointer,
    location: &Pointer,
    class_ptr: &Pointer,
    lock: &JigLock,
) -> Vec<u8> {
    let mut writer = BufWriter::new();
    writer
        .write_bytes(&origin.to_bytes())
        .write_bytes(&location.to_bytes())
        .write_bytes(&class_ptr.to_bytes())
        .write_u8(lock.lock_type().as_i32() as u8)
        .write_bytes(&lock.data());
    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jig(package: PackageId) -> JigRef {
        let origin = Pointer::new([1u8; 32], 0);
        JigRef {
            ptr: WasmWord::from_u32(64),
            class_idx: 0,
            package,
            origin,
            location: origin,
            lock: JigLock::None,
            is_new: true,
        }
    }

    #[test]
    fn test_proxy_target() {
        let package = PackageId::from([2u8; 32]);
        let other = PackageId::from([3u8; 32]);
        let jig = jig(package);

        assert_eq!(jig.proxy_target(&package), ProxyTarget::Local(WasmWord::from_u32(64)));
        assert_eq!(
            jig.proxy_target(&other),
            ProxyTarget::Remote {
                origin: jig.origin,
                package
            }
        );
    }

    #[test]
    fn test_init_params_layout() {
        let jig = jig(PackageId::from([2u8; 32]));

        let bytes = jig.init_params_bytes();

        let mut reader = BufReader::new(&bytes);
        assert_eq!(Pointer::from_bytes(&reader.read_bytes().unwrap()).unwrap(), jig.origin);
        assert_eq!(Pointer::from_bytes(&reader.read_bytes().unwrap()).unwrap(), jig.location);
        assert_eq!(
            Pointer::from_bytes(&reader.read_bytes().unwrap()).unwrap(),
            jig.class_ptr()
        );
        assert_eq!(reader.read_u8().unwrap(), 0);
        assert!(reader.read_bytes().unwrap().is_empty());
        reader.expect_end().unwrap();
    }
}
