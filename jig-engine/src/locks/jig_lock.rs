use super::call_stack::*;
use crate::types::*;

/// Lock of a live jig.
///
/// | Lock   | Receives calls                       | Lock can be changed by                      |
/// |--------|--------------------------------------|---------------------------------------------|
/// | None   | never                                | anyone                                      |
/// | Frozen | never                                | nobody                                      |
/// | Pubkey | when the tx is signed by the address | when the tx is signed by the address        |
/// | Caller | when called by the parent            | the parent, or the jig when called by it    |
/// | Anyone | always                               | the jig itself                              |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JigLock {
    Frozen,
    None,
    Pubkey(Address),
    Caller(Pointer),
    Anyone,
}

impl JigLock {
    pub fn lock_type(&self) -> LockType {
        match self {
            JigLock::Frozen => LockType::Frozen,
            JigLock::None => LockType::None,
            JigLock::Pubkey(_) => LockType::Pubkey,
            JigLock::Caller(_) => LockType::Caller,
            JigLock::Anyone => LockType::Anyone,
        }
    }

    pub fn data(&self) -> Vec<u8> {
        match self {
            JigLock::Pubkey(address) => address.as_bytes().to_vec(),
            JigLock::Caller(origin) => origin.to_bytes().to_vec(),
            _ => vec![],
        }
    }

    pub fn to_lock(&self) -> Lock {
        match self {
            JigLock::Frozen => Lock::frozen(),
            JigLock::None => Lock::none(),
            JigLock::Pubkey(address) => Lock::pubkey(address),
            JigLock::Caller(origin) => Lock::caller(origin),
            JigLock::Anyone => Lock::anyone(),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, JigLock::None)
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, JigLock::Frozen)
    }

    /// Checked once the jig being called is on top of the stack.
    pub fn accepts_execution<C: AuthContext + ?Sized>(&self, ctx: &C) -> bool {
        match self {
            JigLock::Frozen | JigLock::None => false,
            JigLock::Pubkey(address) => ctx.signed_by(address),
            JigLock::Caller(parent) => ctx.stack().caller() == Some(parent),
            JigLock::Anyone => true,
        }
    }

    /// Checked with the stack of the code asking for the change.
    pub fn can_be_changed_by<C: AuthContext + ?Sized>(&self, own_origin: &Pointer, ctx: &C) -> bool {
        match self {
            JigLock::Frozen => false,
            JigLock::None => true,
            JigLock::Pubkey(address) => ctx.signed_by(address),
            JigLock::Caller(parent) => self.accepts_change_from(parent, own_origin, ctx),
            JigLock::Anyone => ctx.stack().top() == Some(own_origin),
        }
    }

    /// A caller lock can be changed by the parent while it executes, or by the jig itself when
    /// the parent called it.
    pub fn accepts_change_from<C: AuthContext + ?Sized>(
        &self,
        parent: &Pointer,
        own_origin: &Pointer,
        ctx: &C,
    ) -> bool {
        let stack = ctx.stack();
        match stack.top() {
            Some(top) if top == parent => true,
            Some(top) if top == own_origin => stack.caller() == Some(parent),
            _ => false,
        }
    }
}

impl TryFrom<&Lock> for JigLock {
    type Error = DecodeError;

    fn try_from(lock: &Lock) -> Result<Self, Self::Error> {
        let jig_lock = match lock.lock_type {
            LockType::Frozen => JigLock::Frozen,
            LockType::None => JigLock::None,
            LockType::Pubkey => JigLock::Pubkey(Address::try_from(lock.data.as_slice()).map_err(
                |_| DecodeError::InvalidLength {
                    expected: ADDRESS_LENGTH,
                    actual: lock.data.len(),
                },
            )?),
            LockType::Caller => JigLock::Caller(Pointer::from_bytes(&lock.data)?),
            LockType::Anyone => JigLock::Anyone,
        };
        Ok(jig_lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAuth {
        stack: CallStack,
        signers: Vec<Address>,
    }

    impl TestAuth {
        fn new(frames: &[Pointer]) -> Self {
            let mut stack = CallStack::new();
            for frame in frames {
                stack.push(*frame);
            }
            Self {
                stack,
                signers: vec![],
            }
        }
    }

    impl AuthContext for TestAuth {
        fn stack(&self) -> &CallStack {
            &self.stack
        }

        fn signed_by(&self, address: &Address) -> bool {
            self.signers.contains(address)
        }
    }

    fn ptr(n: u8) -> Pointer {
        Pointer::new([n; 32], 0)
    }

    #[test]
    fn test_none_and_frozen_reject_calls() {
        let ctx = TestAuth::new(&[ptr(1)]);
        assert!(!JigLock::None.accepts_execution(&ctx));
        assert!(!JigLock::Frozen.accepts_execution(&ctx));
        assert!(JigLock::None.can_be_changed_by(&ptr(1), &ctx));
        assert!(!JigLock::Frozen.can_be_changed_by(&ptr(1), &ctx));
    }

    #[test]
    fn test_pubkey_lock_requires_signature() {
        let address = Address([7u8; 20]);
        let lock = JigLock::Pubkey(address);
        let mut ctx = TestAuth::new(&[ptr(1)]);
        assert!(!lock.accepts_execution(&ctx));
        assert!(!lock.can_be_changed_by(&ptr(1), &ctx));

        ctx.signers.push(address);
        assert!(lock.accepts_execution(&ctx));
        assert!(lock.can_be_changed_by(&ptr(1), &ctx));
    }

    #[test]
    fn test_caller_lock() {
        let parent = ptr(1);
        let child = ptr(2);
        let lock = JigLock::Caller(parent);

        // Parent calls the child.
        assert!(lock.accepts_execution(&TestAuth::new(&[parent, child])));
        // Somebody else calls the child.
        assert!(!lock.accepts_execution(&TestAuth::new(&[ptr(3), child])));
        // Top level call.
        assert!(!lock.accepts_execution(&TestAuth::new(&[child])));

        assert!(lock.can_be_changed_by(&child, &TestAuth::new(&[parent])));
        assert!(lock.can_be_changed_by(&child, &TestAuth::new(&[parent, child])));
        assert!(!lock.can_be_changed_by(&child, &TestAuth::new(&[ptr(3), child])));
        assert!(!lock.can_be_changed_by(&child, &TestAuth::new(&[])));
    }

    #[test]
    fn test_anyone_lock() {
        let own = ptr(1);
        let lock = JigLock::Anyone;
        assert!(lock.accepts_execution(&TestAuth::new(&[own])));
        assert!(lock.can_be_changed_by(&own, &TestAuth::new(&[ptr(2), own])));
        assert!(!lock.can_be_changed_by(&own, &TestAuth::new(&[own, ptr(2)])));
        assert!(!lock.can_be_changed_by(&own, &TestAuth::new(&[])));
    }

    #[test]
    fn test_lock_conversion() {
        let lock = JigLock::Caller(ptr(4));
        assert_eq!(JigLock::try_from(&lock.to_lock()).unwrap(), lock);
        assert_eq!(lock.lock_type().as_i32(), 2);
        assert_eq!(JigLock::Frozen.to_lock().lock_type.as_i32(), -1);
        assert_eq!(JigLock::try_from(&Lock::anyone()).unwrap(), JigLock::Anyone);
    }
}
