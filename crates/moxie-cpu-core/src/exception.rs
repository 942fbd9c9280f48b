use moxie_mmu::AccessError;
use thiserror::Error;

/// A fault raised while executing guest code.
///
/// Every variant is fatal to the current run: the engine stops and leaves registers and
/// memory as of the last completed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Exception {
    #[error("illegal opcode in word {word:#06x} at {address:#010x}")]
    IllegalOpcode { word: u16, address: u32 },

    #[error("division by zero")]
    DivisionByZero,

    #[error("jump to unaligned address {target:#010x}")]
    JumpToUnalignedAddress { target: u32 },

    #[error("special register {index} does not exist")]
    InvalidSpecialRegister { index: u32 },

    #[error("unhandled software interrupt {number:#x}")]
    SoftwareInterrupt { number: u32 },

    #[error(transparent)]
    MemoryAccess(#[from] AccessError),
}

impl From<moxie_mem::MemoryError> for Exception {
    #[inline]
    fn from(err: moxie_mem::MemoryError) -> Self {
        Exception::MemoryAccess(AccessError::Memory(err))
    }
}
