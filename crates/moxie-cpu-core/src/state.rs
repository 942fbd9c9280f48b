//! Architectural register state.

use core::cmp::Ordering;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 16;
/// Number of special registers addressable by `gsr`/`ssr`.
pub const SPECIAL_COUNT: usize = 10;

/// General-purpose registers, numbered as they appear in instruction operand fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    FP = 0,
    SP = 1,
    R0 = 2,
    R1 = 3,
    R2 = 4,
    R3 = 5,
    R4 = 6,
    R5 = 7,
    R6 = 8,
    R7 = 9,
    R8 = 10,
    R9 = 11,
    R10 = 12,
    R11 = 13,
    R12 = 14,
    R13 = 15,
}

impl Register {
    pub const ALL: [Register; GPR_COUNT] = [
        Register::FP,
        Register::SP,
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
        Register::R8,
        Register::R9,
        Register::R10,
        Register::R11,
        Register::R12,
        Register::R13,
    ];

    /// Operand-field encoding of this register.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_index(index: u8) -> Option<Register> {
        Register::ALL.get(usize::from(index)).copied()
    }
}

/// Named special registers. Indices 6..=8 are reserved but still readable and writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpecialRegister {
    Status = 0,
    ExceptionHandler = 1,
    ExceptionTrigger = 2,
    SwiRequestNumber = 3,
    SupervisorModeStack = 4,
    ExceptionReturnAddress = 5,
    DeviceTreePointer = 9,
}

impl SpecialRegister {
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Cause codes stored in [`SpecialRegister::ExceptionTrigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ExceptionTrigger {
    DivisionByZero = 0,
    BadInstruction = 1,
    Interrupt = 2,
    SoftwareInterrupt = 3,
    MmuMiss = 4,
    Break = 16,
}

impl ExceptionTrigger {
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Result of the last `cmp`, kept once as a signed and once as an unsigned comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareStatus {
    pub signed: Ordering,
    pub unsigned: Ordering,
}

impl CompareStatus {
    #[inline]
    pub fn of(a: u32, b: u32) -> Self {
        Self {
            signed: (a as i32).cmp(&(b as i32)),
            unsigned: a.cmp(&b),
        }
    }
}

impl Default for CompareStatus {
    fn default() -> Self {
        Self {
            signed: Ordering::Equal,
            unsigned: Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuState {
    pub gpr: [u32; GPR_COUNT],
    pub special: [u32; SPECIAL_COUNT],
    /// Instruction pointer in 16-bit words; the byte address is `ip * 2`.
    pub ip: u32,
    pub compare: CompareStatus,
    pub halted: bool,
}

impl CpuState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn reg(&self, reg: Register) -> u32 {
        self.gpr[usize::from(reg.index())]
    }

    #[inline]
    pub fn set_reg(&mut self, reg: Register, value: u32) {
        self.gpr[usize::from(reg.index())] = value;
    }

    #[inline]
    pub fn sp(&self) -> u32 {
        self.reg(Register::SP)
    }

    #[inline]
    pub fn fp(&self) -> u32 {
        self.reg(Register::FP)
    }

    #[inline]
    pub fn special(&self, reg: SpecialRegister) -> u32 {
        self.special[usize::from(reg.index())]
    }

    #[inline]
    pub fn set_special(&mut self, reg: SpecialRegister, value: u32) {
        self.special[usize::from(reg.index())] = value;
    }

    /// Byte address of the next instruction word.
    #[inline]
    pub fn ip_address(&self) -> u32 {
        self.ip.wrapping_mul(2)
    }
}
