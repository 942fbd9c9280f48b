//! Moxie interpreter core.
//!
//! [`Cpu`] fetches 16-bit instruction words through a [`CpuBus`], decodes them with
//! [`moxie_isa::decode`] and executes them against a [`CpuState`]. The bus is either flat
//! physical memory or [`moxie_mmu::PagedMemory`]; the choice is a type parameter fixed at
//! construction.

#![forbid(unsafe_code)]

mod cpu;
pub mod exception;
pub mod interp;
pub mod mem;
pub mod state;
pub mod trace;

pub use cpu::{BatchExit, BatchResult, Cpu, StepExit};
pub use exception::Exception;
pub use mem::CpuBus;
pub use state::{
    CompareStatus, CpuState, ExceptionTrigger, Register, SpecialRegister, GPR_COUNT,
    SPECIAL_COUNT,
};
pub use trace::{ExecutionTracing, LogTracing, NoTracing, OpcodeHistogram};
