//! Moxie emulator core.
//!
//! Re-exports the workspace crates under short names:
//! - [`isa`]: opcode table, decoder and encoders
//! - [`mem`]: flat physical memory
//! - [`mmu`]: TLB, page-table walker and the paged memory view
//! - [`cpu`]: the interpreter

#![forbid(unsafe_code)]

pub use moxie_cpu_core as cpu;
pub use moxie_isa as isa;
pub use moxie_mem as mem;
pub use moxie_mmu as mmu;
