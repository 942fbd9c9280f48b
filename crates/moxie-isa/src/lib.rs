//! Moxie instruction set: opcode table, 16-bit instruction decoding, and encoders.
//!
//! Instructions are one 16-bit word in one of three formats selected by the top two bits
//! (see [`Format`]). Some opcodes are followed by a 16- or 32-bit inline immediate; the
//! decoder only looks at the first word, and the interpreter fetches the rest.

#![forbid(unsafe_code)]

pub mod encode;
mod instruction;
mod opcode;

pub use instruction::{decode, register_name, Instruction};
pub use opcode::{Format, Opcode};
