//! Instruction word encoders.
//!
//! These are the inverse of [`crate::decode`] for well-formed operands and exist so tests,
//! benchmarks and tooling can assemble small programs without an external toolchain.

use crate::opcode::{Format, Opcode};

/// Encodes a register-format instruction (`op $a, $b`).
///
/// # Panics
/// Panics if `op` is not a register-format opcode.
#[track_caller]
pub fn encode_register(op: Opcode, register_a: u8, register_b: u8) -> u16 {
    assert_eq!(op.format(), Format::Register, "{op:?} is not register format");
    op.bits() | (u16::from(register_a & 0xF) << 4) | u16::from(register_b & 0xF)
}

/// Encodes a short-immediate instruction (`inc`, `dec`, `gsr`, `ssr`).
///
/// # Panics
/// Panics if `op` is not a short-immediate opcode.
#[track_caller]
pub fn encode_short_immediate(op: Opcode, register_a: u8, immediate: u8) -> u16 {
    assert_eq!(
        op.format(),
        Format::ShortImmediate,
        "{op:?} is not short-immediate format"
    );
    op.bits() | (u16::from(register_a & 0xF) << 8) | u16::from(immediate)
}

/// Encodes a conditional branch with a displacement in words, relative to the word after
/// the branch. Returns `None` if the displacement does not fit in 10 signed bits.
///
/// # Panics
/// Panics if `op` is not a branch opcode.
#[track_caller]
pub fn encode_branch(op: Opcode, displacement: i32) -> Option<u16> {
    assert_eq!(op.format(), Format::Branch, "{op:?} is not branch format");
    if !(-512..=511).contains(&displacement) {
        return None;
    }
    Some(op.bits() | (displacement as u16 & 0x03FF))
}

/// Splits a 32-bit inline immediate into the two instruction-stream words that carry it
/// (low half first, matching the little-endian memory layout).
#[inline]
pub const fn long_immediate_words(value: u32) -> [u16; 2] {
    [value as u16, (value >> 16) as u16]
}
