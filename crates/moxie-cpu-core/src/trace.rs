//! Execution tracing hooks.

use std::collections::BTreeMap;

use moxie_isa::{Instruction, Opcode};

/// Observer called by the interpreter. Implementations only see shared data and cannot
/// influence execution.
pub trait ExecutionTracing {
    /// Called once per fetched instruction word, before it executes. `address` is the byte
    /// address of the word.
    #[inline]
    fn trace_instruction(&mut self, _instruction: &Instruction, _address: u32) {}

    /// Called once per 32-bit inline immediate fetched from the instruction stream.
    #[inline]
    fn trace_immediate(&mut self, _value: u32) {}
}

impl<T: ExecutionTracing + ?Sized> ExecutionTracing for &mut T {
    #[inline]
    fn trace_instruction(&mut self, instruction: &Instruction, address: u32) {
        <T as ExecutionTracing>::trace_instruction(&mut **self, instruction, address)
    }

    #[inline]
    fn trace_immediate(&mut self, value: u32) {
        <T as ExecutionTracing>::trace_immediate(&mut **self, value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTracing;

impl ExecutionTracing for NoTracing {}

/// Counts executed opcodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpcodeHistogram {
    counts: BTreeMap<Opcode, u64>,
    illegal: u64,
    immediates: u64,
}

impl OpcodeHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, opcode: Opcode) -> u64 {
        self.counts.get(&opcode).copied().unwrap_or(0)
    }

    /// Fetched words whose opcode bits are unassigned.
    pub fn illegal(&self) -> u64 {
        self.illegal
    }

    pub fn immediates(&self) -> u64 {
        self.immediates
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum::<u64>() + self.illegal
    }

    /// Opcodes ordered by descending count.
    pub fn most_frequent(&self) -> Vec<(Opcode, u64)> {
        let mut out: Vec<_> = self.counts.iter().map(|(&op, &n)| (op, n)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        out
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl ExecutionTracing for OpcodeHistogram {
    fn trace_instruction(&mut self, instruction: &Instruction, _address: u32) {
        match instruction.opcode {
            Some(op) => *self.counts.entry(op).or_insert(0) += 1,
            None => self.illegal += 1,
        }
    }

    fn trace_immediate(&mut self, _value: u32) {
        self.immediates += 1;
    }
}

/// Emits a `tracing` event per instruction and per immediate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracing;

impl ExecutionTracing for LogTracing {
    fn trace_instruction(&mut self, instruction: &Instruction, address: u32) {
        tracing::trace!(target: "moxie::exec", address, "{instruction}");
    }

    fn trace_immediate(&mut self, value: u32) {
        tracing::trace!(target: "moxie::exec", value, "immediate");
    }
}
