#![allow(dead_code)]

use moxie_cpu_core::{Cpu, Register};
use moxie_isa::encode::{
    encode_branch, encode_register, encode_short_immediate, long_immediate_words,
};
use moxie_isa::Opcode;
use moxie_mem::PhysicalMemory;

pub const MEMORY_SIZE: usize = 64 * 1024;

/// Assembles a word stream starting at byte address `origin`.
#[derive(Debug, Clone)]
pub struct Program {
    origin: u32,
    words: Vec<u16>,
}

impl Program {
    pub fn at(origin: u32) -> Self {
        assert_eq!(origin % 2, 0);
        Self {
            origin,
            words: Vec::new(),
        }
    }

    /// Byte address of the next word to be emitted.
    pub fn here(&self) -> u32 {
        self.origin + 2 * self.words.len() as u32
    }

    pub fn rr(mut self, op: Opcode, a: Register, b: Register) -> Self {
        self.words.push(encode_register(op, a.index(), b.index()));
        self
    }

    pub fn op(self, op: Opcode) -> Self {
        self.rr(op, Register::FP, Register::FP)
    }

    pub fn r(self, op: Opcode, a: Register) -> Self {
        self.rr(op, a, Register::FP)
    }

    pub fn short(mut self, op: Opcode, a: Register, imm: u8) -> Self {
        self.words.push(encode_short_immediate(op, a.index(), imm));
        self
    }

    pub fn branch(mut self, op: Opcode, displacement: i32) -> Self {
        self.words
            .push(encode_branch(op, displacement).expect("displacement fits"));
        self
    }

    /// An opcode followed by a 32-bit inline immediate.
    pub fn long(mut self, op: Opcode, a: Register, imm: u32) -> Self {
        self.words.push(encode_register(op, a.index(), 0));
        self.words.extend(long_immediate_words(imm));
        self
    }

    /// An opcode followed by a 16-bit signed offset.
    pub fn offset(mut self, op: Opcode, a: Register, b: Register, offset: i16) -> Self {
        self.words.push(encode_register(op, a.index(), b.index()));
        self.words.push(offset as u16);
        self
    }

    pub fn ldi(self, a: Register, value: u32) -> Self {
        self.long(Opcode::LdiL, a, value)
    }

    pub fn word(mut self, word: u16) -> Self {
        self.words.push(word);
        self
    }

    pub fn brk(self) -> Self {
        self.op(Opcode::Brk)
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    pub fn load_into(&self, mem: &mut PhysicalMemory) {
        mem.copy_in(self.origin, &self.bytes()).unwrap();
    }

    pub fn origin(&self) -> u32 {
        self.origin
    }
}

/// A CPU over fresh physical memory holding `program`.
pub fn cpu_with(program: &Program) -> Cpu<PhysicalMemory> {
    let mut mem = PhysicalMemory::new(MEMORY_SIZE).unwrap();
    program.load_into(&mut mem);
    Cpu::new(mem)
}

/// Runs `program` from its origin and expects it to reach `brk`.
pub fn run(program: &Program) -> Cpu<PhysicalMemory> {
    let mut cpu = cpu_with(program);
    cpu.execute(program.origin()).unwrap();
    cpu
}
