use crate::opcode::{Format, Opcode};
use core::fmt;

/// A decoded instruction word.
///
/// Operand fields that the word's format does not carry are `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The raw instruction word.
    pub word: u16,
    /// `None` when the opcode bits are unassigned; the interpreter rejects these at dispatch.
    pub opcode: Option<Opcode>,
    pub register_a: u8,
    pub register_b: u8,
    /// Signed 10-bit branch displacement, unsigned 8-bit immediate, or `0`.
    pub value: i32,
}

impl Instruction {
    #[inline]
    pub const fn format(&self) -> Format {
        Format::of(self.word)
    }
}

/// Decodes a 16-bit instruction word. Every word decodes to some [`Instruction`].
#[inline]
pub const fn decode(word: u16) -> Instruction {
    let opcode = Opcode::from_word(word);
    match Format::of(word) {
        Format::Branch => {
            let mut value = (word & 0x03FF) as i32;
            if value > 511 {
                value -= 1024;
            }
            Instruction {
                word,
                opcode,
                register_a: 0,
                register_b: 0,
                value,
            }
        }
        Format::ShortImmediate => Instruction {
            word,
            opcode,
            register_a: ((word >> 8) & 0xF) as u8,
            register_b: 0,
            value: (word & 0xFF) as i32,
        },
        Format::Register => Instruction {
            word,
            opcode,
            register_a: ((word >> 4) & 0xF) as u8,
            register_b: (word & 0xF) as u8,
            value: 0,
        },
    }
}

const REGISTER_NAMES: [&str; 16] = [
    "$fp", "$sp", "$r0", "$r1", "$r2", "$r3", "$r4", "$r5", "$r6", "$r7", "$r8", "$r9", "$r10",
    "$r11", "$r12", "$r13",
];

/// Assembler name of general-purpose register `index` (`$fp`, `$sp`, `$r0`..`$r13`).
pub fn register_name(index: u8) -> &'static str {
    REGISTER_NAMES[usize::from(index & 0xF)]
}

impl fmt::Display for Instruction {
    /// Mnemonic and the operands carried by the word itself. Inline immediates that follow
    /// the word are not part of the decoded instruction and are rendered as `<imm>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(op) = self.opcode else {
            return write!(f, ".word {:#06x}", self.word);
        };
        let a = register_name(self.register_a);
        let b = register_name(self.register_b);
        match op {
            Opcode::Nop | Opcode::Ret | Opcode::Brk => write!(f, "{op}"),
            Opcode::Jsra | Opcode::Jmpa | Opcode::Swi => write!(f, "{op} <imm>"),
            Opcode::Jsr | Opcode::Jmp => write!(f, "{op} {a}"),
            Opcode::LdiL | Opcode::LdiB | Opcode::LdiS => write!(f, "{op} {a}, <imm>"),
            Opcode::LdaL | Opcode::LdaB | Opcode::LdaS => write!(f, "{op} {a}, <imm>"),
            Opcode::StaL | Opcode::StaB | Opcode::StaS => write!(f, "{op} <imm>, {a}"),
            Opcode::LdL | Opcode::LdB | Opcode::LdS => write!(f, "{op} {a}, ({b})"),
            Opcode::StL | Opcode::StB | Opcode::StS => write!(f, "{op} ({a}), {b}"),
            Opcode::LdoL | Opcode::LdoB | Opcode::LdoS => write!(f, "{op} {a}, <imm>({b})"),
            Opcode::StoL | Opcode::StoB | Opcode::StoS => write!(f, "{op} <imm>({a}), {b}"),
            Opcode::Inc | Opcode::Dec | Opcode::Gsr | Opcode::Ssr => {
                write!(f, "{op} {a}, {}", self.value)
            }
            Opcode::Beq
            | Opcode::Bne
            | Opcode::Blt
            | Opcode::Bgt
            | Opcode::Bltu
            | Opcode::Bgtu
            | Opcode::Bge
            | Opcode::Ble
            | Opcode::Bgeu
            | Opcode::Bleu => write!(f, "{op} {:+}", self.value),
            _ => write!(f, "{op} {a}, {b}"),
        }
    }
}
