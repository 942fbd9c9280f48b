/// Encoding format of a 16-bit Moxie instruction word, selected by its top two bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `0xxx_xxxx_AAAA_BBBB`: 8-bit opcode, two register operands.
    Register,
    /// `10oo_AAAA_iiii_iiii`: 4-bit opcode, one register, unsigned 8-bit immediate.
    ShortImmediate,
    /// `11oo_oooo_dddd_dddd`: 6-bit opcode, signed 10-bit displacement.
    Branch,
}

impl Format {
    /// Format of `word`, derived from bits 15..14.
    #[inline]
    pub const fn of(word: u16) -> Self {
        match word & 0xC000 {
            0xC000 => Format::Branch,
            0x8000 => Format::ShortImmediate,
            _ => Format::Register,
        }
    }

    /// Bits of the instruction word occupied by the opcode in this format.
    #[inline]
    pub const fn opcode_mask(self) -> u16 {
        match self {
            Format::Register => 0xFF00,
            Format::ShortImmediate => 0xF000,
            Format::Branch => 0xFC00,
        }
    }
}

macro_rules! opcodes {
    ($($name:ident = $bits:literal, $fmt:ident, $mnemonic:literal;)*) => {
        /// Moxie opcodes.
        ///
        /// Each discriminant is the opcode field left in place within the instruction word
        /// (e.g. `Inc` is `0x8000`, `Beq` is `0xC000`), so `word & format.opcode_mask()`
        /// maps straight onto a variant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum Opcode {
            $($name = $bits,)*
        }

        impl Opcode {
            /// Every defined opcode, register format first.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)*];

            #[inline]
            pub const fn format(self) -> Format {
                match self {
                    $(Opcode::$name => Format::$fmt,)*
                }
            }

            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }

            /// Looks up the opcode encoded in `word`, or `None` if the opcode bits are not
            /// assigned.
            #[inline]
            pub const fn from_word(word: u16) -> Option<Opcode> {
                let format = Format::of(word);
                let bits = word & format.opcode_mask();
                match (format, bits) {
                    $((Format::$fmt, $bits) => Some(Opcode::$name),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    LdiL = 0x0100, Register, "ldi.l";
    Mov = 0x0200, Register, "mov";
    Jsra = 0x0300, Register, "jsra";
    Ret = 0x0400, Register, "ret";
    Add = 0x0500, Register, "add";
    Push = 0x0600, Register, "push";
    Pop = 0x0700, Register, "pop";
    LdaL = 0x0800, Register, "lda.l";
    StaL = 0x0900, Register, "sta.l";
    LdL = 0x0A00, Register, "ld.l";
    StL = 0x0B00, Register, "st.l";
    LdoL = 0x0C00, Register, "ldo.l";
    StoL = 0x0D00, Register, "sto.l";
    Cmp = 0x0E00, Register, "cmp";
    Nop = 0x0F00, Register, "nop";
    SexB = 0x1000, Register, "sex.b";
    SexS = 0x1100, Register, "sex.s";
    ZexB = 0x1200, Register, "zex.b";
    ZexS = 0x1300, Register, "zex.s";
    UmulX = 0x1400, Register, "umul.x";
    MulX = 0x1500, Register, "mul.x";
    Jsr = 0x1900, Register, "jsr";
    Jmpa = 0x1A00, Register, "jmpa";
    LdiB = 0x1B00, Register, "ldi.b";
    LdB = 0x1C00, Register, "ld.b";
    LdaB = 0x1D00, Register, "lda.b";
    StB = 0x1E00, Register, "st.b";
    StaB = 0x1F00, Register, "sta.b";
    LdiS = 0x2000, Register, "ldi.s";
    LdS = 0x2100, Register, "ld.s";
    LdaS = 0x2200, Register, "lda.s";
    StS = 0x2300, Register, "st.s";
    StaS = 0x2400, Register, "sta.s";
    Jmp = 0x2500, Register, "jmp";
    And = 0x2600, Register, "and";
    Lshr = 0x2700, Register, "lshr";
    Ashl = 0x2800, Register, "ashl";
    Sub = 0x2900, Register, "sub";
    Neg = 0x2A00, Register, "neg";
    Or = 0x2B00, Register, "or";
    Not = 0x2C00, Register, "not";
    Ashr = 0x2D00, Register, "ashr";
    Xor = 0x2E00, Register, "xor";
    Mul = 0x2F00, Register, "mul";
    Swi = 0x3000, Register, "swi";
    Div = 0x3100, Register, "div";
    Udiv = 0x3200, Register, "udiv";
    Mod = 0x3300, Register, "mod";
    Umod = 0x3400, Register, "umod";
    Brk = 0x3500, Register, "brk";
    LdoB = 0x3600, Register, "ldo.b";
    StoB = 0x3700, Register, "sto.b";
    LdoS = 0x3800, Register, "ldo.s";
    StoS = 0x3900, Register, "sto.s";

    Inc = 0x8000, ShortImmediate, "inc";
    Dec = 0x9000, ShortImmediate, "dec";
    Gsr = 0xA000, ShortImmediate, "gsr";
    Ssr = 0xB000, ShortImmediate, "ssr";

    Beq = 0xC000, Branch, "beq";
    Bne = 0xC400, Branch, "bne";
    Blt = 0xC800, Branch, "blt";
    Bgt = 0xCC00, Branch, "bgt";
    Bltu = 0xD000, Branch, "bltu";
    Bgtu = 0xD400, Branch, "bgtu";
    Bge = 0xD800, Branch, "bge";
    Ble = 0xDC00, Branch, "ble";
    Bgeu = 0xE000, Branch, "bgeu";
    Bleu = 0xE400, Branch, "bleu";
}

impl Opcode {
    /// Opcode bits of the instruction word (the discriminant).
    #[inline]
    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Number of 16-bit words that follow the instruction word as an inline operand.
    pub const fn immediate_words(self) -> u32 {
        match self {
            Opcode::LdiL
            | Opcode::LdiB
            | Opcode::LdiS
            | Opcode::Jsra
            | Opcode::Jmpa
            | Opcode::LdaL
            | Opcode::LdaB
            | Opcode::LdaS
            | Opcode::StaL
            | Opcode::StaB
            | Opcode::StaS
            | Opcode::Swi => 2,
            Opcode::LdoL
            | Opcode::LdoB
            | Opcode::LdoS
            | Opcode::StoL
            | Opcode::StoB
            | Opcode::StoS => 1,
            _ => 0,
        }
    }
}

impl core::fmt::Display for Opcode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sizes_per_format() {
        let count = |fmt| Opcode::ALL.iter().filter(|op| op.format() == fmt).count();
        assert_eq!(count(Format::Register), 54);
        assert_eq!(count(Format::ShortImmediate), 4);
        assert_eq!(count(Format::Branch), 10);
    }

    #[test]
    fn discriminants_sit_inside_their_format() {
        for &op in Opcode::ALL {
            let bits = op.bits();
            assert_eq!(Format::of(bits), op.format(), "{op:?}");
            assert_eq!(bits & !op.format().opcode_mask(), 0, "{op:?}");
            assert_eq!(Opcode::from_word(bits), Some(op));
        }
    }

    #[test]
    fn unassigned_register_opcodes_are_rejected() {
        for bits in [0x0000u16, 0x1600, 0x1700, 0x1800, 0x3A00, 0x3F00, 0x4000, 0x7F00] {
            assert_eq!(Opcode::from_word(bits), None, "{bits:#06x}");
        }
        assert_eq!(Opcode::from_word(0xC000 | (0x3A << 10)), None);
        assert_eq!(Opcode::from_word(0xF000), None);
    }
}
