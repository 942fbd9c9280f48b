//! Instruction semantics.

pub mod alu;

use moxie_isa::{Instruction, Opcode};

use crate::exception::Exception;
use crate::mem::CpuBus;
use crate::state::{
    CompareStatus, CpuState, ExceptionTrigger, Register, SpecialRegister, SPECIAL_COUNT,
};
use crate::trace::ExecutionTracing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecOutcome {
    Continue,
    Halt,
}

/// Borrowed view of everything one instruction may touch.
pub(crate) struct Exec<'a, B, T> {
    pub state: &'a mut CpuState,
    pub bus: &'a mut B,
    pub tracing: &'a mut T,
}

impl<B: CpuBus, T: ExecutionTracing> Exec<'_, B, T> {
    /// Executes `insn`, whose word has already been fetched and consumed. `address` is the
    /// byte address the word was fetched from.
    pub(crate) fn run(
        &mut self,
        insn: &Instruction,
        address: u32,
    ) -> Result<ExecOutcome, Exception> {
        let Some(op) = insn.opcode else {
            return Err(Exception::IllegalOpcode {
                word: insn.word,
                address,
            });
        };

        let ra = usize::from(insn.register_a);
        let rb = usize::from(insn.register_b);
        let a = self.state.gpr[ra];
        let b = self.state.gpr[rb];
        let imm8 = insn.value as u32;
        let cmp = self.state.compare;

        match op {
            Opcode::Nop => {}
            Opcode::Brk => return Ok(ExecOutcome::Halt),

            Opcode::Mov => self.state.gpr[ra] = b,
            Opcode::Add => self.state.gpr[ra] = a.wrapping_add(b),
            Opcode::Sub => self.state.gpr[ra] = a.wrapping_sub(b),
            Opcode::Neg => self.state.gpr[ra] = b.wrapping_neg(),
            Opcode::Inc => self.state.gpr[ra] = a.wrapping_add(imm8),
            Opcode::Dec => self.state.gpr[ra] = a.wrapping_sub(imm8),
            Opcode::Mul => self.state.gpr[ra] = alu::mul(a, b),
            Opcode::MulX => self.state.gpr[ra] = alu::mul_high(a, b),
            Opcode::UmulX => self.state.gpr[ra] = alu::umul_high(a, b),
            Opcode::Div => self.state.gpr[ra] = alu::div(a, b)?,
            Opcode::Mod => self.state.gpr[ra] = alu::rem(a, b)?,
            Opcode::Udiv => self.state.gpr[ra] = alu::udiv(a, b)?,
            Opcode::Umod => self.state.gpr[ra] = alu::urem(a, b)?,

            Opcode::And => self.state.gpr[ra] = a & b,
            Opcode::Or => self.state.gpr[ra] = a | b,
            Opcode::Xor => self.state.gpr[ra] = a ^ b,
            Opcode::Not => self.state.gpr[ra] = !b,
            Opcode::Ashl => self.state.gpr[ra] = alu::ashl(a, b),
            Opcode::Ashr => self.state.gpr[ra] = alu::ashr(a, b),
            Opcode::Lshr => self.state.gpr[ra] = alu::lshr(a, b),

            Opcode::SexB => self.state.gpr[ra] = alu::sign_extend_byte(b),
            Opcode::SexS => self.state.gpr[ra] = alu::sign_extend_short(b),
            Opcode::ZexB => self.state.gpr[ra] = b & 0xFF,
            Opcode::ZexS => self.state.gpr[ra] = b & 0xFFFF,

            Opcode::Cmp => self.state.compare = CompareStatus::of(a, b),

            Opcode::Beq => self.branch_if(insn, cmp.signed.is_eq()),
            Opcode::Bne => self.branch_if(insn, cmp.signed.is_ne()),
            Opcode::Blt => self.branch_if(insn, cmp.signed.is_lt()),
            Opcode::Bgt => self.branch_if(insn, cmp.signed.is_gt()),
            Opcode::Ble => self.branch_if(insn, cmp.signed.is_le()),
            Opcode::Bge => self.branch_if(insn, cmp.signed.is_ge()),
            Opcode::Bltu => self.branch_if(insn, cmp.unsigned.is_lt()),
            Opcode::Bgtu => self.branch_if(insn, cmp.unsigned.is_gt()),
            Opcode::Bleu => self.branch_if(insn, cmp.unsigned.is_le()),
            Opcode::Bgeu => self.branch_if(insn, cmp.unsigned.is_ge()),

            Opcode::Jmp => self.jump(a)?,
            Opcode::Jmpa => {
                let target = self.fetch_long()?;
                self.jump(target)?;
            }
            Opcode::Jsr => self.call(a)?,
            Opcode::Jsra => {
                let target = self.fetch_long()?;
                self.call(target)?;
            }
            Opcode::Ret => self.ret()?,

            Opcode::Push => {
                let sp = a.wrapping_sub(4);
                self.bus.store_long(sp, b)?;
                self.state.gpr[ra] = sp;
            }
            Opcode::Pop => {
                let value = self.bus.get_long(a)?;
                self.state.gpr[ra] = a.wrapping_add(4);
                self.state.gpr[rb] = value;
            }

            Opcode::LdiL => self.state.gpr[ra] = self.fetch_long()?,
            Opcode::LdiB => self.state.gpr[ra] = self.fetch_long()? & 0xFF,
            Opcode::LdiS => self.state.gpr[ra] = self.fetch_long()? & 0xFFFF,

            Opcode::LdB => self.state.gpr[ra] = u32::from(self.bus.get_byte(b)?),
            Opcode::LdS => self.state.gpr[ra] = u32::from(self.bus.get_short(b)?),
            Opcode::LdL => self.state.gpr[ra] = self.bus.get_long(b)?,
            Opcode::StB => self.bus.store_byte(a, b as u8)?,
            Opcode::StS => self.bus.store_short(a, b as u16)?,
            Opcode::StL => self.bus.store_long(a, b)?,

            Opcode::LdaB => {
                let addr = self.fetch_long()?;
                self.state.gpr[ra] = u32::from(self.bus.get_byte(addr)?);
            }
            Opcode::LdaS => {
                let addr = self.fetch_long()?;
                self.state.gpr[ra] = u32::from(self.bus.get_short(addr)?);
            }
            Opcode::LdaL => {
                let addr = self.fetch_long()?;
                self.state.gpr[ra] = self.bus.get_long(addr)?;
            }
            Opcode::StaB => {
                let addr = self.fetch_long()?;
                self.bus.store_byte(addr, a as u8)?;
            }
            Opcode::StaS => {
                let addr = self.fetch_long()?;
                self.bus.store_short(addr, a as u16)?;
            }
            Opcode::StaL => {
                let addr = self.fetch_long()?;
                self.bus.store_long(addr, a)?;
            }

            Opcode::LdoB => {
                let addr = b.wrapping_add(self.fetch_offset()?);
                self.state.gpr[ra] = u32::from(self.bus.get_byte(addr)?);
            }
            Opcode::LdoS => {
                let addr = b.wrapping_add(self.fetch_offset()?);
                self.state.gpr[ra] = u32::from(self.bus.get_short(addr)?);
            }
            Opcode::LdoL => {
                let addr = b.wrapping_add(self.fetch_offset()?);
                self.state.gpr[ra] = self.bus.get_long(addr)?;
            }
            Opcode::StoB => {
                let addr = a.wrapping_add(self.fetch_offset()?);
                self.bus.store_byte(addr, b as u8)?;
            }
            Opcode::StoS => {
                let addr = a.wrapping_add(self.fetch_offset()?);
                self.bus.store_short(addr, b as u16)?;
            }
            Opcode::StoL => {
                let addr = a.wrapping_add(self.fetch_offset()?);
                self.bus.store_long(addr, b)?;
            }

            Opcode::Gsr => {
                let index = special_index(imm8)?;
                self.state.gpr[ra] = self.state.special[index];
            }
            Opcode::Ssr => {
                let index = special_index(imm8)?;
                self.state.special[index] = a;
            }

            Opcode::Swi => {
                let number = self.fetch_long()?;
                self.state
                    .set_special(SpecialRegister::SwiRequestNumber, number);
                self.state.set_special(
                    SpecialRegister::ExceptionTrigger,
                    ExceptionTrigger::SoftwareInterrupt.code(),
                );
                return Err(Exception::SoftwareInterrupt { number });
            }
        }

        Ok(ExecOutcome::Continue)
    }

    /// Reads the 32-bit immediate at IP and steps over it.
    fn fetch_long(&mut self) -> Result<u32, Exception> {
        let value = self.bus.get_long(self.state.ip_address())?;
        self.state.ip = self.state.ip.wrapping_add(2);
        self.tracing.trace_immediate(value);
        Ok(value)
    }

    /// Reads the signed 16-bit displacement at IP and steps over it.
    fn fetch_offset(&mut self) -> Result<u32, Exception> {
        let value = self.bus.get_short(self.state.ip_address())?;
        self.state.ip = self.state.ip.wrapping_add(1);
        Ok(value as i16 as i32 as u32)
    }

    #[inline]
    fn branch_if(&mut self, insn: &Instruction, taken: bool) {
        if taken {
            self.state.ip = self.state.ip.wrapping_add_signed(insn.value);
        }
    }

    fn jump(&mut self, target: u32) -> Result<(), Exception> {
        check_aligned(target)?;
        self.state.ip = target / 2;
        Ok(())
    }

    fn call(&mut self, target: u32) -> Result<(), Exception> {
        check_aligned(target)?;
        let return_address = self.state.ip_address();
        let fp = self.state.fp();
        self.push(0)?;
        self.push(return_address)?;
        self.push(fp)?;
        self.state.set_reg(Register::FP, self.state.sp());
        self.state.ip = target / 2;
        Ok(())
    }

    fn ret(&mut self) -> Result<(), Exception> {
        self.state.set_reg(Register::SP, self.state.fp());
        let fp = self.pop()?;
        self.state.set_reg(Register::FP, fp);
        let return_address = self.pop()?;
        self.state.ip = return_address / 2;
        self.pop()?;
        Ok(())
    }

    fn push(&mut self, value: u32) -> Result<(), Exception> {
        let sp = self.state.sp().wrapping_sub(4);
        self.bus.store_long(sp, value)?;
        self.state.set_reg(Register::SP, sp);
        Ok(())
    }

    fn pop(&mut self) -> Result<u32, Exception> {
        let sp = self.state.sp();
        let value = self.bus.get_long(sp)?;
        self.state.set_reg(Register::SP, sp.wrapping_add(4));
        Ok(value)
    }
}

#[inline]
fn check_aligned(target: u32) -> Result<(), Exception> {
    if target % 2 != 0 {
        return Err(Exception::JumpToUnalignedAddress { target });
    }
    Ok(())
}

#[inline]
fn special_index(index: u32) -> Result<usize, Exception> {
    let i = index as usize;
    if i >= SPECIAL_COUNT {
        return Err(Exception::InvalidSpecialRegister { index });
    }
    Ok(i)
}
