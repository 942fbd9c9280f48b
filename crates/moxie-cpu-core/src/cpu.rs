use moxie_isa::decode;

use crate::exception::Exception;
use crate::interp::{Exec, ExecOutcome};
use crate::mem::CpuBus;
use crate::state::{CompareStatus, CpuState, Register, SpecialRegister};
use crate::trace::{ExecutionTracing, NoTracing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepExit {
    Continue,
    /// `brk` executed, or the CPU was already halted.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchExit {
    /// The instruction budget ran out.
    Completed,
    Halted,
    Exception(Exception),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub executed: u64,
    pub exit: BatchExit,
}

/// Moxie interpreter bound to one memory bus for its whole lifetime.
#[derive(Debug)]
pub struct Cpu<B: CpuBus, T: ExecutionTracing = NoTracing> {
    state: CpuState,
    bus: B,
    tracing: T,
    instructions: u64,
}

impl<B: CpuBus> Cpu<B, NoTracing> {
    pub fn new(bus: B) -> Self {
        Self::with_tracing(bus, NoTracing)
    }
}

impl<B: CpuBus, T: ExecutionTracing> Cpu<B, T> {
    pub fn with_tracing(bus: B, tracing: T) -> Self {
        Self {
            state: CpuState::new(),
            bus,
            tracing,
            instructions: 0,
        }
    }

    /// Runs from `start_address` until `brk` (returning `Ok`) or the first fault.
    ///
    /// The stack pointer and frame pointer both start 4 bytes below the end of memory.
    /// Other registers keep their current values.
    pub fn execute(&mut self, start_address: u32) -> Result<(), Exception> {
        self.reset(start_address)?;
        tracing::debug!(start_address, sp = self.state.sp(), "execution started");

        loop {
            match self.step() {
                Ok(StepExit::Continue) => {}
                Ok(StepExit::Halted) => {
                    tracing::debug!(
                        ip = self.state.ip_address(),
                        instructions = self.instructions,
                        "execution halted"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(
                        ip = self.state.ip_address(),
                        instructions = self.instructions,
                        fault = %e,
                        "execution faulted"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Prepares the stack and instruction pointer for a run starting at `start_address`
    /// without executing anything. Clears the halted flag.
    pub fn reset(&mut self, start_address: u32) -> Result<(), Exception> {
        if start_address % 2 != 0 {
            return Err(Exception::JumpToUnalignedAddress {
                target: start_address,
            });
        }
        let sp = self.bus.size().wrapping_sub(4);
        self.state.set_reg(Register::SP, sp);
        self.state.set_reg(Register::FP, sp);
        self.state.ip = start_address / 2;
        self.state.halted = false;
        Ok(())
    }

    /// Fetches and executes one instruction.
    pub fn step(&mut self) -> Result<StepExit, Exception> {
        if self.state.halted {
            return Ok(StepExit::Halted);
        }

        let address = self.state.ip_address();
        let word = self.bus.get_short(address)?;
        self.state.ip = self.state.ip.wrapping_add(1);
        let insn = decode(word);
        self.tracing.trace_instruction(&insn, address);

        let outcome = Exec {
            state: &mut self.state,
            bus: &mut self.bus,
            tracing: &mut self.tracing,
        }
        .run(&insn, address)
        .inspect_err(|e| {
            if let Exception::SoftwareInterrupt { number } = e {
                tracing::debug!(number, address, "software interrupt");
            }
        })?;

        self.instructions = self.instructions.wrapping_add(1);
        match outcome {
            ExecOutcome::Continue => Ok(StepExit::Continue),
            ExecOutcome::Halt => {
                self.state.halted = true;
                Ok(StepExit::Halted)
            }
        }
    }

    /// Executes at most `max_instructions` instructions, stopping early on `brk` or a fault.
    pub fn run_batch(&mut self, max_instructions: u64) -> BatchResult {
        if self.state.halted {
            return BatchResult {
                executed: 0,
                exit: BatchExit::Halted,
            };
        }

        let mut executed = 0u64;
        while executed < max_instructions {
            match self.step() {
                Ok(StepExit::Continue) => executed += 1,
                Ok(StepExit::Halted) => {
                    executed += 1;
                    return BatchResult {
                        executed,
                        exit: BatchExit::Halted,
                    };
                }
                Err(e) => {
                    return BatchResult {
                        executed,
                        exit: BatchExit::Exception(e),
                    };
                }
            }
        }

        BatchResult {
            executed,
            exit: BatchExit::Completed,
        }
    }

    /// Instructions completed since construction or the last
    /// [`reset_instruction_count`](Self::reset_instruction_count). `brk` counts; a faulting
    /// instruction does not.
    #[inline]
    pub fn instructions_executed(&self) -> u64 {
        self.instructions
    }

    #[inline]
    pub fn reset_instruction_count(&mut self) {
        self.instructions = 0;
    }

    #[inline]
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    #[inline]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    #[inline]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    #[inline]
    pub fn tracing(&self) -> &T {
        &self.tracing
    }

    #[inline]
    pub fn tracing_mut(&mut self) -> &mut T {
        &mut self.tracing
    }

    #[inline]
    pub fn register(&self, reg: Register) -> u32 {
        self.state.reg(reg)
    }

    #[inline]
    pub fn set_register(&mut self, reg: Register, value: u32) {
        self.state.set_reg(reg, value);
    }

    #[inline]
    pub fn special_register(&self, reg: SpecialRegister) -> u32 {
        self.state.special(reg)
    }

    #[inline]
    pub fn compare_status(&self) -> CompareStatus {
        self.state.compare
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.state.halted
    }
}
