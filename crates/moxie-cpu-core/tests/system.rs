mod common;

use common::{cpu_with, run, Program, MEMORY_SIZE};
use moxie_cpu_core::{
    BatchExit, BatchResult, Cpu, Exception, ExceptionTrigger, OpcodeHistogram, Register,
    SpecialRegister, StepExit,
};
use moxie_isa::Opcode;
use moxie_mem::PhysicalMemory;

const ORIGIN: u32 = 0x100;

#[test]
fn software_interrupt_records_number_and_stops() {
    let program = Program::at(ORIGIN)
        .long(Opcode::Swi, Register::FP, 0x42)
        .short(Opcode::Inc, Register::R0, 1)
        .brk();
    let mut cpu = cpu_with(&program);
    assert_eq!(
        cpu.execute(ORIGIN),
        Err(Exception::SoftwareInterrupt { number: 0x42 })
    );
    assert_eq!(cpu.special_register(SpecialRegister::SwiRequestNumber), 0x42);
    assert_eq!(
        cpu.special_register(SpecialRegister::ExceptionTrigger),
        ExceptionTrigger::SoftwareInterrupt.code()
    );
    assert_eq!(cpu.register(Register::R0), 0);
    assert_eq!(cpu.state().ip_address(), ORIGIN + 6);
}

#[test]
fn special_registers_round_trip_through_gpr() {
    let program = Program::at(ORIGIN)
        .ldi(Register::R0, 123)
        .short(Opcode::Ssr, Register::R0, 6)
        .short(Opcode::Gsr, Register::R1, 6)
        .short(Opcode::Ssr, Register::R0, SpecialRegister::DeviceTreePointer.index())
        .brk();
    let cpu = run(&program);
    assert_eq!(cpu.register(Register::R1), 123);
    assert_eq!(cpu.state().special[6], 123);
    assert_eq!(cpu.special_register(SpecialRegister::DeviceTreePointer), 123);
}

#[test]
fn out_of_range_special_register_faults() {
    for op in [Opcode::Gsr, Opcode::Ssr] {
        let program = Program::at(ORIGIN).short(op, Register::R0, 10).brk();
        let mut cpu = cpu_with(&program);
        assert_eq!(
            cpu.execute(ORIGIN),
            Err(Exception::InvalidSpecialRegister { index: 10 })
        );
    }
}

#[test]
fn illegal_opcodes_fault_with_location() {
    // 0x16xx is a hole in the register-format table, 0xE8xx in the branch table.
    for word in [0x1600u16, 0xE800, 0x3F00] {
        let program = Program::at(ORIGIN).op(Opcode::Nop).word(word).brk();
        let mut cpu = cpu_with(&program);
        assert_eq!(
            cpu.execute(ORIGIN),
            Err(Exception::IllegalOpcode {
                word,
                address: ORIGIN + 2
            })
        );
        assert_eq!(cpu.instructions_executed(), 1);
    }
}

#[test]
fn brk_halts_and_is_counted() {
    let program = Program::at(ORIGIN).op(Opcode::Nop).op(Opcode::Nop).brk();
    let mut cpu = cpu_with(&program);
    cpu.execute(ORIGIN).unwrap();
    assert!(cpu.is_halted());
    assert_eq!(cpu.instructions_executed(), 3);

    assert_eq!(cpu.step(), Ok(StepExit::Halted));
    assert_eq!(cpu.instructions_executed(), 3);
}

#[test]
fn instruction_counter_accumulates_until_reset() {
    let program = Program::at(ORIGIN).op(Opcode::Nop).brk();
    let mut cpu = cpu_with(&program);
    cpu.execute(ORIGIN).unwrap();
    cpu.execute(ORIGIN).unwrap();
    assert_eq!(cpu.instructions_executed(), 4);

    cpu.reset_instruction_count();
    assert_eq!(cpu.instructions_executed(), 0);
    cpu.execute(ORIGIN).unwrap();
    assert_eq!(cpu.instructions_executed(), 2);
}

#[test]
fn run_batch_bounds_an_endless_loop() {
    // The compare status starts out equal, so `beq -1` branches to itself forever.
    let program = Program::at(ORIGIN).branch(Opcode::Beq, -1);
    let mut cpu = cpu_with(&program);
    cpu.reset(ORIGIN).unwrap();

    assert_eq!(
        cpu.run_batch(100),
        BatchResult {
            executed: 100,
            exit: BatchExit::Completed
        }
    );
    assert_eq!(cpu.state().ip_address(), ORIGIN);
    assert_eq!(cpu.instructions_executed(), 100);
}

#[test]
fn run_batch_stops_at_brk_and_faults() {
    let program = Program::at(ORIGIN)
        .op(Opcode::Nop)
        .brk()
        .rr(Opcode::Div, Register::R0, Register::R1);
    let mut cpu = cpu_with(&program);
    cpu.reset(ORIGIN).unwrap();

    assert_eq!(
        cpu.run_batch(10),
        BatchResult {
            executed: 2,
            exit: BatchExit::Halted
        }
    );
    assert_eq!(
        cpu.run_batch(10),
        BatchResult {
            executed: 0,
            exit: BatchExit::Halted
        }
    );

    cpu.reset(ORIGIN + 4).unwrap();
    assert_eq!(
        cpu.run_batch(10),
        BatchResult {
            executed: 0,
            exit: BatchExit::Exception(Exception::DivisionByZero)
        }
    );
}

#[test]
fn reset_initializes_stack_from_memory_size() {
    let mut cpu = Cpu::new(PhysicalMemory::new(1024).unwrap());
    cpu.set_register(Register::R7, 9);
    cpu.reset(0x10).unwrap();
    assert_eq!(cpu.register(Register::SP), 1020);
    assert_eq!(cpu.register(Register::FP), 1020);
    assert_eq!(cpu.state().ip, 8);
    assert_eq!(cpu.register(Register::R7), 9);
}

#[test]
fn compare_status_is_visible() {
    let program = Program::at(ORIGIN)
        .ldi(Register::R0, 0xFFFF_FFFF)
        .short(Opcode::Inc, Register::R1, 1)
        .rr(Opcode::Cmp, Register::R0, Register::R1)
        .brk();
    let status = run(&program).compare_status();
    assert!(status.signed.is_lt());
    assert!(status.unsigned.is_gt());
}

fn traced_program() -> Program {
    Program::at(ORIGIN)
        .ldi(Register::R0, 0x2000)
        .long(Opcode::LdaL, Register::R1, 0x2000)
        .offset(Opcode::LdoL, Register::R2, Register::R0, 4)
        .short(Opcode::Inc, Register::R2, 1)
        .brk()
}

#[test]
fn tracing_sees_each_fetch_and_long_immediate() {
    let program = traced_program();
    let mut mem = PhysicalMemory::new(MEMORY_SIZE).unwrap();
    program.load_into(&mut mem);

    let mut cpu = Cpu::with_tracing(mem, OpcodeHistogram::new());
    cpu.execute(ORIGIN).unwrap();

    let hist = cpu.tracing();
    assert_eq!(hist.total(), 5);
    assert_eq!(hist.count(Opcode::LdiL), 1);
    assert_eq!(hist.count(Opcode::LdaL), 1);
    assert_eq!(hist.count(Opcode::Brk), 1);
    // The 16-bit ldo offset is not a long immediate.
    assert_eq!(hist.immediates(), 2);
}

#[test]
fn tracing_by_reference_and_histogram_is_unaffected_by_faults() {
    let program = Program::at(ORIGIN).op(Opcode::Nop).word(0x1600);
    let mut mem = PhysicalMemory::new(MEMORY_SIZE).unwrap();
    program.load_into(&mut mem);

    let mut hist = OpcodeHistogram::new();
    let mut cpu = Cpu::with_tracing(mem, &mut hist);
    assert!(cpu.execute(ORIGIN).is_err());
    drop(cpu);

    assert_eq!(hist.count(Opcode::Nop), 1);
    assert_eq!(hist.illegal(), 1);
}

#[test]
fn tracing_does_not_change_results() {
    let plain = run(&traced_program());

    let mut mem = PhysicalMemory::new(MEMORY_SIZE).unwrap();
    traced_program().load_into(&mut mem);
    let mut traced = Cpu::with_tracing(mem, moxie_cpu_core::LogTracing);
    traced.execute(ORIGIN).unwrap();

    assert_eq!(plain.state(), traced.state());
    assert_eq!(plain.instructions_executed(), traced.instructions_executed());
}
