//! End-to-end scenarios exercising `Vm` the way a host embedding the
//! substrate would: load a program, run it against a scripted I/O port,
//! and inspect the final state.

use cockpit_vm::io_port::mock::MockIoPort;
use cockpit_vm::{FinalStateSpec, Instruction, InstructionFlags, Vm, VmError};

fn insn(opcode: u8, imm: u16) -> Instruction {
    Instruction::new(opcode, InstructionFlags::empty(), imm)
}

fn vm() -> Vm {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
    Vm::new(Box::new(MockIoPort::new()))
}

#[test]
fn arithmetic_program_halts_with_expected_stack_top() {
    let mut vm = vm();
    // PUSH 40, PUSH 45, ADD, HALT
    vm.execute_program(vec![insn(0x01, 40), insn(0x01, 45), insn(0x03, 0), insn(0x00, 0)])
        .unwrap();

    vm.validate_final_state(&FinalStateSpec {
        halted: true,
        stack_top: Some(85),
        instructions_executed: Some(4),
        ..Default::default()
    })
    .unwrap();
}

#[test]
fn division_by_zero_fails_at_the_dividing_step() {
    let mut vm = vm();
    // PUSH 10, PUSH 0, DIV, HALT
    let result = vm.execute_program(vec![insn(0x01, 10), insn(0x01, 0), insn(0x06, 0), insn(0x00, 0)]);

    assert!(matches!(result, Err(VmError::DivisionByZero)));
    assert!(!vm.is_halted());
    assert_eq!(vm.last_error(), Some(VmError::DivisionByZero));
    assert_eq!(vm.program_counter(), 2);
}

#[test]
fn call_and_return_leave_the_call_value_on_the_stack() {
    let mut vm = vm();
    // 0: CALL 2, 1: HALT, 2: PUSH 7, 3: RET
    vm.execute_program(vec![insn(0x08, 2), insn(0x00, 0), insn(0x01, 7), insn(0x09, 0)])
        .unwrap();

    vm.validate_final_state(&FinalStateSpec {
        halted: true,
        stack_top: Some(7),
        ..Default::default()
    })
    .unwrap();
}

#[test]
fn globals_round_trip_through_store_and_load() {
    let mut vm = vm();
    // PUSH 99, STORE_GLOBAL 3, LOAD_GLOBAL 3, HALT
    vm.execute_program(vec![insn(0x01, 99), insn(0x51, 3), insn(0x50, 3), insn(0x00, 0)])
        .unwrap();

    vm.validate_final_state(&FinalStateSpec {
        halted: true,
        stack_top: Some(99),
        instructions_executed: Some(4),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(vm.memory().load_global(3).unwrap(), 99);
}

#[test]
fn store_array_out_of_bounds_leaves_the_row_active() {
    let mut vm = vm();
    // CREATE_ARRAY 2 (size 4), PUSH 10 (idx), PUSH 1 (value), STORE_ARRAY 2, HALT
    let result = vm.execute_program(vec![
        insn(0x01, 4),
        insn(0x56, 2),
        insn(0x01, 10),
        insn(0x01, 1),
        insn(0x55, 2),
        insn(0x00, 0),
    ]);

    assert!(matches!(result, Err(VmError::MemoryBounds { .. })));
    assert!(vm.memory().is_array_active(2));
}

#[test]
fn invalid_jump_target_leaves_pc_unchanged() {
    let mut vm = vm();
    // JMP 9 (program only has 2 instructions)
    vm.load_program(vec![insn(0x30, 9), insn(0x00, 0)]).unwrap();
    let result = vm.execute_single_step();

    assert!(matches!(result, Err(VmError::InvalidJump { .. })));
    assert!(!vm.is_halted());
    assert_eq!(vm.program_counter(), 0);
}

#[test]
fn reset_preserves_the_loaded_program() {
    let mut vm = vm();
    vm.execute_program(vec![insn(0x01, 1), insn(0x00, 0)]).unwrap();
    assert!(vm.is_halted());

    vm.reset_vm();
    assert!(!vm.is_halted());
    assert_eq!(vm.performance_metrics().instructions_executed(), 0);

    vm.execute_single_step().unwrap();
    assert_eq!(vm.program_counter(), 1);
}
