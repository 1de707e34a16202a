//! Bounded, deterministic sweeps over the opcode space and array storage,
//! exercising invariants rather than specific scripted scenarios.

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

/// Every byte outside the assigned bands must decode to `InvalidOpcode`,
/// never panic, never silently no-op.
#[test]
fn every_unassigned_opcode_in_the_sweep_range_is_invalid() {
    let unassigned: Vec<u8> = (0x00u16..=0xFF)
        .map(|b| b as u8)
        .filter(|&b| cockpit_vm::OpCode::try_from(b).is_err())
        .collect();

    for opcode in unassigned {
        let mut vm = vm();
        vm.load_program(vec![insn(opcode, 0)]).unwrap();
        let result = vm.execute_single_step();
        assert!(
            matches!(result, Err(VmError::InvalidOpcode { opcode: got }) if got == opcode),
            "opcode {opcode:#04x} should be rejected as invalid"
        );
    }
}

/// Creating, storing into, and loading from every array row across its full
/// element range should round-trip without ever touching an inactive row.
#[test]
fn array_create_store_load_sweep_round_trips() {
    for id in 0u8..16 {
        let mut vm = vm();
        let mut program = vec![insn(0x01, 8), insn(0x56, id as u16)]; // CREATE_ARRAY id, size 8
        for idx in 0u16..8 {
            program.push(insn(0x01, idx)); // idx
            program.push(insn(0x01, (idx + 1) * 10)); // value
            program.push(insn(0x55, id as u16)); // STORE_ARRAY id
        }
        program.push(insn(0x00, 0));
        vm.execute_program(program).unwrap();

        for idx in 0u16..8 {
            assert_eq!(
                vm.memory().load_array(id, idx).unwrap(),
                ((idx + 1) * 10) as i32
            );
        }
    }
}

/// Comparisons across the unsigned/signed bands must agree with plain `i32`
/// semantics whenever both operands are non-negative, regardless of which
/// band or flag combination was used.
#[test]
fn comparisons_agree_with_i32_ordering_for_non_negative_operands() {
    let pairs = [(3, 3), (3, 5), (5, 3), (0, 0), (100, 1)];
    // (unsigned opcode, signed opcode, expected i32 relation)
    let relations: [(u8, u8, fn(i32, i32) -> bool); 6] = [
        (0x20, 0x26, |a, b| a == b),
        (0x21, 0x27, |a, b| a != b),
        (0x22, 0x28, |a, b| a < b),
        (0x23, 0x29, |a, b| a > b),
        (0x24, 0x2A, |a, b| a <= b),
        (0x25, 0x2B, |a, b| a >= b),
    ];

    for &(a, b) in &pairs {
        for &(unsigned_op, signed_op, relation) in &relations {
            let expected = relation(a, b) as i32;
            for opcode in [unsigned_op, signed_op] {
                let mut vm = vm();
                vm.execute_program(vec![insn(0x01, a as u16), insn(0x01, b as u16), insn(opcode, 0), insn(0x00, 0)])
                    .unwrap();
                vm.validate_final_state(&FinalStateSpec {
                    halted: true,
                    stack_top: Some(expected),
                    ..Default::default()
                })
                .unwrap();
            }
        }
    }
}
