//! The `Vm` facade: the single entry point a host embeds (§4.4).
//!
//! `Vm` composes exactly one Memory Context, one I/O Port, and one
//! Execution Engine, and is the only public type that owns all three at
//! once. Everything else in the crate is reachable through it but can also
//! be driven directly by a host that wants finer control (e.g. a debugger
//! stepping the engine without going through the facade).

use std::time::Duration;

use crate::config::STEP_BUDGET_MULTIPLIER;
use crate::dispatch::Memory;
use crate::engine::ExecutionEngine;
use crate::error::{VmError, VmResult};
use crate::instruction::Instruction;
use crate::io_port::IoPort;
use crate::metrics::PerformanceMetrics;
use crate::observer::{Observer, ObserverRegistry};

/// Expected end state after a program finishes, for use by
/// [`Vm::validate_final_state`] in tests and host-side conformance checks.
/// Any field left `None` is not checked.
#[derive(Debug, Clone, Default)]
pub struct FinalStateSpec {
    pub halted: bool,
    pub stack_pointer: Option<usize>,
    pub program_counter: Option<usize>,
    pub stack_top: Option<i32>,
    pub instructions_executed: Option<u64>,
    pub last_error: Option<VmError>,
}

/// The composed VM: one program, one memory context, one I/O port, one
/// execution engine. The I/O port is owned here, not borrowed per call
/// (§4.4, §5 "the I/O Port is owned by the Facade").
pub struct Vm {
    program: Option<Vec<Instruction>>,
    memory: Memory,
    engine: ExecutionEngine,
    io: Box<dyn IoPort>,
    observers: ObserverRegistry,
    metrics: PerformanceMetrics,
}

impl Vm {
    pub fn new(io: Box<dyn IoPort>) -> Self {
        Self {
            program: None,
            memory: Memory::new(),
            engine: ExecutionEngine::new(),
            io,
            observers: ObserverRegistry::new(),
            metrics: PerformanceMetrics::new(),
        }
    }

    /// Loads a program, replacing any previously loaded one. Fails if
    /// `instructions` is empty. Resets `pc`/`halted`/`last_error` but not
    /// memory or metrics (§4.4) — call [`Self::reset_vm`] for that.
    pub fn load_program(&mut self, instructions: Vec<Instruction>) -> VmResult<()> {
        if instructions.is_empty() {
            return Err(VmError::ExecutionFailed {
                reason: "load_program requires a non-empty instruction sequence",
            });
        }
        log::info!("loading program with {} instructions", instructions.len());
        self.program = Some(instructions);
        self.engine.reset();
        Ok(())
    }

    /// Registers an observer and returns a handle for later removal.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) -> usize {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, handle: usize) {
        self.observers.remove(handle);
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    /// Loads `instructions` and runs to completion: `HALT` (success), the
    /// first error (failure), or a runaway-loop bound of
    /// `instructions.len() * STEP_BUDGET_MULTIPLIER` steps without halting
    /// (failure, §4.4).
    pub fn execute_program(&mut self, instructions: Vec<Instruction>) -> VmResult<()> {
        self.load_program(instructions)?;
        self.metrics.reset();
        self.run_loaded_program()
    }

    /// Executes exactly one fetch/decode/dispatch cycle against the
    /// currently loaded program. Fails with [`VmError::ProgramNotLoaded`] if
    /// none is loaded.
    pub fn execute_single_step(&mut self) -> VmResult<()> {
        let program = self.program.clone().ok_or(VmError::ProgramNotLoaded)?;
        self.step_once(&program)
    }

    fn run_loaded_program(&mut self) -> VmResult<()> {
        let program = self.program.clone().ok_or(VmError::ProgramNotLoaded)?;
        let started_ms = self.io.millis();
        let max_steps = program.len() as u64 * STEP_BUDGET_MULTIPLIER;

        let mut steps = 0u64;
        let result = loop {
            if self.engine.is_halted() {
                break Ok(());
            }
            if steps >= max_steps {
                break Err(VmError::ExecutionFailed {
                    reason: "exceeded the program-length step budget without reaching HALT",
                });
            }
            match self.step_once(&program) {
                Ok(()) => steps += 1,
                Err(err) => break Err(err),
            }
        };

        // Wall-clock delta derived from `io.millis()` (§4.4), not
        // `Instant`, so timing stays deterministic under `MockIoPort` and
        // under any host clock the I/O Port chooses to expose.
        let elapsed_ms = self.io.millis().wrapping_sub(started_ms) as u64;
        let elapsed = Duration::from_millis(elapsed_ms);
        self.metrics.record_execution(result.is_ok(), elapsed);
        self.observers
            .notify_execution_complete(self.engine.instructions_executed(), elapsed_ms);

        if let Err(err) = &result {
            log::warn!("program execution stopped: {err}");
        }
        result
    }

    fn step_once(&mut self, program: &[Instruction]) -> VmResult<()> {
        let pc_before = self.engine.pc();
        self.engine.step(program, &mut self.memory, self.io.as_mut())?;
        self.metrics.record_instruction();
        if let Some(instruction) = program.get(pc_before) {
            match instruction.opcode {
                0x10..=0x1A => self.metrics.record_io_operation(),
                0x50..=0x56 => self.metrics.record_memory_operation(),
                _ => {}
            }
            self.observers
                .notify_instruction_executed(pc_before, instruction.opcode, instruction.immediate);
        }
        Ok(())
    }

    /// Resets the engine, memory, and metrics, then reinitialises the
    /// hardware (`reset_hardware` followed by `initialize_hardware`) and
    /// notifies observers. The loaded program and registered observers
    /// survive a reset (§4.4).
    pub fn reset_vm(&mut self) {
        self.engine.reset();
        self.memory.reset();
        self.metrics.reset();
        self.io.reset_hardware();
        self.io.initialize_hardware();
        self.observers.notify_vm_reset();
    }

    pub fn is_running(&self) -> bool {
        !self.engine.is_halted() && self.engine.last_error().is_none()
    }

    pub fn is_halted(&self) -> bool {
        self.engine.is_halted()
    }

    pub fn instruction_count(&self) -> u64 {
        self.engine.instructions_executed()
    }

    pub fn program_counter(&self) -> usize {
        self.engine.pc()
    }

    pub fn stack_pointer(&self) -> usize {
        self.engine.stack().sp()
    }

    pub fn last_error(&self) -> Option<VmError> {
        self.engine.last_error()
    }

    /// The stable human-readable form of the last recorded error, if any.
    pub fn error_string(&self) -> Option<String> {
        self.engine.last_error().map(|err| err.error_string())
    }

    pub fn performance_metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn reset_performance_metrics(&mut self) {
        self.metrics.reset();
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Validates the operand stack's debug-build canaries (§5). A no-op
    /// success in release builds.
    pub fn validate_memory_integrity(&self) -> VmResult<()> {
        self.engine.stack().validate_canaries()
    }

    /// Checks the current engine state against an expected
    /// [`FinalStateSpec`], for use in conformance tests. Returns the first
    /// mismatch as an `ExecutionFailed` error.
    pub fn validate_final_state(&self, spec: &FinalStateSpec) -> VmResult<()> {
        if self.engine.is_halted() != spec.halted {
            return Err(VmError::ExecutionFailed {
                reason: "halted flag did not match expected final state",
            });
        }
        if let Some(expected_sp) = spec.stack_pointer {
            if self.engine.stack().sp() != expected_sp {
                return Err(VmError::ExecutionFailed {
                    reason: "stack pointer did not match expected final state",
                });
            }
        }
        if let Some(expected_pc) = spec.program_counter {
            if self.engine.pc() != expected_pc {
                return Err(VmError::ExecutionFailed {
                    reason: "program counter did not match expected final state",
                });
            }
        }
        if let Some(expected_top) = spec.stack_top {
            let actual = self.engine.stack().peek()?;
            if actual != expected_top {
                return Err(VmError::ExecutionFailed {
                    reason: "stack top did not match expected final state",
                });
            }
        }
        if let Some(expected_count) = spec.instructions_executed {
            if self.engine.instructions_executed() != expected_count {
                return Err(VmError::ExecutionFailed {
                    reason: "instructions_executed did not match expected final state",
                });
            }
        }
        if let Some(expected_error) = spec.last_error {
            if self.engine.last_error() != Some(expected_error) {
                return Err(VmError::ExecutionFailed {
                    reason: "last_error did not match expected final state",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InstructionFlags;
    use crate::io_port::mock::MockIoPort;

    fn insn(opcode: u8, imm: u16) -> Instruction {
        Instruction::new(opcode, InstructionFlags::empty(), imm)
    }

    #[test]
    fn execute_single_step_requires_a_loaded_program() {
        let mut vm = Vm::new(Box::new(MockIoPort::new()));
        assert!(matches!(
            vm.execute_single_step(),
            Err(VmError::ProgramNotLoaded)
        ));
    }

    #[test]
    fn load_program_rejects_empty_instructions() {
        let mut vm = Vm::new(Box::new(MockIoPort::new()));
        assert!(matches!(
            vm.load_program(vec![]),
            Err(VmError::ExecutionFailed { .. })
        ));
    }

    #[test]
    fn arithmetic_program_reaches_expected_final_state() {
        let mut vm = Vm::new(Box::new(MockIoPort::new()));
        vm.execute_program(vec![insn(0x01, 40), insn(0x01, 45), insn(0x03, 0), insn(0x00, 0)])
            .unwrap();
        assert!(vm.is_halted());
        vm.validate_final_state(&FinalStateSpec {
            halted: true,
            stack_top: Some(85),
            instructions_executed: Some(4),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(vm.performance_metrics().instructions_executed(), 4);
    }

    #[test]
    fn reset_clears_metrics_and_memory_but_keeps_the_program() {
        let mut vm = Vm::new(Box::new(MockIoPort::new()));
        vm.execute_program(vec![insn(0x01, 1), insn(0x00, 0)]).unwrap();
        vm.reset_vm();
        assert_eq!(vm.performance_metrics().instructions_executed(), 0);
        assert!(!vm.is_halted());

        vm.execute_single_step().unwrap();
        assert_eq!(vm.program_counter(), 1);
    }
}
