//! The Execution Engine: the fetch/decode/dispatch loop (§4.3.1).
//!
//! The engine owns the program counter, the halted flag, and the last
//! recorded error; it borrows the Memory Context and I/O Port for the
//! duration of each step rather than owning them, so the facade can compose
//! one engine with one memory context and one port (§4.4). The dispatch
//! table alone decides *what* an instruction does; the engine alone decides
//! how `pc`/`halted` move in response (§9 "Control-flow invariant").

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable, Memory, Stack};
use crate::error::{VmError, VmResult};
use crate::instruction::Instruction;
use crate::io_port::IoPort;

/// Fetch/decode/dispatch state machine over a fixed instruction sequence.
pub struct ExecutionEngine {
    table: JumpTable,
    stack: Stack,
    pc: usize,
    halted: bool,
    last_error: Option<VmError>,
    instructions_executed: u64,
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionEngine {
    /// Builds an engine with a freshly populated dispatch table and an
    /// empty operand stack.
    pub fn new() -> Self {
        Self {
            table: JumpTable::new(),
            stack: Stack::new(),
            pc: 0,
            halted: false,
            last_error: None,
            instructions_executed: 0,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn last_error(&self) -> Option<VmError> {
        self.last_error
    }

    pub fn instructions_executed(&self) -> u64 {
        self.instructions_executed
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Resets `pc`, `halted`, `last_error`, `instructions_executed` and the
    /// operand stack. The dispatch table is immutable and is not rebuilt.
    pub fn reset(&mut self) {
        self.stack = Stack::new();
        self.pc = 0;
        self.halted = false;
        self.last_error = None;
        self.instructions_executed = 0;
    }

    /// Executes a single fetch/decode/dispatch cycle against `program`
    /// (§4.3.1):
    ///
    /// 1. If halted or a prior step recorded an error, this is a no-op.
    /// 2. `pc >= program.len()` is treated as running off the end without
    ///    `HALT`, which is terminal (`ExecutionFailed`).
    /// 3. The instruction is decoded and its opcode validated.
    /// 4. The dispatch table is consulted; a missing handler is
    ///    `InvalidOpcode` even though the opcode itself decoded, which can
    ///    only happen if a band gap was reached through a future
    ///    `OpCode::try_from` change.
    /// 5. The handler runs and the dispatcher alone applies the outcome to
    ///    `pc`/`halted`.
    pub fn step(
        &mut self,
        program: &[Instruction],
        memory: &mut Memory,
        io: &mut dyn IoPort,
    ) -> VmResult<()> {
        if self.halted || self.last_error.is_some() {
            return Ok(());
        }

        let instruction = match program.get(self.pc) {
            Some(insn) => insn,
            None => {
                return Err(self.fail(VmError::ExecutionFailed {
                    reason: "program counter ran past the end of the program without HALT",
                }));
            }
        };

        if let Err(err) = instruction.op() {
            return Err(self.fail(err));
        }

        #[cfg(feature = "trace-instructions")]
        log::trace!(
            "pc={} opcode={:#04x} flags={:#04x} immediate={}",
            self.pc,
            instruction.opcode,
            instruction.flags.bits(),
            instruction.immediate
        );

        let handler = match self.table.get(instruction.opcode) {
            Some(handler) => handler,
            None => {
                return Err(self.fail(VmError::InvalidOpcode {
                    opcode: instruction.opcode,
                }));
            }
        };

        let mut ctx = HandlerContext {
            stack: &mut self.stack,
            memory,
            io,
            instruction,
            pc: self.pc,
            program_size: program.len(),
        };
        let outcome = handler(&mut ctx);

        match outcome {
            DispatchOutcome::Continue => {
                self.pc += 1;
                self.instructions_executed += 1;
            }
            DispatchOutcome::ContinueNoCheck => {
                self.pc += 1;
                self.instructions_executed += 1;
            }
            DispatchOutcome::StackCheckRequested => {
                if let Err(err) = self.stack.validate_canaries() {
                    return Err(self.fail(err));
                }
                self.pc += 1;
                self.instructions_executed += 1;
            }
            DispatchOutcome::JumpAbsolute(target) => {
                if target >= program.len() {
                    return Err(self.fail(VmError::InvalidJump {
                        target: target as i64,
                        program_size: program.len(),
                    }));
                }
                self.pc = target;
                self.instructions_executed += 1;
            }
            DispatchOutcome::JumpRelative(_) => {
                return Err(self.fail(VmError::ExecutionFailed {
                    reason: "relative jumps are not a supported dispatch outcome",
                }));
            }
            DispatchOutcome::Halt => {
                self.halted = true;
                self.instructions_executed += 1;
            }
            DispatchOutcome::Error(err) => {
                return Err(self.fail(err));
            }
        }

        Ok(())
    }

    /// Records `err` as the engine's terminal error and logs it at `error!`
    /// level — any error here flips the engine out of the running state
    /// until the next [`Self::reset`].
    fn fail(&mut self, err: VmError) -> VmError {
        log::error!("execution stopped at pc={}: {err}", self.pc);
        self.last_error = Some(err);
        err
    }

    /// Runs [`Self::step`] until the engine halts, records an error, or
    /// `max_steps` is exhausted (a defensive bound against runaway
    /// programs; §9).
    pub fn run(
        &mut self,
        program: &[Instruction],
        memory: &mut Memory,
        io: &mut dyn IoPort,
        max_steps: u64,
    ) -> VmResult<()> {
        let mut steps = 0;
        while !self.halted && self.last_error.is_none() {
            if steps >= max_steps {
                let err = VmError::ExecutionFailed {
                    reason: "exceeded max_steps without reaching HALT",
                };
                self.last_error = Some(err);
                return Err(err);
            }
            self.step(program, memory, io)?;
            steps += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Instruction, InstructionFlags};
    use crate::io_port::mock::MockIoPort;

    fn insn(opcode: u8, imm: u16) -> Instruction {
        Instruction::new(opcode, InstructionFlags::empty(), imm)
    }

    #[test]
    fn arithmetic_then_halt() {
        // PUSH 40, PUSH 45, ADD, HALT -> top of stack 85, 4 instructions.
        let program = vec![insn(0x01, 40), insn(0x01, 45), insn(0x03, 0), insn(0x00, 0)];
        let mut memory = Memory::new();
        let mut io = MockIoPort::new();
        let mut engine = ExecutionEngine::new();
        engine.run(&program, &mut memory, &mut io, 64).unwrap();
        assert!(engine.is_halted());
        assert_eq!(engine.instructions_executed(), 4);
        assert_eq!(engine.stack().peek().unwrap(), 85);
    }

    #[test]
    fn division_by_zero_stops_at_the_failing_step() {
        let program = vec![insn(0x01, 10), insn(0x01, 0), insn(0x06, 0), insn(0x00, 0)];
        let mut memory = Memory::new();
        let mut io = MockIoPort::new();
        let mut engine = ExecutionEngine::new();
        let result = engine.run(&program, &mut memory, &mut io, 64);
        assert!(matches!(result, Err(VmError::DivisionByZero)));
        assert_eq!(engine.pc(), 2);
        assert!(!engine.is_halted());
    }

    #[test]
    fn jump_out_of_range_leaves_pc_unchanged() {
        let program = vec![insn(0x30, 9), insn(0x00, 0)];
        let mut memory = Memory::new();
        let mut io = MockIoPort::new();
        let mut engine = ExecutionEngine::new();
        let result = engine.step(&program, &mut memory, &mut io);
        assert!(matches!(result, Err(VmError::InvalidJump { .. })));
        assert_eq!(engine.pc(), 0);
    }

    #[test]
    fn call_and_return_round_trip() {
        // 0: CALL 2, 1: HALT, 2: PUSH 7, 3: RET
        let program = vec![insn(0x08, 2), insn(0x00, 0), insn(0x01, 7), insn(0x09, 0)];
        let mut memory = Memory::new();
        let mut io = MockIoPort::new();
        let mut engine = ExecutionEngine::new();
        engine.run(&program, &mut memory, &mut io, 64).unwrap();
        assert!(engine.is_halted());
        assert_eq!(engine.stack().peek().unwrap(), 7);
    }

    #[test]
    fn running_off_the_end_without_halt_is_execution_failed() {
        let program = vec![insn(0x01, 1)];
        let mut memory = Memory::new();
        let mut io = MockIoPort::new();
        let mut engine = ExecutionEngine::new();
        let result = engine.run(&program, &mut memory, &mut io, 64);
        assert!(matches!(result, Err(VmError::ExecutionFailed { .. })));
    }
}
