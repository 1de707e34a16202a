//! Bitwise opcodes (0x60-0x6F). Shift counts must satisfy `0 <= n < 32`
//! (§4.3.3, §8); `NOT` is unary.

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::error::VmError;
use crate::instruction::OpCode;

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::BitAnd, band);
    table.register(OpCode::BitOr, bor);
    table.register(OpCode::BitXor, bxor);
    table.register(OpCode::BitNot, bnot);
    table.register(OpCode::Shl, shl);
    table.register(OpCode::Shr, shr);
}

fn binary(ctx: &mut HandlerContext, op: impl FnOnce(i32, i32) -> i32) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    match ctx.stack.push(op(a, b)) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn band(ctx: &mut HandlerContext) -> DispatchOutcome {
    binary(ctx, |a, b| a & b)
}

fn bor(ctx: &mut HandlerContext) -> DispatchOutcome {
    binary(ctx, |a, b| a | b)
}

fn bxor(ctx: &mut HandlerContext) -> DispatchOutcome {
    binary(ctx, |a, b| a ^ b)
}

fn bnot(ctx: &mut HandlerContext) -> DispatchOutcome {
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    match ctx.stack.push(!a) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn shift(ctx: &mut HandlerContext, apply: impl FnOnce(i32, u32) -> i32) -> DispatchOutcome {
    let n = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let value = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if !(0..32).contains(&n) {
        return DispatchOutcome::Error(VmError::ExecutionFailed {
            reason: "shift count out of range (0 <= n < 32)",
        });
    }
    match ctx.stack.push(apply(value, n as u32)) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn shl(ctx: &mut HandlerContext) -> DispatchOutcome {
    shift(ctx, |value, n| value.wrapping_shl(n))
}

fn shr(ctx: &mut HandlerContext) -> DispatchOutcome {
    shift(ctx, |value, n| value.wrapping_shr(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Memory, Stack};
    use crate::instruction::{Instruction, InstructionFlags};
    use crate::io_port::mock::MockIoPort;

    fn run(handler: fn(&mut HandlerContext) -> DispatchOutcome, pushed: &[i32]) -> DispatchOutcome {
        let mut stack = Stack::new();
        let mut memory = Memory::new();
        let mut io = MockIoPort::new();
        for &v in pushed {
            stack.push(v).unwrap();
        }
        let insn = Instruction::new(0x64, InstructionFlags::empty(), 0);
        let mut ctx = HandlerContext {
            stack: &mut stack,
            memory: &mut memory,
            io: &mut io,
            instruction: &insn,
            pc: 0,
            program_size: 16,
        };
        handler(&mut ctx)
    }

    #[test]
    fn shift_out_of_range_fails() {
        assert!(matches!(
            run(shl, &[1, 32]),
            DispatchOutcome::Error(VmError::ExecutionFailed { .. })
        ));
        assert!(matches!(
            run(shr, &[1, -1]),
            DispatchOutcome::Error(VmError::ExecutionFailed { .. })
        ));
    }
}
