//! Core opcodes (0x00-0x0F): stack literals, arithmetic, and calls.

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::error::VmError;
use crate::instruction::OpCode;

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::Halt, halt);
    table.register(OpCode::Push, push);
    table.register(OpCode::Pop, pop);
    table.register(OpCode::Add, add);
    table.register(OpCode::Sub, sub);
    table.register(OpCode::Mul, mul);
    table.register(OpCode::Div, div);
    table.register(OpCode::Mod, modulo);
    table.register(OpCode::Call, call);
    table.register(OpCode::Ret, ret);
}

fn halt(_ctx: &mut HandlerContext) -> DispatchOutcome {
    DispatchOutcome::Halt
}

fn push(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = ctx.instruction.immediate as i32;
    match ctx.stack.push(value) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn pop(ctx: &mut HandlerContext) -> DispatchOutcome {
    match ctx.stack.pop() {
        Ok(_) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

/// Pops `b` then `a` and applies `op`, mapping `None` (checked-arithmetic
/// overflow, or `INT32_MIN / -1`) to `ExecutionFailed` (§4.3.3).
fn binary_checked(
    ctx: &mut HandlerContext,
    reason: &'static str,
    op: impl FnOnce(i32, i32) -> Option<i32>,
) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    match op(a, b) {
        Some(result) => match ctx.stack.push(result) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        None => DispatchOutcome::Error(VmError::ExecutionFailed { reason }),
    }
}

fn add(ctx: &mut HandlerContext) -> DispatchOutcome {
    binary_checked(ctx, "ADD overflow", |a, b| a.checked_add(b))
}

fn sub(ctx: &mut HandlerContext) -> DispatchOutcome {
    binary_checked(ctx, "SUB overflow", |a, b| a.checked_sub(b))
}

fn mul(ctx: &mut HandlerContext) -> DispatchOutcome {
    binary_checked(ctx, "MUL overflow", |a, b| a.checked_mul(b))
}

fn div(ctx: &mut HandlerContext) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if b == 0 {
        return DispatchOutcome::Error(VmError::DivisionByZero);
    }
    match a.checked_div(b) {
        Some(result) => match ctx.stack.push(result) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        None => DispatchOutcome::Error(VmError::ExecutionFailed {
            reason: "DIV overflow (INT32_MIN / -1)",
        }),
    }
}

fn modulo(ctx: &mut HandlerContext) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if b == 0 {
        return DispatchOutcome::Error(VmError::DivisionByZero);
    }
    match a.checked_rem(b) {
        Some(result) => match ctx.stack.push(result) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        None => DispatchOutcome::Error(VmError::ExecutionFailed {
            reason: "MOD overflow (INT32_MIN / -1)",
        }),
    }
}

fn call(ctx: &mut HandlerContext) -> DispatchOutcome {
    let return_addr = (ctx.pc + 1) as i32;
    if let Err(err) = ctx.stack.push(return_addr) {
        return DispatchOutcome::Error(err);
    }
    DispatchOutcome::JumpAbsolute(ctx.instruction.immediate as usize)
}

fn ret(ctx: &mut HandlerContext) -> DispatchOutcome {
    let addr = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if addr < 0 {
        return DispatchOutcome::Error(VmError::InvalidJump {
            target: addr as i64,
            program_size: ctx.program_size,
        });
    }
    DispatchOutcome::JumpAbsolute(addr as usize)
}
