//! Logical opcodes (0x40-0x4F): truth-value `AND`/`OR`/`NOT` over popped
//! operands, distinct from the bitwise band at 0x60-0x6F (§4.3.3).

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::instruction::OpCode;

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::LogicalAnd, logical_and);
    table.register(OpCode::LogicalOr, logical_or);
    table.register(OpCode::LogicalNot, logical_not);
}

fn logical_and(ctx: &mut HandlerContext) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    push_truth(ctx, a != 0 && b != 0)
}

fn logical_or(ctx: &mut HandlerContext) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    push_truth(ctx, a != 0 || b != 0)
}

fn logical_not(ctx: &mut HandlerContext) -> DispatchOutcome {
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    push_truth(ctx, a == 0)
}

fn push_truth(ctx: &mut HandlerContext, value: bool) -> DispatchOutcome {
    match ctx.stack.push(value as i32) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}
