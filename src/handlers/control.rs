//! Control-flow opcodes (0x30-0x3F). Jump targets are validated by the
//! dispatcher, not here (§4.3.1) — handlers only express intent.

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::instruction::OpCode;

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::Jmp, jmp);
    table.register(OpCode::JmpTrue, jmp_true);
    table.register(OpCode::JmpFalse, jmp_false);
}

fn jmp(ctx: &mut HandlerContext) -> DispatchOutcome {
    DispatchOutcome::JumpAbsolute(ctx.instruction.immediate as usize)
}

fn jmp_true(ctx: &mut HandlerContext) -> DispatchOutcome {
    let cond = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if cond != 0 {
        DispatchOutcome::JumpAbsolute(ctx.instruction.immediate as usize)
    } else {
        DispatchOutcome::Continue
    }
}

fn jmp_false(ctx: &mut HandlerContext) -> DispatchOutcome {
    let cond = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if cond == 0 {
        DispatchOutcome::JumpAbsolute(ctx.instruction.immediate as usize)
    } else {
        DispatchOutcome::Continue
    }
}
