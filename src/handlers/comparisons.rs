//! Comparison opcodes (0x20-0x2F). The unsigned band (0x20-0x25) reinterprets
//! operands as `u32` unless `InstructionFlags::SIGNED` is set; the explicit
//! signed band (0x26-0x2B) always compares as `i32` (§4.3.3).

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::instruction::{InstructionFlags, OpCode};

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::Eq, |ctx| compare(ctx, Relation::Eq, false));
    table.register(OpCode::Ne, |ctx| compare(ctx, Relation::Ne, false));
    table.register(OpCode::Lt, |ctx| compare(ctx, Relation::Lt, false));
    table.register(OpCode::Gt, |ctx| compare(ctx, Relation::Gt, false));
    table.register(OpCode::Le, |ctx| compare(ctx, Relation::Le, false));
    table.register(OpCode::Ge, |ctx| compare(ctx, Relation::Ge, false));

    table.register(OpCode::EqS, |ctx| compare(ctx, Relation::Eq, true));
    table.register(OpCode::NeS, |ctx| compare(ctx, Relation::Ne, true));
    table.register(OpCode::LtS, |ctx| compare(ctx, Relation::Lt, true));
    table.register(OpCode::GtS, |ctx| compare(ctx, Relation::Gt, true));
    table.register(OpCode::LeS, |ctx| compare(ctx, Relation::Le, true));
    table.register(OpCode::GeS, |ctx| compare(ctx, Relation::Ge, true));
}

#[derive(Clone, Copy)]
enum Relation {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

fn compare(ctx: &mut HandlerContext, relation: Relation, force_signed: bool) -> DispatchOutcome {
    let b = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let a = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };

    let signed = force_signed || ctx.instruction.flags.contains(InstructionFlags::SIGNED);
    let holds = if signed {
        match relation {
            Relation::Eq => a == b,
            Relation::Ne => a != b,
            Relation::Lt => a < b,
            Relation::Gt => a > b,
            Relation::Le => a <= b,
            Relation::Ge => a >= b,
        }
    } else {
        let (ua, ub) = (a as u32, b as u32);
        match relation {
            Relation::Eq => ua == ub,
            Relation::Ne => ua != ub,
            Relation::Lt => ua < ub,
            Relation::Gt => ua > ub,
            Relation::Le => ua <= ub,
            Relation::Ge => ua >= ub,
        }
    };

    match ctx.stack.push(holds as i32) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}
