//! Memory opcodes (0x50-0x5F): globals and fixed-capacity arrays.
//!
//! `LOAD_LOCAL`/`STORE_LOCAL` are deliberately aliased onto
//! `LOAD_GLOBAL`/`STORE_GLOBAL` (§9 "Flattening of locals to globals") —
//! this aliasing is load-bearing for compiled-program compatibility and
//! must not be changed without renumbering the opcodes.

use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::error::{MemoryBoundsKind, VmError};
use crate::instruction::OpCode;

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::LoadGlobal, load_global);
    table.register(OpCode::StoreGlobal, store_global);
    table.register(OpCode::LoadLocal, load_global);
    table.register(OpCode::StoreLocal, store_global);
    table.register(OpCode::LoadArray, load_array);
    table.register(OpCode::StoreArray, store_array);
    table.register(OpCode::CreateArray, create_array);
}

fn load_global(ctx: &mut HandlerContext) -> DispatchOutcome {
    let id = ctx.instruction.immediate as u8;
    match ctx.memory.load_global(id) {
        Ok(value) => match ctx.stack.push(value) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn store_global(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let id = ctx.instruction.immediate as u8;
    match ctx.memory.store_global(id, value) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn load_array(ctx: &mut HandlerContext) -> DispatchOutcome {
    let idx = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let id = ctx.instruction.immediate as u8;
    if idx < 0 {
        return DispatchOutcome::Error(VmError::MemoryBounds {
            kind: MemoryBoundsKind::ArrayIndex,
            index: idx as i64,
            limit: u16::MAX as usize,
        });
    }
    match ctx.memory.load_array(id, idx as u16) {
        Ok(value) => match ctx.stack.push(value) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn store_array(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let idx = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let id = ctx.instruction.immediate as u8;
    if idx < 0 {
        return DispatchOutcome::Error(VmError::MemoryBounds {
            kind: MemoryBoundsKind::ArrayIndex,
            index: idx as i64,
            limit: u16::MAX as usize,
        });
    }
    match ctx.memory.store_array(id, idx as u16, value) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn create_array(ctx: &mut HandlerContext) -> DispatchOutcome {
    let size = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let id = ctx.instruction.immediate as u8;
    if size <= 0 {
        return DispatchOutcome::Error(VmError::MemoryBounds {
            kind: MemoryBoundsKind::ArraySize,
            index: size as i64,
            limit: 0,
        });
    }
    match ctx.memory.create_array(id, size as usize) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}
