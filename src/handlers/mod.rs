//! Per-opcode instruction handlers, grouped into the semantic bands from
//! §4.3.3. Each submodule registers its handlers into the shared
//! [`crate::dispatch::JumpTable`]; handlers return a
//! [`crate::dispatch::DispatchOutcome`] and must never reach for `pc` or
//! `halted` directly (§9 "Control-flow invariant").

mod bitwise;
mod comparisons;
mod control;
mod core;
mod io;
mod logical;
mod memory_ops;

use crate::dispatch::JumpTable;

/// Registers every opcode handler into `table`. Called once from
/// [`JumpTable::new`].
pub(crate) fn register_all(table: &mut JumpTable) {
    core::register(table);
    io::register(table);
    comparisons::register(table);
    control::register(table);
    logical::register(table);
    memory_ops::register(table);
    bitwise::register(table);
}
