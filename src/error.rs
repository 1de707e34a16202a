//! Error types for the CockpitVM execution substrate.
//!
//! `VmError` is the engine's `last_error` taxonomy from the specification's
//! error handling section: each variant carries the structured context a
//! host needs to reproduce the failing step deterministically.

use thiserror::Error;

/// Which bounds check failed inside the Memory Context.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryBoundsKind {
    /// Global id exceeded `VM_MAX_GLOBALS`.
    #[error("global id out of range")]
    GlobalId,
    /// Array id exceeded `VM_MAX_ARRAYS`.
    #[error("array id out of range")]
    ArrayId,
    /// Array element index exceeded `VM_ARRAY_ELEMENTS`.
    #[error("array index out of range")]
    ArrayIndex,
    /// Array size requested by `CREATE_ARRAY` was zero or exceeded capacity.
    #[error("array size invalid")]
    ArraySize,
    /// Array row accessed before `CREATE_ARRAY` activated it.
    #[error("array row not active")]
    ArrayInactive,
}

/// The engine's `last_error` register. `None` (absence of a `VmError`) is the
/// success sentinel from the specification and is represented as
/// `Option<VmError>` rather than a variant of this enum.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// Push against a full operand stack.
    #[error("stack overflow: sp {sp} at capacity {capacity}")]
    StackOverflow { sp: usize, capacity: usize },

    /// Pop or peek from an empty operand stack.
    #[error("stack underflow: sp {sp}")]
    StackUnderflow { sp: usize },

    /// Debug-build canary mismatch.
    #[error("stack corruption detected at slot {slot}")]
    StackCorruption { slot: usize },

    /// Opcode byte exceeded `MAX_OPCODE` or has no registered handler.
    #[error("invalid opcode {opcode:#04x}")]
    InvalidOpcode { opcode: u8 },

    /// Jump target outside `0..program_size`, or a negative return address.
    #[error("invalid jump target {target} (program size {program_size})")]
    InvalidJump { target: i64, program_size: usize },

    /// `DIV`/`MOD` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// Global/array index, id or size out of range, or inactive array row.
    #[error("memory bounds violation: {kind} (id/index {index}, limit {limit})")]
    MemoryBounds {
        kind: MemoryBoundsKind,
        index: i64,
        limit: usize,
    },

    /// The I/O port returned a fault signal (`false` or `None`).
    #[error("hardware fault in {operation}")]
    HardwareFault { operation: &'static str },

    /// Checked-arithmetic overflow, invalid shift count, invalid `DELAY`
    /// value, program ran off the end without `HALT`, or any other
    /// execution-terminal failure that doesn't fit a narrower variant.
    #[error("execution failed: {reason}")]
    ExecutionFailed { reason: &'static str },

    /// `execute_program`/`execute_single_step` called before `load_program`.
    #[error("no program loaded")]
    ProgramNotLoaded,

    /// `CREATE_ARRAY` targeted an id whose row is already active.
    #[error("array {id} already exists")]
    ArrayAlreadyExists { id: u8 },
}

impl VmError {
    /// Stable category tag, useful for metrics/log correlation.
    pub fn category(&self) -> &'static str {
        match self {
            VmError::StackOverflow { .. }
            | VmError::StackUnderflow { .. }
            | VmError::StackCorruption { .. } => "stack",
            VmError::InvalidOpcode { .. } => "opcode",
            VmError::InvalidJump { .. } => "jump",
            VmError::DivisionByZero => "arithmetic",
            VmError::MemoryBounds { .. } => "memory",
            VmError::HardwareFault { .. } => "hardware",
            VmError::ExecutionFailed { .. } => "execution",
            VmError::ProgramNotLoaded => "lifecycle",
            VmError::ArrayAlreadyExists { .. } => "memory",
        }
    }

    /// The stable human-readable string required by `error_string` (§6).
    /// Equivalent to `to_string()` but returns a value usable without an
    /// allocation at call sites that only need to log or compare categories.
    pub fn error_string(&self) -> String {
        self.to_string()
    }
}

/// Result alias used throughout the crate.
pub type VmResult<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_groups_stack_errors() {
        assert_eq!(VmError::StackOverflow { sp: 10, capacity: 10 }.category(), "stack");
        assert_eq!(VmError::StackUnderflow { sp: 1 }.category(), "stack");
        assert_eq!(VmError::StackCorruption { slot: 0 }.category(), "stack");
    }

    #[test]
    fn display_is_stable() {
        let err = VmError::MemoryBounds {
            kind: MemoryBoundsKind::GlobalId,
            index: 200,
            limit: 64,
        };
        assert_eq!(
            err.error_string(),
            "memory bounds violation: global id out of range (id/index 200, limit 64)"
        );
    }
}
