//! Compile-time configuration constants for the execution substrate.
//!
//! Per-VM capacities are modeled as `const` generic parameters on
//! [`crate::memory::MemoryContext`] and [`crate::stack::OperandStack`] so a
//! downstream build can select a non-reference variant (e.g. 128 globals)
//! without forking the engine. The values here are the reference defaults
//! from the wire-format / ABI section of the specification.

/// Reference operand stack capacity (words). Slot 0 and `CAPACITY - 1` are
/// reserved guard slots in debug builds.
pub const STACK_CAPACITY: usize = 1024;

/// Reference global slot count.
pub const VM_MAX_GLOBALS: usize = 64;

/// Reference array row count.
pub const VM_MAX_ARRAYS: usize = 16;

/// Reference per-array element count.
pub const VM_ARRAY_ELEMENTS: usize = 64;

/// Highest assigned opcode. Anything above this is rejected at dispatch.
pub const MAX_OPCODE: u8 = 0x6F;

/// Debug-build canary word placed at stack slot 0.
pub const STACK_CANARY_LOW: i32 = 0x0BAD_CAFE_u32 as i32;

/// Debug-build canary word placed at stack slot `CAPACITY - 1`.
pub const STACK_CANARY_HIGH: i32 = 0x5A5A_5A5A_u32 as i32;

/// Every 16th push/pop samples the canaries rather than every one, per §5.
pub const CANARY_SAMPLE_INTERVAL: u32 = 16;

/// Maximum argument count accepted by `PRINTF` (§4.3.3).
pub const MAX_PRINTF_ARGS: usize = 8;

/// `execute_program`'s runaway-loop bound is the program's instruction
/// count times this multiplier, to allow loops and calls without lifting
/// the bound entirely (§4.4, §5 "bounds total step count by the supplied
/// program length").
pub const STEP_BUDGET_MULTIPLIER: u64 = 64;
