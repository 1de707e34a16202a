//! # CockpitVM
//!
//! A stack-based bytecode execution substrate for resource-constrained
//! 32-bit microcontrollers (ARM Cortex-M4 class and similar).
//!
//! CockpitVM runs a fixed instruction set over a bounded operand stack and a
//! static memory context (globals and fixed-capacity arrays), with all
//! hardware side effects routed through an abstract I/O Port. There is no
//! heap allocation on the hot path and no dynamic dispatch beyond the
//! opcode jump table itself.
//!
//! ## Architecture
//!
//! - **[`MemoryContext`](memory::MemoryContext)**: fixed-capacity globals
//!   and array storage.
//! - **[`OperandStack`](stack::OperandStack)**: the bounded evaluation
//!   stack, with debug-build canary validation.
//! - **[`IoPort`](io_port::IoPort)**: the hardware boundary the engine calls
//!   through; never touched directly by opcode handlers outside `io_port`.
//! - **[`ExecutionEngine`](engine::ExecutionEngine)**: the fetch/decode/
//!   dispatch loop. Owns `pc` and `halted`; handlers never do.
//! - **[`Vm`](facade::Vm)**: the facade a host embeds, composing one memory
//!   context, one engine, and an observer registry.
//!
//! ## Example
//!
//! ```
//! use cockpit_vm::{Instruction, InstructionFlags, IoPort, Vm};
//!
//! // A host normally backs `IoPort` with real GPIO/ADC/UART drivers; a
//! // program with no hardware opcodes never calls into it.
//! struct NoHardware;
//! impl IoPort for NoHardware {
//!     fn digital_write(&mut self, _pin: u8, _value: u8) -> bool { false }
//!     fn digital_read(&mut self, _pin: u8) -> Option<u8> { None }
//!     fn analog_write(&mut self, _pin: u8, _value: u16) -> bool { false }
//!     fn analog_read(&mut self, _pin: u8) -> Option<u16> { None }
//!     fn pin_mode(&mut self, _pin: u8, _mode: u8) -> bool { false }
//!     fn delay_nanoseconds(&mut self, _ns: u32) {}
//!     fn millis(&mut self) -> u32 { 0 }
//!     fn micros(&mut self) -> u32 { 0 }
//!     fn button_pressed(&mut self, _id: u8) -> bool { false }
//!     fn button_released(&mut self, _id: u8) -> bool { false }
//!     fn vm_printf(&mut self, _string_id: u8, _args: &[i32]) -> bool { false }
//!     fn reset_hardware(&mut self) {}
//!     fn initialize_hardware(&mut self) {}
//! }
//!
//! let mut vm = Vm::new(Box::new(NoHardware));
//!
//! // PUSH 40, PUSH 45, ADD, HALT
//! vm.execute_program(vec![
//!     Instruction::new(0x01, InstructionFlags::empty(), 40),
//!     Instruction::new(0x01, InstructionFlags::empty(), 45),
//!     Instruction::new(0x03, InstructionFlags::empty(), 0),
//!     Instruction::new(0x00, InstructionFlags::empty(), 0),
//! ]).unwrap();
//!
//! assert!(vm.is_halted());
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

extern crate std;

/// Compile-time capacity and layout constants.
pub mod config;
/// Fetch/decode/dispatch loop and program-counter ownership.
pub mod engine;
/// `VmError`, the taxonomy every fallible operation in the crate returns.
pub mod error;
/// Per-opcode handler registration, grouped by semantic band.
mod handlers;
/// Instruction encoding and the opcode space.
pub mod instruction;
/// The abstract hardware boundary.
pub mod io_port;
/// Global and array storage.
pub mod memory;
/// Performance counters.
pub mod metrics;
/// Non-owning execution lifecycle hooks.
pub mod observer;
/// The bounded evaluation stack.
pub mod stack;

mod dispatch;
mod facade;

pub use dispatch::{DispatchOutcome, HandlerContext, Memory, Stack};
pub use engine::ExecutionEngine;
pub use error::{MemoryBoundsKind, VmError, VmResult};
pub use facade::{FinalStateSpec, Vm};
pub use instruction::{Instruction, InstructionFlags, OpCode};
pub use io_port::IoPort;
pub use memory::MemoryContext;
pub use metrics::PerformanceMetrics;
pub use observer::{Observer, ObserverRegistry};
pub use stack::OperandStack;
