//! Hardware I/O opcodes (0x10-0x1F). Port failures (`false`/`None`) map to
//! `HardwareFault` (§4.2).

use crate::config::MAX_PRINTF_ARGS;
use crate::dispatch::{DispatchOutcome, HandlerContext, JumpTable};
use crate::error::VmError;
use crate::instruction::OpCode;

pub(super) fn register(table: &mut JumpTable) {
    table.register(OpCode::DigitalWrite, digital_write);
    table.register(OpCode::DigitalRead, digital_read);
    table.register(OpCode::AnalogWrite, analog_write);
    table.register(OpCode::AnalogRead, analog_read);
    table.register(OpCode::Delay, delay);
    table.register(OpCode::ButtonPressed, button_pressed);
    table.register(OpCode::ButtonReleased, button_released);
    table.register(OpCode::PinMode, pin_mode);
    table.register(OpCode::Printf, printf);
    table.register(OpCode::Millis, millis);
    table.register(OpCode::Micros, micros);
}

fn digital_write(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let pin = ctx.instruction.immediate as u8;
    if ctx.io.digital_write(pin, value as u8) {
        DispatchOutcome::Continue
    } else {
        log::warn!("digital_write on pin {pin} reported a hardware fault");
        DispatchOutcome::Error(VmError::HardwareFault {
            operation: "digital_write",
        })
    }
}

fn digital_read(ctx: &mut HandlerContext) -> DispatchOutcome {
    let pin = ctx.instruction.immediate as u8;
    match ctx.io.digital_read(pin) {
        Some(value) => match ctx.stack.push(value as i32) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        None => {
            log::warn!("digital_read on pin {pin} reported a hardware fault");
            DispatchOutcome::Error(VmError::HardwareFault {
                operation: "digital_read",
            })
        }
    }
}

fn analog_write(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let pin = ctx.instruction.immediate as u8;
    if ctx.io.analog_write(pin, value as u16) {
        DispatchOutcome::Continue
    } else {
        log::warn!("analog_write on pin {pin} reported a hardware fault");
        DispatchOutcome::Error(VmError::HardwareFault {
            operation: "analog_write",
        })
    }
}

fn analog_read(ctx: &mut HandlerContext) -> DispatchOutcome {
    let pin = ctx.instruction.immediate as u8;
    match ctx.io.analog_read(pin) {
        Some(value) => match ctx.stack.push(value as i32) {
            Ok(()) => DispatchOutcome::Continue,
            Err(err) => DispatchOutcome::Error(err),
        },
        None => {
            log::warn!("analog_read on pin {pin} reported a hardware fault");
            DispatchOutcome::Error(VmError::HardwareFault {
                operation: "analog_read",
            })
        }
    }
}

fn delay(ctx: &mut HandlerContext) -> DispatchOutcome {
    let ns = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if ns < 0 {
        return DispatchOutcome::Error(VmError::InvalidOpcode {
            opcode: ctx.instruction.opcode,
        });
    }
    ctx.io.delay_nanoseconds(ns as u32);
    DispatchOutcome::Continue
}

fn button_pressed(ctx: &mut HandlerContext) -> DispatchOutcome {
    let id = ctx.instruction.immediate as u8;
    let pressed = ctx.io.button_pressed(id);
    push_bool(ctx, pressed)
}

fn button_released(ctx: &mut HandlerContext) -> DispatchOutcome {
    let id = ctx.instruction.immediate as u8;
    let released = ctx.io.button_released(id);
    push_bool(ctx, released)
}

fn pin_mode(ctx: &mut HandlerContext) -> DispatchOutcome {
    let mode = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    let pin = ctx.instruction.immediate as u8;
    if ctx.io.pin_mode(pin, mode as u8) {
        DispatchOutcome::Continue
    } else {
        log::warn!("pin_mode on pin {pin} reported a hardware fault");
        DispatchOutcome::Error(VmError::HardwareFault { operation: "pin_mode" })
    }
}

/// Stack-walking argument marshalling: `[arg1, .., argN, N]` (§9 Open
/// Question — this is the canonical form, not the simplified empty-slice
/// variant).
fn printf(ctx: &mut HandlerContext) -> DispatchOutcome {
    let n = match ctx.stack.pop() {
        Ok(v) => v,
        Err(err) => return DispatchOutcome::Error(err),
    };
    if n < 0 || n as usize > MAX_PRINTF_ARGS {
        return DispatchOutcome::Error(VmError::ExecutionFailed {
            reason: "PRINTF argument count out of range",
        });
    }
    let mut args = Vec::with_capacity(n as usize);
    for _ in 0..n {
        match ctx.stack.pop() {
            Ok(v) => args.push(v),
            Err(err) => return DispatchOutcome::Error(err),
        }
    }
    // Popped in reverse of push order; restore arg1-first order.
    args.reverse();

    let string_id = ctx.instruction.immediate as u8;
    if ctx.io.vm_printf(string_id, &args) {
        DispatchOutcome::Continue
    } else {
        log::warn!("vm_printf for string {string_id} reported a hardware fault");
        DispatchOutcome::Error(VmError::HardwareFault { operation: "vm_printf" })
    }
}

fn millis(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = ctx.io.millis() as i32;
    match ctx.stack.push(value) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn micros(ctx: &mut HandlerContext) -> DispatchOutcome {
    let value = ctx.io.micros() as i32;
    match ctx.stack.push(value) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}

fn push_bool(ctx: &mut HandlerContext, value: bool) -> DispatchOutcome {
    match ctx.stack.push(value as i32) {
        Ok(()) => DispatchOutcome::Continue,
        Err(err) => DispatchOutcome::Error(err),
    }
}
