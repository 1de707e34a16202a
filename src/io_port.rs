//! The abstract I/O Port the Execution Engine calls for side effects.
//!
//! The engine never touches hardware directly (§4.2); a concrete
//! implementation (GPIO/UART/ADC drivers, or a host-side simulator) is
//! supplied by the caller. A boolean `false` or `None` return signals a
//! hardware fault, which the engine maps to [`crate::error::VmError::HardwareFault`].

/// Capability set the Execution Engine invokes for hardware side effects.
pub trait IoPort {
    /// Writes a digital value to `pin`. `false` signals a hardware fault.
    fn digital_write(&mut self, pin: u8, value: u8) -> bool;

    /// Reads a digital value from `pin`. `None` signals a hardware fault.
    fn digital_read(&mut self, pin: u8) -> Option<u8>;

    /// Writes an analog (PWM-class) value to `pin`.
    fn analog_write(&mut self, pin: u8, value: u16) -> bool;

    /// Reads an analog value from `pin`.
    fn analog_read(&mut self, pin: u8) -> Option<u16>;

    /// Configures `pin`'s mode (input/output/pull variant; port-defined).
    fn pin_mode(&mut self, pin: u8, mode: u8) -> bool;

    /// Blocks the calling thread for `ns` nanoseconds. The only suspension
    /// point in the engine (§5).
    fn delay_nanoseconds(&mut self, ns: u32);

    /// Monotonic milliseconds since an implementation-defined epoch.
    /// Wraparound is implementation-defined.
    fn millis(&mut self) -> u32;

    /// Monotonic microseconds since an implementation-defined epoch.
    fn micros(&mut self) -> u32;

    /// Whether button `id` is currently pressed.
    fn button_pressed(&mut self, id: u8) -> bool;

    /// Whether button `id` has been released since it was last read.
    fn button_released(&mut self, id: u8) -> bool;

    /// Formats `string_id` from the port-owned string table with `args` and
    /// emits it. `false` signals a hardware fault (e.g. unknown string id).
    fn vm_printf(&mut self, string_id: u8, args: &[i32]) -> bool;

    /// Resets the underlying hardware to its power-on state.
    fn reset_hardware(&mut self);

    /// Re-initialises the underlying hardware after a reset.
    fn initialize_hardware(&mut self);
}

/// Test-only recording fake implementing [`IoPort`]. Scripted responses are
/// consumed in FIFO order; calls are recorded for assertions.
#[cfg(any(test, feature = "test-support"))]
pub mod mock {
    use super::IoPort;
    use std::collections::VecDeque;

    /// A single recorded call, for assertions in tests.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        DigitalWrite(u8, u8),
        DigitalRead(u8),
        AnalogWrite(u8, u16),
        AnalogRead(u8),
        PinMode(u8, u8),
        Delay(u32),
        Millis,
        Micros,
        ButtonPressed(u8),
        ButtonReleased(u8),
        Printf(u8, Vec<i32>),
        ResetHardware,
        InitializeHardware,
    }

    /// A scripted, recording [`IoPort`] used throughout the test suite.
    #[derive(Default)]
    pub struct MockIoPort {
        pub calls: Vec<Call>,
        pub digital_reads: VecDeque<Option<u8>>,
        pub analog_reads: VecDeque<Option<u16>>,
        pub millis_values: VecDeque<u32>,
        pub micros_values: VecDeque<u32>,
        pub digital_write_ok: bool,
        pub analog_write_ok: bool,
        pub pin_mode_ok: bool,
        pub printf_ok: bool,
        pub button_pressed_values: VecDeque<bool>,
        pub button_released_values: VecDeque<bool>,
    }

    impl MockIoPort {
        pub fn new() -> Self {
            Self {
                digital_write_ok: true,
                analog_write_ok: true,
                pin_mode_ok: true,
                printf_ok: true,
                ..Default::default()
            }
        }
    }

    impl IoPort for MockIoPort {
        fn digital_write(&mut self, pin: u8, value: u8) -> bool {
            self.calls.push(Call::DigitalWrite(pin, value));
            self.digital_write_ok
        }

        fn digital_read(&mut self, pin: u8) -> Option<u8> {
            self.calls.push(Call::DigitalRead(pin));
            self.digital_reads.pop_front().unwrap_or(Some(0))
        }

        fn analog_write(&mut self, pin: u8, value: u16) -> bool {
            self.calls.push(Call::AnalogWrite(pin, value));
            self.analog_write_ok
        }

        fn analog_read(&mut self, pin: u8) -> Option<u16> {
            self.calls.push(Call::AnalogRead(pin));
            self.analog_reads.pop_front().unwrap_or(Some(0))
        }

        fn pin_mode(&mut self, pin: u8, mode: u8) -> bool {
            self.calls.push(Call::PinMode(pin, mode));
            self.pin_mode_ok
        }

        fn delay_nanoseconds(&mut self, ns: u32) {
            self.calls.push(Call::Delay(ns));
        }

        fn millis(&mut self) -> u32 {
            self.calls.push(Call::Millis);
            self.millis_values.pop_front().unwrap_or(0)
        }

        fn micros(&mut self) -> u32 {
            self.calls.push(Call::Micros);
            self.micros_values.pop_front().unwrap_or(0)
        }

        fn button_pressed(&mut self, id: u8) -> bool {
            self.calls.push(Call::ButtonPressed(id));
            self.button_pressed_values.pop_front().unwrap_or(false)
        }

        fn button_released(&mut self, id: u8) -> bool {
            self.calls.push(Call::ButtonReleased(id));
            self.button_released_values.pop_front().unwrap_or(false)
        }

        fn vm_printf(&mut self, string_id: u8, args: &[i32]) -> bool {
            self.calls.push(Call::Printf(string_id, args.to_vec()));
            self.printf_ok
        }

        fn reset_hardware(&mut self) {
            self.calls.push(Call::ResetHardware);
        }

        fn initialize_hardware(&mut self) {
            self.calls.push(Call::InitializeHardware);
        }
    }
}
