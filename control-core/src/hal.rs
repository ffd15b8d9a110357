//! Hardware abstraction consumed by the control logic.
//!
//! The firmware target, the host emulator, and the test suites each provide
//! an implementation; the state machines never touch a register directly.

use crate::channel::{ChannelId, LedId, OutputId};

/// Narrow functional interface to the accessory board.
pub trait Hardware {
    /// Fresh physical read of one input, already polarity-corrected so
    /// `true` always means "asserted".
    fn read_input(&mut self, channel: ChannelId) -> bool;

    /// Drives one of the three high-current outputs.
    fn set_output(&mut self, output: OutputId, on: bool);

    /// Sets a linear PWM duty (0–255) on one indicator LED channel.
    fn set_led_duty(&mut self, led: LedId, duty: u8);

    /// Bounded electrical settle pause inserted between switching the
    /// auxiliary outputs off and asserting the horn, keeping the combined
    /// peak current inside the board budget.
    fn horn_settle(&mut self);

    /// Loads the raw persisted delay word. Validation happens in the core;
    /// implementations return whatever the storage holds.
    fn load_delay_ms(&mut self) -> u32;

    /// Persists the delay word. Implementations must be watchdog-safe for
    /// the duration of the write; there is no power-loss atomicity
    /// guarantee (a loss mid-write may leave the value corrupted or stale).
    fn store_delay_ms(&mut self, delay_ms: u32);
}

/// Hardware double that performs no I/O and reports every input released.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopHardware;

impl NoopHardware {
    pub const fn new() -> Self {
        Self
    }
}

impl Hardware for NoopHardware {
    fn read_input(&mut self, _: ChannelId) -> bool {
        false
    }

    fn set_output(&mut self, _: OutputId, _: bool) {}

    fn set_led_duty(&mut self, _: LedId, _: u8) {}

    fn horn_settle(&mut self) {}

    fn load_delay_ms(&mut self) -> u32 {
        crate::config::DEFAULT_DELAY_MS
    }

    fn store_delay_ms(&mut self, _: u32) {}
}
