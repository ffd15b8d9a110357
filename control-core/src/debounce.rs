//! Per-channel raw-edge capture and settle logic.
//!
//! Every physical input owns a [`ChannelInput`]. Edge interrupts call
//! [`ChannelInput::on_edge`], which schedules a settle deadline and
//! optimistically latches a rising edge; the 1 ms tick calls
//! [`ChannelInput::on_tick`], which resamples the physical pin once the
//! deadline passes. Steady-state logic reads only `stable_on`, so any bounce
//! inside the window is absorbed by the final resample.

use crate::channel::{CHANNEL_COUNT, ChannelId};

/// Settle window applied after every raw edge, in ticks.
pub const DEBOUNCE_TIME_MS: u8 = 5;

/// Debounce state for one physical input.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChannelInput {
    /// Optimistic value latched at edge detection; consumed only by the
    /// pre-debounce toggle flip, never by steady-state logic.
    raw_on: bool,
    /// Settled value used by the state machines.
    stable_on: bool,
    debouncing: bool,
    settle_deadline: u8,
}

impl ChannelInput {
    pub const fn new() -> Self {
        Self {
            raw_on: false,
            stable_on: false,
            debouncing: false,
            settle_deadline: 0,
        }
    }

    /// Seeds both raw and stable values from a boot-time sample, bypassing
    /// the settle window. Used only by the power-on reset pass.
    pub fn seed(&mut self, level: bool) {
        self.raw_on = level;
        self.stable_on = level;
        self.debouncing = false;
    }

    /// Records a raw edge at tick `now`. Returns `true` when the edge is
    /// interpreted as rising, which latches `raw_on` immediately so a
    /// pushbutton press is perceived with zero latency.
    pub fn on_edge(&mut self, now: u8) -> bool {
        self.debouncing = true;
        self.settle_deadline = now.wrapping_add(DEBOUNCE_TIME_MS);
        if !self.raw_on {
            self.raw_on = true;
            true
        } else {
            false
        }
    }

    /// Advances the settle logic at tick `now`. `sample` performs a fresh
    /// physical read and is invoked only when the window expires.
    pub fn on_tick(&mut self, now: u8, sample: impl FnOnce() -> bool) {
        if self.debouncing && deadline_reached(now, self.settle_deadline) {
            self.debouncing = false;
            let level = sample();
            self.stable_on = level;
            self.raw_on = level;
        }
    }

    /// The settled value consumed by all steady-state logic.
    pub const fn stable_on(&self) -> bool {
        self.stable_on
    }

    /// Returns `true` while a settle window is open.
    pub const fn is_debouncing(&self) -> bool {
        self.debouncing
    }
}

/// Wrap-safe comparison on the free-running 8-bit tick counter. Deadlines
/// are at most [`DEBOUNCE_TIME_MS`] ahead, so a half-range split suffices.
const fn deadline_reached(now: u8, deadline: u8) -> bool {
    now.wrapping_sub(deadline) < 128
}

/// Debounce state for the full input bank.
#[derive(Copy, Clone, Debug, Default)]
pub struct InputBank {
    channels: [ChannelInput; CHANNEL_COUNT],
}

impl InputBank {
    pub const fn new() -> Self {
        Self {
            channels: [ChannelInput::new(); CHANNEL_COUNT],
        }
    }

    pub fn channel(&self, id: ChannelId) -> &ChannelInput {
        &self.channels[id.as_index()]
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> &mut ChannelInput {
        &mut self.channels[id.as_index()]
    }

    /// Shorthand for the settled value of one channel.
    pub fn stable(&self, id: ChannelId) -> bool {
        self.channels[id.as_index()].stable_on()
    }

    /// Returns `true` while any channel has an open settle window. Suspend
    /// must not be entered then, or a wake edge could settle unnoticed.
    pub fn any_debouncing(&self) -> bool {
        self.channels.iter().any(ChannelInput::is_debouncing)
    }
}
