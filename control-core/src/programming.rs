//! In-field delay programming state machine.
//!
//! Entered by holding both switch buttons with the ignition on; counts
//! subsequent presses as minutes, commits the result to persistent storage
//! after five idle seconds, then plays the committed value back as slow
//! indicator blinks. While active it is the exclusive owner of the two
//! switch indicator LEDs.

use crate::channel::ChannelId;
use crate::config::{DelaySetting, MAX_DELAY_MINUTES};
use crate::controller::Controller;
use crate::hal::Hardware;
use crate::pattern::Pattern;
use crate::telemetry::ControlEvent;

/// Continuous tri-press hold required to enter programming.
pub const PROG_ACTIVATE_MS: u32 = 10_000;

/// Idle time after the last press that commits the pending value.
pub const PROG_COMMIT_MS: u32 = PROG_ACTIVATE_MS / 2;

/// Indicator-off pause between commit and playback.
pub const DISPLAY_DWELL_MS: u16 = 1_000;

/// Half-period of one playback blink.
pub const DISPLAY_BLINK_MS: u16 = 500;

/// Programming phase. `Reset` means dormant; every other phase owns the
/// switch indicators.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ProgrammingState {
    #[default]
    Reset,
    /// Tri-press detected; waiting out the 10 s activation hold.
    Activate,
    /// Activated; waiting for both switches to release before counting.
    Wait,
    /// Counting phase, switches released; a press adds a minute, idle
    /// expiry commits.
    OnWait,
    /// Counting phase, a press is being held; release re-arms the idle
    /// timer.
    OffWait,
    /// Post-commit pause with indicators dark.
    DisplayDwell,
    /// Playing the committed minute count back as blinks.
    Display,
}

impl Controller {
    /// Cancels an in-flight session when the ignition drops, without
    /// committing. Runs ahead of the power machine in every polling pass,
    /// so a key-off that restarts or suspends the pass can never strand a
    /// half-entered session for the next key cycle to resume.
    pub(crate) fn programming_abort_check(&mut self, hw: &mut impl Hardware) {
        if self.prog != ProgrammingState::Reset && !self.inputs.stable(ChannelId::Ignition) {
            self.force_toggles_off(hw);
            self.enter_prog(ProgrammingState::Reset);
        }
    }

    pub(crate) fn programming_step(&mut self, hw: &mut impl Hardware) {
        let ignition = self.inputs.stable(ChannelId::Ignition);
        let sw1 = self.inputs.stable(ChannelId::Switch1);
        let sw2 = self.inputs.stable(ChannelId::Switch2);

        match self.prog {
            ProgrammingState::Reset => {
                if ignition && sw1 && sw2 {
                    // Entry clears the toggles: the auxiliary outputs may not
                    // stay live while the indicators are repurposed. The horn
                    // remains with the arbitrator.
                    self.force_toggles_off(hw);
                    self.leds.set_switches(Pattern::Flash, hw);
                    self.timers.prog_ms = 0;
                    self.enter_prog(ProgrammingState::Activate);
                }
            }
            ProgrammingState::Activate => {
                if !(sw1 && sw2) {
                    // Releasing early is the no-op escape hatch.
                    self.leds.set_switches(Pattern::Off, hw);
                    self.enter_prog(ProgrammingState::Reset);
                } else if self.timers.prog_ms >= PROG_ACTIVATE_MS {
                    self.pending_minutes = 0;
                    self.leds.set_switches(Pattern::Flash, hw);
                    self.enter_prog(ProgrammingState::Wait);
                }
            }
            ProgrammingState::Wait => {
                if !sw1 && !sw2 {
                    self.timers.prog_ms = 0;
                    self.enter_prog(ProgrammingState::OnWait);
                }
            }
            ProgrammingState::OnWait => {
                if sw1 || sw2 {
                    self.pending_minutes =
                        (self.pending_minutes + 1).min(MAX_DELAY_MINUTES);
                    self.leds.set_switches(Pattern::On, hw);
                    self.enter_prog(ProgrammingState::OffWait);
                } else if self.timers.prog_ms >= PROG_COMMIT_MS {
                    self.commit(hw);
                }
            }
            ProgrammingState::OffWait => {
                if !sw1 && !sw2 {
                    self.leds.set_switches(Pattern::Flash, hw);
                    self.timers.prog_ms = 0;
                    self.enter_prog(ProgrammingState::OnWait);
                }
            }
            ProgrammingState::DisplayDwell => {
                if self.display_remaining == 0 {
                    // A committed zero plays back as no blinks at all.
                    self.enter_prog(ProgrammingState::Reset);
                } else if self.timers.led_ms >= DISPLAY_DWELL_MS {
                    self.display_lit = true;
                    self.leds.set_switches(Pattern::On, hw);
                    self.timers.led_ms = 0;
                    self.enter_prog(ProgrammingState::Display);
                }
            }
            ProgrammingState::Display => {
                if self.timers.led_ms >= DISPLAY_BLINK_MS {
                    self.timers.led_ms = 0;
                    if self.display_lit {
                        self.display_lit = false;
                        self.leds.set_switches(Pattern::Off, hw);
                        self.display_remaining -= 1;
                        if self.display_remaining == 0 {
                            self.force_toggles_off(hw);
                            self.enter_prog(ProgrammingState::Reset);
                        }
                    } else {
                        self.display_lit = true;
                        self.leds.set_switches(Pattern::On, hw);
                    }
                }
            }
        }
    }

    /// Clamps and persists the pending minute count, then hands off to the
    /// blink playback. The store primitive is assumed non-preemptible by the
    /// watchdog for its duration.
    fn commit(&mut self, hw: &mut impl Hardware) {
        self.delay = DelaySetting::from_minutes(self.pending_minutes);
        hw.store_delay_ms(self.delay.as_ms());
        self.events
            .record(ControlEvent::DelayCommitted(self.delay.as_ms()));

        self.display_remaining = self.delay.minutes();
        self.display_lit = false;
        self.leds.set_switches(Pattern::Off, hw);
        self.timers.led_ms = 0;
        self.enter_prog(ProgrammingState::DisplayDwell);
    }

    fn enter_prog(&mut self, next: ProgrammingState) {
        self.prog = next;
        self.events.record(ControlEvent::Programming(next));
    }
}
