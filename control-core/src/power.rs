//! Power state machine.
//!
//! Decides what holds the system awake: ignition, a user toggle running on
//! the auto-off delay, or nobody (suspend). Runs first in every polling pass so
//! that the programming machine and arbitrator only ever execute inside an
//! on-state.

use crate::channel::{AuxOutput, ChannelId};
use crate::config::DelaySetting;
use crate::controller::{Controller, PowerStep};
use crate::hal::Hardware;
use crate::pattern::HornPattern;
use crate::telemetry::ControlEvent;

/// Top-level power mode.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PowerState {
    /// Cold boot or watchdog restart: load persisted settings, seed the
    /// debouncers from live pin levels, then drop into `Down`.
    #[default]
    Reset,
    /// No output owner. The polling loop is told to suspend from here.
    Down,
    /// Ignition is live; outputs follow the arbitrator with no time limit.
    OnIgnition,
    /// Ignition is off but a user toggle is holding the system awake,
    /// bounded by the auto-off delay.
    OnSwitch,
}

impl Controller {
    pub(crate) fn power_step(&mut self, hw: &mut impl Hardware) -> PowerStep {
        match self.power {
            PowerState::Reset => {
                let raw = hw.load_delay_ms();
                self.delay = DelaySetting::sanitize(raw);
                self.events.record(ControlEvent::DelayLoaded(self.delay.as_ms()));
                self.events.record(ControlEvent::Power(PowerState::Down));

                // Seed stable levels from live pins so the first pass does
                // not see six phantom settling windows.
                for index in 0..crate::channel::CHANNEL_COUNT {
                    if let Some(id) = ChannelId::from_index(index) {
                        let level = hw.read_input(id);
                        self.inputs.channel_mut(id).seed(level);
                    }
                }
                self.toggles = [crate::channel::Toggle::Off; 2];
                self.hb_seen = self.inputs.stable(ChannelId::HighBeam);
                self.rev_seen = self.inputs.stable(ChannelId::Reverse);
                self.power = PowerState::Down;
                PowerStep::Restart
            }
            PowerState::Down => {
                if self.inputs.stable(ChannelId::Ignition) {
                    self.enter_power(PowerState::OnIgnition, hw);
                    return PowerStep::Restart;
                }
                let any_toggle = AuxOutput::BOTH
                    .iter()
                    .any(|aux| self.toggles[aux.as_index()].is_on());
                if any_toggle && !self.delay.is_zero() {
                    self.timers.delay_ms = 0;
                    self.enter_power(PowerState::OnSwitch, hw);
                    return PowerStep::Restart;
                }
                if self.inputs.any_debouncing() {
                    // A wake edge is still settling; keep looping so the
                    // resample can land before the next suspend decision.
                    return PowerStep::Restart;
                }

                // Nobody holds the system awake: quiesce every output stage
                // and hand the suspend decision to the host loop.
                self.horn_off(hw);
                self.horn_indicator_off(hw);
                self.force_toggles_off(hw);
                self.leds.set_clocking(false, hw);
                self.events.record(ControlEvent::SleepRequested);
                PowerStep::Sleep
            }
            PowerState::OnIgnition => {
                if !self.inputs.stable(ChannelId::Ignition) {
                    // Ignition loss resets the session: toggles and the horn
                    // indicator do not survive into switch power.
                    self.horn_off(hw);
                    self.horn_indicator_off(hw);
                    self.force_toggles_off(hw);
                    self.enter_power(PowerState::Down, hw);
                    return PowerStep::Restart;
                }
                PowerStep::Continue
            }
            PowerState::OnSwitch => {
                if self.inputs.stable(ChannelId::Ignition) {
                    self.enter_power(PowerState::OnIgnition, hw);
                    return PowerStep::Restart;
                }
                let any_toggle = AuxOutput::BOTH
                    .iter()
                    .any(|aux| self.toggles[aux.as_index()].is_on());
                if !any_toggle {
                    self.enter_power(PowerState::Down, hw);
                    return PowerStep::Restart;
                }
                if self.timers.delay_ms >= self.delay.as_ms() {
                    self.force_toggles_off(hw);
                    self.enter_power(PowerState::Down, hw);
                    return PowerStep::Restart;
                }
                PowerStep::Continue
            }
        }
    }

    fn enter_power(&mut self, next: PowerState, hw: &mut impl Hardware) {
        if next != PowerState::Down {
            self.leds.set_clocking(true, hw);
        }
        if next == PowerState::OnIgnition {
            self.leds.set_horn(HornPattern::Rainbow, hw);
        }
        self.power = next;
        self.events.record(ControlEvent::Power(next));
    }
}
