//! Output arbitration policy.
//!
//! Runs once per polling pass while an on-state owns the outputs. The horn
//! stays under arbitration even during a programming session, which owns
//! only the switch indicators and the toggle mapping while it is active.
//! The horn has absolute priority: the
//! board's supply cannot feed the horn and the auxiliary loads at once, so
//! V1/V2 are cut and allowed to settle before the horn is asserted. Toggle
//! intent survives a horn burst untouched; release restores the outputs it
//! implies.

use crate::channel::{AuxOutput, ChannelId, OutputId, Toggle};
use crate::controller::Controller;
use crate::hal::Hardware;
use crate::pattern::{HornPattern, Pattern};
use crate::power::PowerState;
use crate::programming::ProgrammingState;
use crate::telemetry::ControlEvent;

impl Controller {
    pub(crate) fn arbitrate(&mut self, hw: &mut impl Hardware) {
        // Horn and the automatic vehicle signals are defined only while the
        // ignition is live; under switch power just the toggle mapping runs.
        // An active programming session owns the switch indicators and the
        // toggle mapping, but never the horn.
        let programming = self.prog != ProgrammingState::Reset;
        let on_ignition = self.power == PowerState::OnIgnition;
        let horn_held = on_ignition && self.inputs.stable(ChannelId::HornSwitch);

        if horn_held {
            for aux in AuxOutput::BOTH {
                hw.set_output(aux.output(), false);
                if !programming {
                    self.leds.set_switch(aux, Pattern::Off, hw);
                }
            }
            if !self.horn_out {
                hw.horn_settle();
                hw.set_output(OutputId::Horn, true);
                self.horn_out = true;
                self.events.record(ControlEvent::HornEngaged);
                self.leds.set_horn(HornPattern::Alarm, hw);
            }
            // Invert the trackers so release replays the live levels as
            // fresh edges and the automatic toggles catch up immediately.
            self.hb_seen = !self.inputs.stable(ChannelId::HighBeam);
            self.rev_seen = !self.inputs.stable(ChannelId::Reverse);
            return;
        }

        self.horn_off(hw);
        if on_ignition {
            self.leds.set_horn(HornPattern::Rainbow, hw);
            self.apply_auto_signal(ChannelId::HighBeam, AuxOutput::V1);
            self.apply_auto_signal(ChannelId::Reverse, AuxOutput::V2);
        }
        if programming {
            return;
        }

        for aux in AuxOutput::BOTH {
            let toggle = self.toggles[aux.as_index()];
            hw.set_output(aux.output(), toggle.is_on());
            let pattern = match toggle {
                Toggle::Off => Pattern::Off,
                Toggle::OnUser => Pattern::On,
                Toggle::OnAuto => Pattern::Breathe,
            };
            self.leds.set_switch(aux, pattern, hw);
        }
    }

    /// Applies one automatic vehicle signal (high-beam or reverse) to its
    /// auxiliary toggle on level change. `OnUser` is never disturbed; the
    /// tracker still follows the signal so no stale edge fires later.
    fn apply_auto_signal(&mut self, channel: ChannelId, aux: AuxOutput) {
        let level = self.inputs.stable(channel);
        let seen = match channel {
            ChannelId::HighBeam => &mut self.hb_seen,
            _ => &mut self.rev_seen,
        };
        if level == *seen {
            return;
        }
        *seen = level;

        if self.toggles[aux.as_index()] != Toggle::OnUser {
            let next = if level { Toggle::OnAuto } else { Toggle::Off };
            self.set_toggle(aux, next);
        }
    }
}
