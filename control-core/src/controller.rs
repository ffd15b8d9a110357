//! The single shared state container coordinating both execution tiers.
//!
//! Interrupt context calls [`Controller::on_edge`] and
//! [`Controller::on_tick`]; the cooperative polling loop calls
//! [`Controller::poll`]. The host environment (firmware or emulator) is
//! responsible for serializing the three entry points behind one critical
//! section, so the fields here need no interior locking of their own.

use crate::channel::{AuxOutput, ChannelId, OutputId, Toggle};
use crate::config::DelaySetting;
use crate::debounce::InputBank;
use crate::hal::Hardware;
use crate::pattern::{HornPattern, LedEngine, Pattern};
use crate::power::PowerState;
use crate::programming::ProgrammingState;
use crate::telemetry::{ControlEvent, EventLog};

/// Result of one polling-loop pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// The pass completed; poll again.
    Ran,
    /// Nothing to do: the loop should park in low power until a wake-capable
    /// input edge arrives, then poll again from the top.
    Sleep,
}

/// Flow control returned by the power state machine to the polling pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum PowerStep {
    /// Continue into the programming machine and arbitrator this pass.
    Continue,
    /// The pass performed a one-time transition; restart from the top.
    Restart,
    /// Request suspension.
    Sleep,
}

/// The four millisecond time bases. All advance by exactly one per tick;
/// only the state machines reset them, and only from the polling tier.
#[derive(Copy, Clone, Debug, Default)]
pub struct TimeBases {
    /// Free-running tick counter, used only for debounce deadlines.
    pub tick: u8,
    /// Milliseconds since entering `OnSwitch`.
    pub delay_ms: u32,
    /// Milliseconds since the programming machine's last phase entry.
    pub prog_ms: u32,
    /// Milliseconds since the last pattern-visible transition.
    pub led_ms: u16,
}

impl TimeBases {
    pub const fn new() -> Self {
        Self {
            tick: 0,
            delay_ms: 0,
            prog_ms: 0,
            led_ms: 0,
        }
    }

    fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.delay_ms = self.delay_ms.wrapping_add(1);
        self.prog_ms = self.prog_ms.wrapping_add(1);
        self.led_ms = self.led_ms.wrapping_add(1);
    }
}

/// Complete in-RAM state of the control logic. Created once at boot; a
/// watchdog reset rebuilds it from scratch, losing everything except the
/// persisted delay setting.
#[derive(Debug)]
pub struct Controller {
    pub(crate) inputs: InputBank,
    pub(crate) toggles: [Toggle; 2],
    pub(crate) power: PowerState,
    pub(crate) prog: ProgrammingState,
    pub(crate) timers: TimeBases,
    pub(crate) delay: DelaySetting,
    /// Minutes accumulated by the programming machine before commit.
    pub(crate) pending_minutes: u8,
    /// Blink count remaining in the confirmation display.
    pub(crate) display_remaining: u8,
    pub(crate) display_lit: bool,
    /// Last high-beam/reverse levels the arbitrator applied.
    pub(crate) hb_seen: bool,
    pub(crate) rev_seen: bool,
    pub(crate) horn_out: bool,
    pub(crate) leds: LedEngine,
    pub(crate) events: EventLog,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            inputs: InputBank::new(),
            toggles: [Toggle::Off; 2],
            power: PowerState::Reset,
            prog: ProgrammingState::Reset,
            timers: TimeBases::new(),
            delay: DelaySetting::DEFAULT,
            pending_minutes: 0,
            display_remaining: 0,
            display_lit: false,
            hb_seen: false,
            rev_seen: false,
            horn_out: false,
            leds: LedEngine::new(),
            events: EventLog::new(),
        }
    }

    /// Edge-interrupt entry point: debounce scheduling plus the immediate
    /// pre-debounce toggle flip for the two pushbutton channels. The flip is
    /// intentionally applied at raw-edge time so the user perceives zero
    /// latency; a noisy edge that settles and bounces again can double-flip.
    pub fn on_edge(&mut self, channel: ChannelId) {
        let rising = self
            .inputs
            .channel_mut(channel)
            .on_edge(self.timers.tick);
        if rising
            && let Some(aux) = channel.aux()
        {
            let next = self.toggles[aux.as_index()].pressed();
            self.set_toggle(aux, next);
        }
    }

    /// Tick-interrupt entry point: advances all four time bases, clocks the
    /// LED pattern engine, and settles any debounce windows that expired,
    /// resampling the physical pin through `hw`.
    pub fn on_tick(&mut self, hw: &mut impl Hardware) {
        self.timers.advance();

        let ignition = self.inputs.stable(ChannelId::Ignition);
        let horn_held = self.inputs.stable(ChannelId::HornSwitch);
        self.leds.on_tick(ignition, horn_held, hw);

        let now = self.timers.tick;
        for index in 0..crate::channel::CHANNEL_COUNT {
            if let Some(id) = ChannelId::from_index(index) {
                self.inputs
                    .channel_mut(id)
                    .on_tick(now, || hw.read_input(id));
            }
        }
    }

    /// One cooperative pass: programming abort check, power machine, then
    /// (unless the pass restarted) the programming machine and the output
    /// arbitrator whenever an on-state owns the outputs. The arbitrator
    /// keeps the horn live during a programming session; only its switch
    /// mapping defers to the programming machine.
    pub fn poll(&mut self, hw: &mut impl Hardware) -> PollOutcome {
        self.programming_abort_check(hw);

        match self.power_step(hw) {
            PowerStep::Sleep => return PollOutcome::Sleep,
            PowerStep::Restart => return PollOutcome::Ran,
            PowerStep::Continue => {}
        }

        self.programming_step(hw);

        if matches!(self.power, PowerState::OnIgnition | PowerState::OnSwitch) {
            self.arbitrate(hw);
        }

        PollOutcome::Ran
    }

    pub fn power_state(&self) -> PowerState {
        self.power
    }

    pub fn programming_state(&self) -> ProgrammingState {
        self.prog
    }

    pub fn delay(&self) -> DelaySetting {
        self.delay
    }

    pub fn toggle(&self, aux: AuxOutput) -> Toggle {
        self.toggles[aux.as_index()]
    }

    /// Settled value of one input channel.
    pub fn input_stable(&self, channel: ChannelId) -> bool {
        self.inputs.stable(channel)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub(crate) fn set_toggle(&mut self, aux: AuxOutput, state: Toggle) {
        if self.toggles[aux.as_index()] != state {
            self.toggles[aux.as_index()] = state;
            self.events
                .record(ControlEvent::ToggleChanged { aux, state });
        }
    }

    /// Forces both toggles off and de-energizes the auxiliary outputs and
    /// their indicators. Used by every system-level reset path (ignition
    /// off, programming entry/exit, switch-power timeout) so that the
    /// suspend point is only ever reached with zero active outputs.
    pub(crate) fn force_toggles_off(&mut self, hw: &mut impl Hardware) {
        for aux in AuxOutput::BOTH {
            self.set_toggle(aux, Toggle::Off);
            hw.set_output(aux.output(), false);
            self.leds.set_switch(aux, Pattern::Off, hw);
        }
    }

    /// De-asserts the horn, recording the release when it was engaged.
    pub(crate) fn horn_off(&mut self, hw: &mut impl Hardware) {
        if self.horn_out {
            self.horn_out = false;
            self.events.record(ControlEvent::HornReleased);
        }
        hw.set_output(OutputId::Horn, false);
    }

    /// Blanks the horn indicator. Both the suspend path and the
    /// ignition-loss path must leave the RGB channels dark.
    pub(crate) fn horn_indicator_off(&mut self, hw: &mut impl Hardware) {
        self.leds.set_horn(HornPattern::Off, hw);
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
