//! Shared host-side test bench: a recording hardware double plus a driver
//! that models the two execution tiers (interrupts and polling loop) the way
//! the firmware runs them, one millisecond at a time.

use control_core::{
    ChannelId, Controller, Hardware, LedId, OutputId, PollOutcome,
};

/// Recording implementation of [`Hardware`] backed by plain arrays.
#[derive(Clone, Debug)]
pub struct TestHardware {
    /// Logical (polarity-corrected) level per input channel.
    pub levels: [bool; 6],
    pub outputs: [bool; 3],
    pub duties: [u8; 5],
    pub stored: u32,
    pub store_count: usize,
    pub settle_count: usize,
}

impl TestHardware {
    pub fn with_stored(stored: u32) -> Self {
        Self {
            levels: [false; 6],
            outputs: [false; 3],
            duties: [0; 5],
            stored,
            store_count: 0,
            settle_count: 0,
        }
    }

    pub fn output(&self, id: OutputId) -> bool {
        self.outputs[id.as_index()]
    }

    pub fn duty(&self, id: LedId) -> u8 {
        self.duties[id.as_index()]
    }
}

impl Hardware for TestHardware {
    fn read_input(&mut self, channel: ChannelId) -> bool {
        self.levels[channel.as_index()]
    }

    fn set_output(&mut self, output: OutputId, on: bool) {
        self.outputs[output.as_index()] = on;
    }

    fn set_led_duty(&mut self, led: LedId, duty: u8) {
        self.duties[led.as_index()] = duty;
    }

    fn horn_settle(&mut self) {
        self.settle_count += 1;
    }

    fn load_delay_ms(&mut self) -> u32 {
        self.stored
    }

    fn store_delay_ms(&mut self, delay_ms: u32) {
        self.stored = delay_ms;
        self.store_count += 1;
    }
}

/// Controller plus hardware double, driven tick by tick.
pub struct Bench {
    pub ctrl: Controller,
    pub hw: TestHardware,
    asleep: bool,
}

/// Time to let a debounce window settle plus one polling pass.
pub const SETTLE_MS: u32 = 8;

impl Bench {
    /// Boots a fresh controller against storage holding `stored`, running
    /// the one-time reset pass.
    pub fn boot(stored: u32) -> Self {
        let mut bench = Self {
            ctrl: Controller::new(),
            hw: TestHardware::with_stored(stored),
            asleep: false,
        };
        assert_eq!(bench.ctrl.poll(&mut bench.hw), PollOutcome::Ran);
        bench
    }

    /// Reboots in place, keeping the hardware (and its persisted word) and
    /// discarding all controller RAM, like a watchdog reset would.
    pub fn reboot(&mut self) {
        self.ctrl = Controller::new();
        self.asleep = false;
        assert_eq!(self.ctrl.poll(&mut self.hw), PollOutcome::Ran);
    }

    /// Applies a new logical level to one input, delivering the edge
    /// interrupt. Ignition and the three pushbuttons wake the part from
    /// suspend; high-beam and reverse edges are masked while asleep.
    pub fn set_level(&mut self, channel: ChannelId, level: bool) {
        if self.hw.levels[channel.as_index()] == level {
            return;
        }
        self.hw.levels[channel.as_index()] = level;
        let wakes = !matches!(channel, ChannelId::HighBeam | ChannelId::Reverse);
        if self.asleep && !wakes {
            return;
        }
        self.asleep = false;
        self.ctrl.on_edge(channel);
    }

    /// Runs `ms` one-millisecond iterations of tick interrupt plus polling
    /// pass. While suspended nothing runs; only a wake edge resumes.
    pub fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            if self.asleep {
                continue;
            }
            self.ctrl.on_tick(&mut self.hw);
            if self.ctrl.poll(&mut self.hw) == PollOutcome::Sleep {
                self.asleep = true;
            }
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Full press-and-release of one pushbutton, with settle time.
    pub fn press(&mut self, channel: ChannelId) {
        self.set_level(channel, true);
        self.run_ms(SETTLE_MS);
        self.set_level(channel, false);
        self.run_ms(SETTLE_MS);
    }
}
