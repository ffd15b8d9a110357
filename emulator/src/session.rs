//! Interactive emulator session: parses line commands, steps the simulated
//! millisecond clock, and renders controller state.
//!
//! The stepping discipline matches the firmware runtime: each simulated
//! millisecond delivers one tick interrupt and one polling pass, a suspend
//! request freezes the loop, and only wake-capable edges resume it.

use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};

use control_core::channel::AuxOutput;
use control_core::telemetry::ControlEvent;
use control_core::{
    ChannelId, Controller, LedId, OutputId, PollOutcome, PowerState, ProgrammingState, Toggle,
};

use crate::board::EmuBoard;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "ign",
        "ign <on|off>            - set the ignition feed level",
    ),
    (
        "highbeam",
        "highbeam <on|off>       - set the high-beam signal level",
    ),
    (
        "reverse",
        "reverse <on|off>        - set the reverse signal level",
    ),
    (
        "horn",
        "horn <on|off>           - hold or release the horn button",
    ),
    (
        "sw",
        "sw1|sw2 <on|off>        - hold or release a switch button",
    ),
    (
        "press",
        "press <1|2>             - momentary press of a switch button",
    ),
    (
        "run",
        "run <duration>          - advance simulated time (e.g. 500ms, 10s, 5m)",
    ),
    (
        "status",
        "status                  - display controller and output state",
    ),
    (
        "events",
        "events                  - dump the recent transition log",
    ),
    (
        "reboot",
        "reboot                  - watchdog-style reset, keeping persisted state",
    ),
];

/// Time to let a debounce window settle inside compound commands.
const SETTLE_MS: u32 = 8;

pub struct Session {
    ctrl: Controller,
    board: EmuBoard,
    asleep: bool,
    sim_ms: u64,
}

impl Session {
    pub fn new(persist_path: Option<String>) -> Self {
        let mut session = Self {
            ctrl: Controller::new(),
            board: EmuBoard::new(persist_path),
            asleep: false,
            sim_ms: 0,
        };
        let _ = session.ctrl.poll(&mut session.board);
        session
    }

    pub fn handle_command(&mut self, line: &str) -> Vec<String> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Vec::new();
        };
        let argument = parts.next();
        if parts.next().is_some() {
            return vec![format!("Too many arguments for `{command}`")];
        }

        match (command.to_ascii_lowercase().as_str(), argument) {
            ("help", topic) => self.handle_help(topic),
            ("ign", Some(level)) => self.handle_level(ChannelId::Ignition, level),
            ("highbeam", Some(level)) => self.handle_level(ChannelId::HighBeam, level),
            ("reverse", Some(level)) => self.handle_level(ChannelId::Reverse, level),
            ("horn", Some(level)) => self.handle_level(ChannelId::HornSwitch, level),
            ("sw1", Some(level)) => self.handle_level(ChannelId::Switch1, level),
            ("sw2", Some(level)) => self.handle_level(ChannelId::Switch2, level),
            ("press", Some(button)) => self.handle_press(button),
            ("run", Some(duration)) => self.handle_run(duration),
            ("status", None) => self.render_status(),
            ("events", None) => self.render_events(),
            ("reboot", None) => self.handle_reboot(),
            _ => vec![format!(
                "Unknown or incomplete command `{line}`; try `help`"
            )],
        }
    }

    fn handle_help(&self, topic: Option<&str>) -> Vec<String> {
        match topic {
            None => HELP_TOPICS
                .iter()
                .map(|(_, text)| (*text).to_string())
                .collect(),
            Some(topic) => HELP_TOPICS
                .iter()
                .find(|(name, _)| topic.starts_with(name))
                .map(|(_, text)| vec![(*text).to_string()])
                .unwrap_or_else(|| vec![format!("No help for `{topic}`")]),
        }
    }

    fn handle_level(&mut self, channel: ChannelId, level: &str) -> Vec<String> {
        let Some(level) = parse_level(level) else {
            return vec!["Expected `on` or `off`".to_string()];
        };
        self.set_level(channel, level);
        self.step(SETTLE_MS);
        self.render_status()
    }

    fn handle_press(&mut self, button: &str) -> Vec<String> {
        let channel = match button {
            "1" => ChannelId::Switch1,
            "2" => ChannelId::Switch2,
            _ => return vec!["Expected `press 1` or `press 2`".to_string()],
        };
        self.set_level(channel, true);
        self.step(SETTLE_MS);
        self.set_level(channel, false);
        self.step(SETTLE_MS);
        self.render_status()
    }

    fn handle_run(&mut self, duration: &str) -> Vec<String> {
        let Some(ms) = parse_duration_ms(duration) else {
            return vec![format!("Cannot parse duration `{duration}`")];
        };
        self.step(ms);
        self.render_status()
    }

    fn handle_reboot(&mut self) -> Vec<String> {
        self.ctrl = Controller::new();
        self.asleep = false;
        let _ = self.ctrl.poll(&mut self.board);
        let mut lines = vec!["Controller reset.".to_string()];
        lines.extend(self.render_status());
        lines
    }

    fn set_level(&mut self, channel: ChannelId, level: bool) {
        if self.board.levels[channel.as_index()] == level {
            return;
        }
        self.board.levels[channel.as_index()] = level;
        let wakes = !matches!(channel, ChannelId::HighBeam | ChannelId::Reverse);
        if self.asleep && !wakes {
            return;
        }
        self.asleep = false;
        self.ctrl.on_edge(channel);
    }

    fn step(&mut self, ms: u32) {
        for _ in 0..ms {
            self.sim_ms += 1;
            if self.asleep {
                continue;
            }
            self.ctrl.on_tick(&mut self.board);
            if self.ctrl.poll(&mut self.board) == PollOutcome::Sleep {
                self.asleep = true;
            }
        }
    }

    fn render_status(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let power = if self.asleep {
            "down (suspended)".to_string()
        } else {
            power_label(self.ctrl.power_state()).to_string()
        };
        lines.push(format!(
            "t={}ms  power={power}  programming={}  delay={}s",
            self.sim_ms,
            programming_label(self.ctrl.programming_state()),
            self.ctrl.delay().as_ms() / 1_000,
        ));

        let mut inputs = String::from("inputs:  ");
        for (name, channel) in [
            ("ign", ChannelId::Ignition),
            ("rev", ChannelId::Reverse),
            ("hb", ChannelId::HighBeam),
            ("horn", ChannelId::HornSwitch),
            ("sw1", ChannelId::Switch1),
            ("sw2", ChannelId::Switch2),
        ] {
            let _ = write!(inputs, "{name}={} ", level_glyph(self.ctrl.input_stable(channel)));
        }
        lines.push(inputs);

        lines.push(format!(
            "outputs: horn={} v1={} v2={}   toggles: v1={} v2={}",
            level_glyph(self.board.output(OutputId::Horn)),
            level_glyph(self.board.output(OutputId::V1)),
            level_glyph(self.board.output(OutputId::V2)),
            toggle_label(self.ctrl.toggle(AuxOutput::V1)),
            toggle_label(self.ctrl.toggle(AuxOutput::V2)),
        ));

        let rgb = Color::Rgb {
            r: self.board.duty(LedId::HornRed),
            g: self.board.duty(LedId::HornGreen),
            b: self.board.duty(LedId::HornBlue),
        };
        lines.push(format!(
            "leds:    horn={} sw1={} sw2={}",
            "●".with(rgb),
            duty_glyph(self.board.duty(LedId::Switch1)),
            duty_glyph(self.board.duty(LedId::Switch2)),
        ));
        lines
    }

    fn render_events(&self) -> Vec<String> {
        let lines: Vec<String> = self
            .ctrl
            .events()
            .iter_oldest()
            .map(|event| format!("  {}", event_label(event)))
            .collect();
        if lines.is_empty() {
            vec!["No recorded events.".to_string()]
        } else {
            lines
        }
    }
}

fn parse_level(text: &str) -> Option<bool> {
    match text {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

/// Parses `500ms`, `10s`, or `5m` into milliseconds.
fn parse_duration_ms(text: &str) -> Option<u32> {
    let (digits, scale) = if let Some(head) = text.strip_suffix("ms") {
        (head, 1)
    } else if let Some(head) = text.strip_suffix('s') {
        (head, 1_000)
    } else if let Some(head) = text.strip_suffix('m') {
        (head, 60_000)
    } else {
        (text, 1)
    };
    digits
        .parse::<u32>()
        .ok()
        .and_then(|value| value.checked_mul(scale))
}

fn level_glyph(on: bool) -> String {
    if on {
        "ON".green().bold().to_string()
    } else {
        "off".dark_grey().to_string()
    }
}

fn duty_glyph(duty: u8) -> String {
    let glyph = match duty {
        0 => "·",
        1..=127 => "◐",
        _ => "●",
    };
    glyph
        .with(Color::Rgb {
            r: duty,
            g: duty,
            b: 0,
        })
        .to_string()
}

const fn power_label(state: PowerState) -> &'static str {
    match state {
        PowerState::Reset => "reset",
        PowerState::Down => "down",
        PowerState::OnIgnition => "on-ignition",
        PowerState::OnSwitch => "on-switch",
    }
}

const fn programming_label(state: ProgrammingState) -> &'static str {
    match state {
        ProgrammingState::Reset => "idle",
        ProgrammingState::Activate => "activate",
        ProgrammingState::Wait => "wait",
        ProgrammingState::OnWait => "on-wait",
        ProgrammingState::OffWait => "off-wait",
        ProgrammingState::DisplayDwell => "display-dwell",
        ProgrammingState::Display => "display",
    }
}

const fn toggle_label(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::Off => "off",
        Toggle::OnAuto => "auto",
        Toggle::OnUser => "user",
    }
}

fn event_label(event: &ControlEvent) -> String {
    match event {
        ControlEvent::Power(state) => format!("power -> {}", power_label(*state)),
        ControlEvent::Programming(state) => {
            format!("programming -> {}", programming_label(*state))
        }
        ControlEvent::ToggleChanged { aux, state } => {
            let name = match aux {
                AuxOutput::V1 => "v1",
                AuxOutput::V2 => "v2",
            };
            format!("toggle {name} -> {}", toggle_label(*state))
        }
        ControlEvent::HornEngaged => "horn engaged".to_string(),
        ControlEvent::HornReleased => "horn released".to_string(),
        ControlEvent::DelayLoaded(ms) => format!("delay loaded: {ms} ms"),
        ControlEvent::DelayCommitted(ms) => format!("delay committed: {ms} ms"),
        ControlEvent::SleepRequested => "sleep requested".to_string(),
    }
}
