//! Host-side hardware double backing the emulator session.
//!
//! Keeps the input levels, output states, and LED duties in plain arrays
//! and persists the delay word to an optional file so programmed values
//! survive an emulator restart the way the flash page does on the board.

use std::fs;
use std::path::PathBuf;

use control_core::{ChannelId, Hardware, LedId, OutputId};

pub struct EmuBoard {
    pub levels: [bool; 6],
    pub outputs: [bool; 3],
    pub duties: [u8; 5],
    pub settle_count: usize,
    persist_path: Option<PathBuf>,
}

impl EmuBoard {
    pub fn new(persist_path: Option<String>) -> Self {
        Self {
            levels: [false; 6],
            outputs: [false; 3],
            duties: [0; 5],
            settle_count: 0,
            persist_path: persist_path.map(PathBuf::from),
        }
    }

    pub fn output(&self, id: OutputId) -> bool {
        self.outputs[id.as_index()]
    }

    pub fn duty(&self, id: LedId) -> u8 {
        self.duties[id.as_index()]
    }
}

impl Hardware for EmuBoard {
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
        let Some(path) = &self.persist_path else {
            return u32::MAX;
        };
        fs::read_to_string(path)
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(u32::MAX)
    }

    fn store_delay_ms(&mut self, delay_ms: u32) {
        let Some(path) = &self.persist_path else {
            return;
        };
        if let Err(err) = fs::write(path, format!("{delay_ms}\n")) {
            eprintln!("failed to persist delay to {}: {err}", path.display());
        }
    }
}
