#![no_std]

// Control logic for the accessory relay controller.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library and talking to the board exclusively through the
// [`hal::Hardware`] trait. Everything timing-related is expressed in 1 ms
// ticks so the same state machines run under the firmware tick interrupt,
// the host emulator, and the test suites.

pub mod arbitrate;
pub mod channel;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod hal;
pub mod pattern;
pub mod power;
pub mod programming;
pub mod telemetry;

pub use channel::{AuxOutput, ChannelId, LedId, OutputId, Toggle};
pub use config::DelaySetting;
pub use controller::{Controller, PollOutcome};
pub use hal::Hardware;
pub use power::PowerState;
pub use programming::ProgrammingState;
