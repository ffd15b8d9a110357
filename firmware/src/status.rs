#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! Lightweight atomics mirror the controller's externally visible state so
//! the heartbeat log can report it without taking the controller lock in a
//! second task.

use control_core::channel::AuxOutput;
use control_core::{Controller, PowerState, ProgrammingState, Toggle};
use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

static POWER: AtomicU8 = AtomicU8::new(0);
static PROGRAMMING: AtomicU8 = AtomicU8::new(0);
/// Bit 0/1: V1/V2 toggle on; bit 2: toggle is user-owned (per output bits 2/3).
static TOGGLE_MASK: AtomicU8 = AtomicU8::new(0);
static HORN: AtomicBool = AtomicBool::new(false);
static DELAY_MS: AtomicU32 = AtomicU32::new(0);

/// Plain snapshot of the mirrored fields for one heartbeat line.
#[derive(Copy, Clone, Debug)]
pub struct StatusSnapshot {
    pub power: PowerState,
    pub programming: ProgrammingState,
    pub v1: Toggle,
    pub v2: Toggle,
    pub horn: bool,
    pub delay_ms: u32,
}

const fn power_code(state: PowerState) -> u8 {
    match state {
        PowerState::Reset => 0,
        PowerState::Down => 1,
        PowerState::OnIgnition => 2,
        PowerState::OnSwitch => 3,
    }
}

const fn power_from_code(code: u8) -> PowerState {
    match code {
        1 => PowerState::Down,
        2 => PowerState::OnIgnition,
        3 => PowerState::OnSwitch,
        _ => PowerState::Reset,
    }
}

const fn programming_code(state: ProgrammingState) -> u8 {
    match state {
        ProgrammingState::Reset => 0,
        ProgrammingState::Activate => 1,
        ProgrammingState::Wait => 2,
        ProgrammingState::OnWait => 3,
        ProgrammingState::OffWait => 4,
        ProgrammingState::DisplayDwell => 5,
        ProgrammingState::Display => 6,
    }
}

const fn programming_from_code(code: u8) -> ProgrammingState {
    match code {
        1 => ProgrammingState::Activate,
        2 => ProgrammingState::Wait,
        3 => ProgrammingState::OnWait,
        4 => ProgrammingState::OffWait,
        5 => ProgrammingState::DisplayDwell,
        6 => ProgrammingState::Display,
        _ => ProgrammingState::Reset,
    }
}

const fn toggle_bits(toggle: Toggle, index: usize) -> u8 {
    let on = matches!(toggle, Toggle::OnAuto | Toggle::OnUser) as u8;
    let user = matches!(toggle, Toggle::OnUser) as u8;
    (on << index) | (user << (index + 2))
}

const fn toggle_from_bits(mask: u8, index: usize) -> Toggle {
    if mask & (1 << (index + 2)) != 0 {
        Toggle::OnUser
    } else if mask & (1 << index) != 0 {
        Toggle::OnAuto
    } else {
        Toggle::Off
    }
}

/// Mirrors the controller's visible state. Called by the control task after
/// every polling pass, while it still holds the shared-state lock; readers
/// go through [`snapshot`] and never take that lock.
pub fn record(controller: &Controller, horn: bool) {
    POWER.store(power_code(controller.power_state()), Ordering::Relaxed);
    PROGRAMMING.store(
        programming_code(controller.programming_state()),
        Ordering::Relaxed,
    );
    let mask = toggle_bits(controller.toggle(AuxOutput::V1), 0)
        | toggle_bits(controller.toggle(AuxOutput::V2), 1);
    TOGGLE_MASK.store(mask, Ordering::Relaxed);
    HORN.store(horn, Ordering::Relaxed);
    DELAY_MS.store(controller.delay().as_ms(), Ordering::Relaxed);
}

/// Builds a snapshot from the mirrored fields.
pub fn snapshot() -> StatusSnapshot {
    let mask = TOGGLE_MASK.load(Ordering::Relaxed);
    StatusSnapshot {
        power: power_from_code(POWER.load(Ordering::Relaxed)),
        programming: programming_from_code(PROGRAMMING.load(Ordering::Relaxed)),
        v1: toggle_from_bits(mask, 0),
        v2: toggle_from_bits(mask, 1),
        horn: HORN.load(Ordering::Relaxed),
        delay_ms: DELAY_MS.load(Ordering::Relaxed),
    }
}
