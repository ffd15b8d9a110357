use embassy_time::{Duration, Ticker};

use control_core::{PowerState, ProgrammingState, Toggle};

use crate::status;

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

/// Periodic status line over RTT from the mirrored atomics; never touches
/// the controller lock.
#[embassy_executor::task]
pub async fn run() -> ! {
    let mut ticker = Ticker::every(Duration::from_secs(5));
    loop {
        ticker.next().await;
        let snap = status::snapshot();
        defmt::info!(
            "power={} prog={} v1={} v2={} horn={} delay_ms={}",
            power_label(snap.power),
            programming_label(snap.programming),
            toggle_label(snap.v1),
            toggle_label(snap.v2),
            snap.horn,
            snap.delay_ms,
        );
    }
}
