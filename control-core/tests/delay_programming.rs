mod common;

use common::{Bench, SETTLE_MS};
use control_core::channel::AuxOutput;
use control_core::config::DEFAULT_DELAY_MS;
use control_core::programming::{PROG_ACTIVATE_MS, PROG_COMMIT_MS};
use control_core::{ChannelId, LedId, PowerState, ProgrammingState, Toggle};

/// Drives the full activation hold: ignition on, both switches held for the
/// activation window, then released.
fn activate(bench: &mut Bench) {
    bench.set_level(ChannelId::Ignition, true);
    bench.run_ms(SETTLE_MS);

    bench.set_level(ChannelId::Switch1, true);
    bench.set_level(ChannelId::Switch2, true);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Activate);

    bench.run_ms(PROG_ACTIVATE_MS + 2);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Wait);

    bench.set_level(ChannelId::Switch1, false);
    bench.set_level(ChannelId::Switch2, false);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::OnWait);
}

#[test]
fn seven_presses_program_seven_minutes() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);

    for _ in 0..7 {
        bench.press(ChannelId::Switch1);
    }
    assert_eq!(bench.hw.store_count, 0, "no commit before the idle window");

    bench.run_ms(PROG_COMMIT_MS + 2);
    assert_eq!(bench.hw.stored, 420_000);
    assert_eq!(bench.hw.store_count, 1);
    assert_eq!(bench.ctrl.delay().as_ms(), 420_000);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::DisplayDwell);

    // Playback: 1 s dark dwell, then seven 500/500 ms blinks.
    bench.run_ms(1_000 + 7 * 1_000 + 100);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Reset);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V1), Toggle::Off);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V2), Toggle::Off);
}

#[test]
fn programmed_delay_survives_reboot_and_times_out_precisely() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);
    for _ in 0..7 {
        bench.press(ChannelId::Switch2);
    }
    bench.run_ms(PROG_COMMIT_MS + 2);
    bench.run_ms(10_000);
    bench.set_level(ChannelId::Ignition, false);
    bench.run_ms(SETTLE_MS);

    bench.reboot();
    assert_eq!(bench.ctrl.delay().as_ms(), 420_000);

    bench.press(ChannelId::Switch1);
    assert_eq!(bench.ctrl.power_state(), PowerState::OnSwitch);

    bench.run_ms(420_000 - 100);
    assert_eq!(bench.ctrl.power_state(), PowerState::OnSwitch);
    bench.run_ms(200);
    assert_eq!(bench.ctrl.power_state(), PowerState::Down);
    assert!(bench.is_asleep());
}

#[test]
fn presses_clamp_at_twenty_minutes() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);

    for _ in 0..25 {
        bench.press(ChannelId::Switch1);
    }
    bench.run_ms(PROG_COMMIT_MS + 2);
    assert_eq!(bench.hw.stored, 1_200_000);
}

#[test]
fn zero_presses_commit_zero_with_no_playback_blinks() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);

    bench.run_ms(PROG_COMMIT_MS + 2);
    assert_eq!(bench.hw.stored, 0);
    // A zero commit skips the blink playback entirely.
    bench.run_ms(10);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Reset);
    assert_eq!(bench.hw.duty(LedId::Switch1), 0);
    assert_eq!(bench.hw.duty(LedId::Switch2), 0);
}

#[test]
fn releasing_the_hold_early_aborts_activation() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    bench.set_level(ChannelId::Ignition, true);
    bench.run_ms(SETTLE_MS);

    bench.set_level(ChannelId::Switch1, true);
    bench.set_level(ChannelId::Switch2, true);
    bench.run_ms(PROG_ACTIVATE_MS / 2);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Activate);

    bench.set_level(ChannelId::Switch2, false);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Reset);
    assert_eq!(bench.hw.store_count, 0);
}

#[test]
fn ignition_loss_aborts_without_committing() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);
    for _ in 0..3 {
        bench.press(ChannelId::Switch1);
    }

    bench.set_level(ChannelId::Ignition, false);
    bench.run_ms(SETTLE_MS);

    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Reset);
    assert_eq!(bench.hw.store_count, 0);
    assert_eq!(bench.hw.stored, DEFAULT_DELAY_MS);
    assert_eq!(bench.ctrl.delay().as_ms(), DEFAULT_DELAY_MS);
}

#[test]
fn a_key_cycle_cannot_resume_an_aborted_session() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);
    for _ in 0..3 {
        bench.press(ChannelId::Switch1);
    }

    // Key off, let the part fall asleep, then key back on.
    bench.set_level(ChannelId::Ignition, false);
    bench.run_ms(1_000);
    assert!(bench.is_asleep());
    bench.set_level(ChannelId::Ignition, true);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Reset);

    // The abandoned minute count must not commit once the old idle window
    // would have elapsed.
    bench.run_ms(PROG_COMMIT_MS + 2);
    assert_eq!(bench.hw.store_count, 0);
    assert_eq!(bench.hw.stored, DEFAULT_DELAY_MS);
    assert_eq!(bench.ctrl.delay().as_ms(), DEFAULT_DELAY_MS);
}

#[test]
fn the_horn_still_sounds_during_programming() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    activate(&mut bench);

    bench.set_level(ChannelId::HornSwitch, true);
    bench.run_ms(SETTLE_MS);
    assert!(bench.hw.output(control_core::OutputId::Horn));

    // The switch indicators stay with the programming session.
    bench.run_ms(2_000);
    assert_eq!(
        bench.hw.duty(LedId::Switch1),
        bench.hw.duty(LedId::Switch2)
    );

    bench.set_level(ChannelId::HornSwitch, false);
    bench.run_ms(SETTLE_MS);
    assert!(!bench.hw.output(control_core::OutputId::Horn));
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::OnWait);
}

#[test]
fn programming_owns_the_switch_indicators() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    bench.set_level(ChannelId::Ignition, true);
    bench.run_ms(SETTLE_MS);

    // A live user toggle is cleared on entry and its indicator handed over.
    bench.press(ChannelId::Switch1);
    assert_eq!(bench.hw.duty(LedId::Switch1), 255);

    bench.set_level(ChannelId::Switch1, true);
    bench.set_level(ChannelId::Switch2, true);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.programming_state(), ProgrammingState::Activate);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V1), Toggle::Off);
    assert!(!bench.hw.output(control_core::OutputId::V1));

    // The flash clock now drives both indicators in lockstep.
    bench.run_ms(2_000);
    assert_eq!(
        bench.hw.duty(LedId::Switch1),
        bench.hw.duty(LedId::Switch2)
    );
}
