mod common;

use common::{Bench, SETTLE_MS};
use control_core::channel::AuxOutput;
use control_core::config::DEFAULT_DELAY_MS;
use control_core::telemetry::ControlEvent;
use control_core::{ChannelId, LedId, OutputId, PowerState, Toggle};

/// One full drive cycle: key on, manual override, automatic signal, horn
/// burst, key off. Exercises the interaction of all four components the way
/// a rider would.
#[test]
fn full_drive_cycle() {
    let mut bench = Bench::boot(DEFAULT_DELAY_MS);
    bench.run_ms(SETTLE_MS);
    assert!(bench.is_asleep());

    // Key on.
    bench.set_level(ChannelId::Ignition, true);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.power_state(), PowerState::OnIgnition);

    // Rider claims V1 manually: output on, indicator steady.
    bench.press(ChannelId::Switch1);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V1), Toggle::OnUser);
    assert!(bench.hw.output(OutputId::V1));
    assert_eq!(bench.hw.duty(LedId::Switch1), 255);

    // High beam comes on: the user's claim is untouched, no breathing.
    bench.set_level(ChannelId::HighBeam, true);
    bench.run_ms(1_000);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V1), Toggle::OnUser);
    assert_eq!(bench.hw.duty(LedId::Switch1), 255);

    // Reverse engaged: V2 follows automatically.
    bench.set_level(ChannelId::Reverse, true);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V2), Toggle::OnAuto);
    assert!(bench.hw.output(OutputId::V2));

    // Horn burst: everything else is shed while it sounds.
    bench.set_level(ChannelId::HornSwitch, true);
    bench.run_ms(SETTLE_MS);
    assert!(bench.hw.output(OutputId::Horn));
    assert!(!bench.hw.output(OutputId::V1));
    assert!(!bench.hw.output(OutputId::V2));

    bench.set_level(ChannelId::HornSwitch, false);
    bench.run_ms(SETTLE_MS);
    assert!(!bench.hw.output(OutputId::Horn));
    assert!(bench.hw.output(OutputId::V1));
    assert!(bench.hw.output(OutputId::V2));

    // Key off: both toggles drop regardless of high-beam/reverse levels.
    bench.set_level(ChannelId::Ignition, false);
    bench.run_ms(SETTLE_MS);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V1), Toggle::Off);
    assert_eq!(bench.ctrl.toggle(AuxOutput::V2), Toggle::Off);
    assert_eq!(bench.hw.outputs, [false; 3]);
    assert_eq!(bench.hw.duties, [0; 5]);
    assert!(bench.is_asleep());

    let events: std::vec::Vec<_> = bench.ctrl.events().iter_oldest().copied().collect();
    assert!(events.contains(&ControlEvent::HornEngaged));
    assert!(events.contains(&ControlEvent::HornReleased));
    assert_eq!(
        bench.ctrl.events().last(),
        Some(&ControlEvent::SleepRequested)
    );
}
