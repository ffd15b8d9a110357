use embassy_stm32::exti::ExtiInput;

use control_core::ChannelId;

use super::{Shared, WAKE, logical_level, record_level};

/// One edge-sense task per input line. Publishes the new level to the
/// shared mask, delivers the edge to the debounce engine, and pulses the
/// wake signal for the channels allowed to end a suspend. High-beam and
/// reverse are not wake sources; their levels are picked up once the
/// ignition brings the system back.
#[embassy_executor::task(pool_size = 6)]
pub async fn run(
    shared: &'static Shared,
    mut input: ExtiInput<'static>,
    channel: ChannelId,
    wakes: bool,
) -> ! {
    loop {
        input.wait_for_any_edge().await;
        record_level(channel, logical_level(channel, input.is_high()));
        shared.lock(|cell| {
            cell.borrow_mut().controller.on_edge(channel);
        });
        if wakes {
            WAKE.signal(());
        }
    }
}
