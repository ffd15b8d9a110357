use embassy_time::{Duration, Ticker};

use super::Shared;

/// 1 ms time base: advances the controller's counters, clocks the LED
/// patterns, and settles expired debounce windows.
#[embassy_executor::task]
pub async fn run(shared: &'static Shared) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(1));
    loop {
        ticker.next().await;
        shared.lock(|cell| {
            let state = &mut *cell.borrow_mut();
            state.controller.on_tick(&mut state.board);
        });
    }
}
