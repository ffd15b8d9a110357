use embassy_futures::select::{Either, select};
use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_time::{Duration, Ticker, Timer};

use control_core::PollOutcome;

use crate::status;

use super::{Shared, WAKE};

/// Interval between watchdog pets while parked in suspend. The watchdog
/// cannot be frozen, so the park services it without running the state
/// machines.
const PARKED_PET_INTERVAL: Duration = Duration::from_millis(100);

/// Cooperative polling loop and watchdog owner. Each iteration pets the
/// watchdog and runs one pass of the state machines; a suspend request parks
/// the task on the wake signal.
#[embassy_executor::task]
pub async fn run(shared: &'static Shared, mut watchdog: IndependentWatchdog<'static, IWDG>) -> ! {
    watchdog.unleash();
    let mut pacer = Ticker::every(Duration::from_millis(1));
    loop {
        watchdog.pet();
        let outcome = shared.lock(|cell| {
            let state = &mut *cell.borrow_mut();
            let outcome = state.controller.poll(&mut state.board);
            status::record(&state.controller, state.board.horn_is_on());
            outcome
        });
        match outcome {
            PollOutcome::Ran => pacer.next().await,
            PollOutcome::Sleep => {
                defmt::debug!("suspending until wake edge");
                loop {
                    match select(WAKE.wait(), Timer::after(PARKED_PET_INTERVAL)).await {
                        Either::First(()) => break,
                        Either::Second(()) => watchdog.pet(),
                    }
                }
                pacer.reset();
            }
        }
    }
}
