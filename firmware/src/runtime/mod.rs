//! Embassy runtime wiring for the STM32G0 target.
//!
//! The controller and board live behind one critical-section mutex; the tick
//! task, the six edge tasks, and the control task are the only parties that
//! take it, and each holds it for a single non-blocking call. The control
//! task is also the watchdog owner.

use core::cell::RefCell;

use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU8, Ordering};
use static_cell::StaticCell;

use control_core::channel::{InputPolarity, input_by_id};
use control_core::{ChannelId, Controller};

use crate::status;

mod board;
mod control_task;
mod edge_task;
mod heartbeat_task;
mod tick_task;

use board::Board;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Controller plus board behind the shared lock.
pub(super) struct SharedState {
    pub controller: Controller,
    pub board: Board,
}

pub(super) type Shared = Mutex<CriticalSectionRawMutex, RefCell<SharedState>>;

static SHARED: StaticCell<Shared> = StaticCell::new();

/// Wake pulse delivered by wake-capable edge tasks while the control task is
/// parked in the suspend state.
pub(super) static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Latest polarity-corrected level per input channel, bit index =
/// `ChannelId::as_index`. Written by edge tasks, read by the debounce
/// resample through [`Board::read_input`].
pub(super) static LEVELS: AtomicU8 = AtomicU8::new(0);

pub(super) fn record_level(channel: ChannelId, asserted: bool) {
    let bit = 1u8 << channel.as_index();
    if asserted {
        LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
}

pub(super) fn level(channel: ChannelId) -> bool {
    LEVELS.load(Ordering::Relaxed) & (1 << channel.as_index()) != 0
}

/// Maps a raw pin sample to the logical asserted level for one channel.
pub(super) fn logical_level(channel: ChannelId, is_high: bool) -> bool {
    match input_by_id(channel).polarity {
        InputPolarity::ActiveHigh => is_high,
        InputPolarity::Inverted => !is_high,
    }
}

/// Watchdog window; the control task pets at least every 100 ms.
const WATCHDOG_TIMEOUT_US: u32 = 500_000;

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let p = hal::init(hal::Config::default());

    defmt::info!("accessory controller boot");

    let ignition = ExtiInput::new(p.PA3, p.EXTI3, Pull::Down);
    let reverse = ExtiInput::new(p.PA2, p.EXTI2, Pull::Down);
    let high_beam = ExtiInput::new(p.PA4, p.EXTI4, Pull::Down);
    let horn_switch = ExtiInput::new(p.PA0, p.EXTI0, Pull::Up);
    let switch1 = ExtiInput::new(p.PC6, p.EXTI6, Pull::Up);
    let switch2 = ExtiInput::new(p.PA1, p.EXTI1, Pull::Up);

    let inputs = [
        (ignition, ChannelId::Ignition, true),
        (reverse, ChannelId::Reverse, false),
        (high_beam, ChannelId::HighBeam, false),
        (horn_switch, ChannelId::HornSwitch, true),
        (switch1, ChannelId::Switch1, true),
        (switch2, ChannelId::Switch2, true),
    ];
    for (input, channel, _) in &inputs {
        record_level(*channel, logical_level(*channel, input.is_high()));
    }

    let board = Board::new(
        Output::new(p.PB3, Level::Low, Speed::Low),
        Output::new(p.PB4, Level::Low, Speed::Low),
        Output::new(p.PB5, Level::Low, Speed::Low),
        board::LedBank::new(p.TIM3, p.PA6, p.PA7, p.PB0, p.PB1, p.TIM4, p.PB6),
        p.FLASH,
    );

    let shared = SHARED.init(Mutex::new(RefCell::new(SharedState {
        controller: Controller::new(),
        board,
    })));

    // One reset pass before interrupts start consuming the state.
    shared.lock(|cell| {
        let state = &mut *cell.borrow_mut();
        let _ = state.controller.poll(&mut state.board);
        status::record(&state.controller, state.board.horn_is_on());
    });

    spawner
        .spawn(tick_task::run(shared))
        .expect("failed to spawn tick task");
    for (input, channel, wakes) in inputs {
        spawner
            .spawn(edge_task::run(shared, input, channel, wakes))
            .expect("failed to spawn edge task");
    }
    spawner
        .spawn(control_task::run(
            shared,
            IndependentWatchdog::new(p.IWDG, WATCHDOG_TIMEOUT_US),
        ))
        .expect("failed to spawn control task");
    spawner
        .spawn(heartbeat_task::run())
        .expect("failed to spawn heartbeat task");

    core::future::pending::<()>().await;
}
