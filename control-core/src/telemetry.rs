//! Bounded transition log shared by firmware diagnostics, the emulator's
//! event pane, and the test suites.
//!
//! The log deliberately stays tiny: a fixed-capacity history buffer of
//! copyable events, overwriting the oldest entry when full. Nothing in the
//! control path ever blocks or fails on it.

use heapless::HistoryBuf;

use crate::channel::{AuxOutput, Toggle};
use crate::power::PowerState;
use crate::programming::ProgrammingState;

/// Capacity of the transition log.
pub const EVENT_LOG_DEPTH: usize = 32;

/// One recorded control-logic transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ControlEvent {
    Power(PowerState),
    Programming(ProgrammingState),
    ToggleChanged { aux: AuxOutput, state: Toggle },
    HornEngaged,
    HornReleased,
    DelayLoaded(u32),
    DelayCommitted(u32),
    SleepRequested,
}

/// Overwriting history of recent [`ControlEvent`]s.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    buf: HistoryBuf<ControlEvent, EVENT_LOG_DEPTH>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            buf: HistoryBuf::new(),
        }
    }

    pub fn record(&mut self, event: ControlEvent) {
        self.buf.write(event);
    }

    /// Iterates events oldest first.
    pub fn iter_oldest(&self) -> impl Iterator<Item = &ControlEvent> {
        self.buf.oldest_ordered()
    }

    /// Most recently recorded event, if any.
    pub fn last(&self) -> Option<&ControlEvent> {
        self.buf.recent()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_and_reports_last() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        log.record(ControlEvent::Power(PowerState::Down));
        log.record(ControlEvent::HornEngaged);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&ControlEvent::HornEngaged));

        let events: heapless::Vec<_, 4> = log.iter_oldest().copied().collect();
        assert_eq!(events[0], ControlEvent::Power(PowerState::Down));
        assert_eq!(events[1], ControlEvent::HornEngaged);
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let mut log = EventLog::new();
        for value in 0..(EVENT_LOG_DEPTH as u32 + 4) {
            log.record(ControlEvent::DelayCommitted(value));
        }
        assert_eq!(log.len(), EVENT_LOG_DEPTH);
        assert_eq!(log.iter_oldest().next(), Some(&ControlEvent::DelayCommitted(4)));
    }
}
