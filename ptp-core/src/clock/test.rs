//! A settable clock for tests

use core::cell::Cell;

use super::{PeriodicTask, Timer, TimerCapabilities, TimerHandle};
use crate::time::{TimeInterval, Timestamp};

#[derive(Debug)]
pub(crate) struct FakeTimer {
    pub(crate) now: Cell<Timestamp>,
    pub(crate) frequency: Cell<Option<f64>>,
    pub(crate) last_step: Cell<Option<TimeInterval>>,
    pub(crate) scheduled: Cell<Option<(core::time::Duration, PeriodicTask)>>,
    pub(crate) cancelled: Cell<Option<TimerHandle>>,
    pub(crate) fail: Cell<bool>,
}

impl FakeTimer {
    pub(crate) fn new(seconds: u64) -> Self {
        Self {
            now: Cell::new(Timestamp::new(seconds, 0).unwrap()),
            frequency: Cell::new(None),
            last_step: Cell::new(None),
            scheduled: Cell::new(None),
            cancelled: Cell::new(None),
            fail: Cell::new(false),
        }
    }

    pub(crate) fn advance_millis(&self, millis: i64) {
        self.now
            .set(self.now.get() + TimeInterval::from_nanos(millis * 1_000_000));
    }

    fn result(&self) -> Result<(), ()> {
        if self.fail.get() {
            Err(())
        } else {
            Ok(())
        }
    }
}

impl Timer for FakeTimer {
    type Error = ();

    fn now(&self) -> Timestamp {
        self.now.get()
    }

    fn schedule_periodic(
        &self,
        interval: core::time::Duration,
        task: PeriodicTask,
    ) -> Result<TimerHandle, Self::Error> {
        self.result()?;
        self.scheduled.set(Some((interval, task)));
        Ok(TimerHandle(7))
    }

    fn cancel(&self, handle: TimerHandle) -> Result<(), Self::Error> {
        self.result()?;
        self.cancelled.set(Some(handle));
        Ok(())
    }

    fn adjust_frequency(&self, ppb: f64) -> Result<(), Self::Error> {
        self.result()?;
        self.frequency.set(Some(ppb));
        Ok(())
    }

    fn step_clock(&self, offset: TimeInterval) -> Result<(), Self::Error> {
        self.result()?;
        self.last_step.set(Some(offset));
        self.now.set(self.now.get() + offset);
        Ok(())
    }

    fn capabilities(&self) -> TimerCapabilities {
        TimerCapabilities {
            frequency_adjustment: true,
            resolution: TimeInterval::from_nanos(1),
        }
    }
}
