//! A simulated oscillator implementing [`Timer`]

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use ptp_core::{
    clock::{PeriodicTask, Timer, TimerCapabilities, TimerHandle},
    time::{TimeInterval, Timestamp},
};
use thiserror::Error;
use tokio::time::Instant;

/// Largest frequency correction the simulated oscillator accepts
pub const MAX_FREQUENCY_ADJUSTMENT_PPB: f64 = 1_000_000.0;

/// Start of the simulated timescale, as seen by a clock without offset
pub const SIMULATION_EPOCH_NANOS: i128 = 1_700_000_000 * 1_000_000_000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimClockError {
    #[error("unknown timer handle {0}")]
    UnknownHandle(u32),
    #[error("frequency adjustment out of range")]
    FrequencyOutOfRange,
}

#[derive(Debug)]
struct ClockState {
    /// Instant at which `local_at_base` was the local time
    base: Instant,
    local_at_base: i128,
    frequency_error_ppb: f64,
    adjustment_ppb: f64,
    next_handle: u32,
    schedules: Vec<(TimerHandle, Duration, PeriodicTask)>,
}

impl ClockState {
    fn local_at(&self, instant: Instant) -> i128 {
        let elapsed = match instant.checked_duration_since(self.base) {
            Some(elapsed) => elapsed.as_nanos() as i128,
            None => -((self.base - instant).as_nanos() as i128),
        };
        let drift_ppb = self.frequency_error_ppb + self.adjustment_ppb;
        let drift = (elapsed as f64 * drift_ppb / 1e9).round() as i128;
        self.local_at_base + elapsed + drift
    }

    /// Fold the time elapsed at the current rate into the base, so the rate
    /// can change
    fn rebase(&mut self, now: Instant) {
        self.local_at_base = self.local_at(now);
        self.base = now;
    }
}

/// A clock running at a fixed frequency error relative to the tokio clock,
/// which stands in for true time.
///
/// Clones share the same clock, so the simulated network can stamp frames
/// with the time of the receiving node.
#[derive(Debug, Clone)]
pub struct SimClock {
    state: Arc<Mutex<ClockState>>,
}

impl SimClock {
    /// Create a clock that reads `SIMULATION_EPOCH_NANOS + offset_ns` at
    /// `start`
    pub fn new(start: Instant, offset_ns: i64, frequency_error_ppm: f64) -> Self {
        SimClock {
            state: Arc::new(Mutex::new(ClockState {
                base: start,
                local_at_base: SIMULATION_EPOCH_NANOS + offset_ns as i128,
                frequency_error_ppb: frequency_error_ppm * 1000.0,
                adjustment_ppb: 0.0,
                next_handle: 1,
                schedules: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Local time in nanoseconds at `instant`
    pub fn nanos_at(&self, instant: Instant) -> i128 {
        self.state().local_at(instant)
    }

    pub fn timestamp_at(&self, instant: Instant) -> Timestamp {
        let nanos = self.nanos_at(instant).clamp(0, u64::MAX as i128);
        Timestamp::from_nanos(nanos as u64)
    }

    /// How far this clock is ahead of `other` right now
    pub fn offset_from(&self, other: &SimClock) -> i128 {
        let now = Instant::now();
        self.nanos_at(now) - other.nanos_at(now)
    }

    /// The frequency correction last requested through
    /// [`Timer::adjust_frequency`]
    pub fn adjustment_ppb(&self) -> f64 {
        self.state().adjustment_ppb
    }

    /// Interval of the tick schedule, if one is active
    pub fn tick_interval(&self) -> Option<Duration> {
        self.state()
            .schedules
            .iter()
            .find(|(_, _, task)| *task == PeriodicTask::Tick)
            .map(|(_, interval, _)| *interval)
    }
}

impl Timer for SimClock {
    type Error = SimClockError;

    fn now(&self) -> Timestamp {
        self.timestamp_at(Instant::now())
    }

    fn schedule_periodic(
        &self,
        interval: Duration,
        task: PeriodicTask,
    ) -> Result<TimerHandle, Self::Error> {
        let mut state = self.state();
        let handle = TimerHandle(state.next_handle);
        state.next_handle = state.next_handle.wrapping_add(1);
        state.schedules.push((handle, interval, task));
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> Result<(), Self::Error> {
        let mut state = self.state();
        let index = state
            .schedules
            .iter()
            .position(|(scheduled, _, _)| *scheduled == handle)
            .ok_or(SimClockError::UnknownHandle(handle.0))?;
        state.schedules.remove(index);
        Ok(())
    }

    fn adjust_frequency(&self, ppb: f64) -> Result<(), Self::Error> {
        if !ppb.is_finite() || ppb.abs() > MAX_FREQUENCY_ADJUSTMENT_PPB {
            return Err(SimClockError::FrequencyOutOfRange);
        }

        let mut state = self.state();
        state.rebase(Instant::now());
        state.adjustment_ppb = ppb;
        Ok(())
    }

    fn step_clock(&self, offset: TimeInterval) -> Result<(), Self::Error> {
        let mut state = self.state();
        state.rebase(Instant::now());
        state.local_at_base += offset.nanos() as i128;
        log::debug!("stepped clock by {}ns", offset.nanos());
        Ok(())
    }

    fn capabilities(&self) -> TimerCapabilities {
        TimerCapabilities {
            frequency_adjustment: true,
            resolution: TimeInterval::from_nanos(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn drifts_at_its_frequency_error() {
        let start = Instant::now();
        let fast = SimClock::new(start, 0, 10.0);
        let exact = SimClock::new(start, 500, 0.0);

        assert_eq!(fast.nanos_at(start), SIMULATION_EPOCH_NANOS);
        assert_eq!(exact.offset_from(&fast), 500);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(fast.offset_from(&exact), 10_000 - 500);
    }

    #[tokio::test(start_paused = true)]
    async fn frequency_adjustment_cancels_the_error() {
        let start = Instant::now();
        let clock = SimClock::new(start, 0, -25.0);
        let reference = SimClock::new(start, 0, 0.0);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(clock.offset_from(&reference), -50_000);

        clock.adjust_frequency(25_000.0).unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(clock.offset_from(&reference), -50_000);
        assert_eq!(clock.adjustment_ppb(), 25_000.0);

        assert_eq!(
            clock.adjust_frequency(2e6),
            Err(SimClockError::FrequencyOutOfRange)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn step_moves_the_clock() {
        let start = Instant::now();
        let clock = SimClock::new(start, 3_000_000, 0.0);
        let reference = SimClock::new(start, 0, 0.0);

        clock.step_clock(TimeInterval::from_nanos(-3_000_000)).unwrap();
        assert_eq!(clock.offset_from(&reference), 0);
        assert_eq!(
            clock.now(),
            Timestamp::from_nanos(SIMULATION_EPOCH_NANOS as u64)
        );
    }

    #[tokio::test]
    async fn schedules_are_tracked_by_handle() {
        let clock = SimClock::new(Instant::now(), 0, 0.0);
        assert_eq!(clock.tick_interval(), None);

        let handle = clock
            .schedule_periodic(Duration::from_millis(125), PeriodicTask::Tick)
            .unwrap();
        assert_eq!(clock.tick_interval(), Some(Duration::from_millis(125)));

        clock.cancel(handle).unwrap();
        assert_eq!(clock.tick_interval(), None);
        assert_eq!(
            clock.cancel(handle),
            Err(SimClockError::UnknownHandle(handle.0))
        );
    }
}
