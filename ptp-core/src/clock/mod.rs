//! Definitions of the abstract timer and clock interface

use crate::time::{TimeInterval, Timestamp};

/// Work the host should perform each time a scheduled period elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicTask {
    /// Call `tick` on the clock entity that scheduled the task
    Tick,
}

/// Identifies a periodic schedule so it can be cancelled again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

/// What the local clock supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerCapabilities {
    /// Whether [`Timer::adjust_frequency`] has any effect
    pub frequency_adjustment: bool,
    /// Resolution of [`Timer::now`]
    pub resolution: TimeInterval,
}

/// Access to the local clock and to the periodic scheduling of the host.
///
/// Every method takes `&self`: the same timer is shared by all ports of a
/// clock entity, so implementations use interior mutability where needed.
/// No method may block.
pub trait Timer {
    /// Error reported by the underlying clock device
    type Error: core::fmt::Debug;

    /// Get the current time of the clock. Used for all timeouts, so it must
    /// not jump backwards except through [`Timer::step_clock`].
    fn now(&self) -> Timestamp;

    /// Ask the host to perform `task` every `interval`
    fn schedule_periodic(
        &self,
        interval: core::time::Duration,
        task: PeriodicTask,
    ) -> Result<TimerHandle, Self::Error>;

    /// Stop a schedule created by [`Timer::schedule_periodic`]
    fn cancel(&self, handle: TimerHandle) -> Result<(), Self::Error>;

    /// Run the clock faster or slower than its nominal frequency, in parts
    /// per billion. Positive values speed the clock up. The adjustment
    /// replaces any earlier one.
    fn adjust_frequency(&self, ppb: f64) -> Result<(), Self::Error>;

    /// Change the current time of the clock by `offset`
    fn step_clock(&self, offset: TimeInterval) -> Result<(), Self::Error>;

    /// Report the capabilities of the clock
    fn capabilities(&self) -> TimerCapabilities;
}

#[cfg(test)]
pub(crate) mod test;
