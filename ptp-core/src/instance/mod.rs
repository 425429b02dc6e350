//! Clock entities built from ports.
//!
//! * [`OrdinaryClock`]: a single port, either master or slave
//! * [`BoundaryClock`]: several independent ports sharing a clock
//! * [`TransparentClock`]: forwards event messages and corrects them for the
//!   time they spent inside the device
//!
//! The ordinary and boundary clocks ask the host to call their `tick`
//! method every [`TICK_INTERVAL`] once started.

use core::time::Duration;

pub use boundary::BoundaryClock;
pub use ordinary::OrdinaryClock;
pub use transparent::{correct_residence_time, TransparentClock, TransparentMode};

use crate::{
    clock::{PeriodicTask, Timer, TimerHandle},
    Error,
};

mod boundary;
mod ordinary;
mod transparent;

/// Most ports a boundary or transparent clock can have
pub const MAX_PORTS: usize = 8;

/// Period of the [`PeriodicTask::Tick`] scheduled by a started clock
pub const TICK_INTERVAL: Duration = Duration::from_millis(125);

fn schedule_tick<C: Timer>(timer: &C) -> Result<TimerHandle, Error> {
    timer
        .schedule_periodic(TICK_INTERVAL, PeriodicTask::Tick)
        .map_err(|error| {
            log::error!("could not schedule tick: {:?}", error);
            Error::HardwareError
        })
}

fn cancel_tick<C: Timer>(timer: &C, handle: TimerHandle) -> Result<(), Error> {
    timer.cancel(handle).map_err(|error| {
        log::error!("could not cancel tick: {:?}", error);
        Error::HardwareError
    })
}

/// Remember the first error of a fan-out over several ports
fn keep_first<T>(result: &mut Result<T, Error>, next: Result<T, Error>) {
    if result.is_ok() {
        *result = next;
    }
}
