//! Definitions and implementations for the abstracted measurement filters

mod pi;

pub use pi::{PiFilter, ServoConfig};

use crate::{clock::Timer, port::Measurement, time::TimeInterval};

/// What a [`Filter`] did with the clock in response to a measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterUpdate {
    /// The clock was stepped by the given amount
    Stepped(TimeInterval),
    /// The clock frequency was set to the given offset, in parts per billion
    Steered(f64),
}

/// A filter for post-processing time measurements.
///
/// Filters are responsible for dealing with the network noise, and should
/// average out the input a bit so minor network variations are not immediately
/// reflected in the synchronization of the clock.
///
/// This crate provides a [`PiFilter`] which is suitable for most needs, but
/// users can implement their own if desired.
pub trait Filter {
    /// Configuration for this [`Filter`]
    ///
    /// This is used to construct a new [`Filter`] instance using
    /// [`new`](`Filter::new`).
    type Config: Clone;

    /// Create a new instance of the filter.
    fn new(config: Self::Config) -> Self;

    /// Put a new measurement in the filter.
    /// The filter can then use this to adjust the clock
    fn measurement<C: Timer>(
        &mut self,
        measurement: Measurement,
        timer: &C,
    ) -> Result<FilterUpdate, C::Error>;

    /// Handle ending of time synchronization from the source
    /// associated with this filter.
    fn demobilize(&mut self);
}
