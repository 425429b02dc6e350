//! Types that describe points in time ([`Timestamp`]), and durations between
//! two instants ([`TimeInterval`], [`Interval`])
//!
//! These follow the on the wire representation of time in PTP: a timestamp
//! is 48 bits of seconds plus 32 bits of nanoseconds, and an interval is a
//! signed number of nanoseconds scaled by 2^16.

mod interval;
mod timestamp;

pub use interval::Interval;
pub use timestamp::Timestamp;

pub use crate::datastructures::common::TimeInterval;
