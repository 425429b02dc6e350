//! Common data structures that are used throughout the protocol

mod clock_identity;
mod clock_quality;
mod leap_indicator;
mod port_identity;
mod time_interval;
mod time_source;

pub use clock_identity::ClockIdentity;
pub use clock_quality::{ClockAccuracy, ClockQuality};
pub use leap_indicator::LeapIndicator;
pub use port_identity::PortIdentity;
pub use time_interval::TimeInterval;
pub use time_source::TimeSource;
