use crate::time::{TimeInterval, Timestamp};

/// A single offset measurement against the parent, handed to the
/// [`Filter`](`crate::filters::Filter`) of the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Receive time of the Sync the measurement is based on
    pub event_time: Timestamp,
    /// Local time minus master time
    pub offset: TimeInterval,
    /// Mean path delay, if it was part of this measurement
    pub delay: Option<TimeInterval>,
}
