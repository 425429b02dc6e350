use crate::datastructures::common::{LeapIndicator, TimeSource};

/// The time properties of the grandmaster currently in use.
///
/// A master advertises its own time properties; a slave takes over those of
/// the Announce messages of its parent.
///
/// For more details see *IEEE1588-2019 section 8.2.4*.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePropertiesDS {
    /// Offset between TAI and UTC in seconds, if known
    pub current_utc_offset: Option<i16>,
    /// Upcoming leap second, if any
    pub leap_indicator: LeapIndicator,
    /// Whether the timescale is traceable to a primary reference
    pub time_traceable: bool,
    /// Whether the frequency is traceable to a primary reference
    pub frequency_traceable: bool,
    /// `true` for the PTP (TAI based) timescale, `false` for an arbitrary one
    pub ptp_timescale: bool,
    /// The source of time of the grandmaster
    pub time_source: TimeSource,
}
