use super::TimeInterval;

/// A log2 representation of seconds used to describe the pacing of events in
/// PTP
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval(i8);

impl core::fmt::Debug for Interval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interval")
            .field("log_base_2", &self.0)
            .field("duration", &self.as_core_duration())
            .finish()
    }
}

impl Interval {
    /// An Interval of one second
    pub const ONE_SECOND: Self = Self(0);

    /// An Interval of two seconds
    pub const TWO_SECONDS: Self = Self(1);

    /// Smallest log interval accepted in a port configuration (1/128 s)
    pub const MIN_LOG_2: i8 = -7;

    /// Largest log interval accepted in a port configuration (16 s)
    pub const MAX_LOG_2: i8 = 4;

    /// Construct an [`Interval`] from log2 seconds.
    ///
    /// # Example
    /// ```
    /// # use core::time::Duration;
    /// # use ptp_core::time::Interval;
    /// assert_eq!(Interval::from_log_2(2).as_core_duration(), Duration::from_secs(4));
    /// assert_eq!(Interval::from_log_2(-2).as_core_duration(), Duration::from_millis(250));
    /// ```
    pub const fn from_log_2(log_2: i8) -> Self {
        Self(log_2)
    }

    /// Get the log2 of the numbers of seconds of this [`Interval`]
    ///
    /// # Example
    /// ```
    /// # use ptp_core::time::Interval;
    /// assert_eq!(Interval::ONE_SECOND.as_log_2(), 0);
    /// assert_eq!(Interval::TWO_SECONDS.as_log_2(), 1);
    /// ```
    pub const fn as_log_2(self) -> i8 {
        self.0
    }

    /// Whether this interval lies in the range a port accepts
    pub const fn is_configurable(self) -> bool {
        self.0 >= Self::MIN_LOG_2 && self.0 <= Self::MAX_LOG_2
    }

    /// Turn this into a [`TimeInterval`], exactly.
    ///
    /// # Example
    /// ```
    /// # use ptp_core::time::{Interval, TimeInterval};
    /// assert_eq!(Interval::from_log_2(1).as_time_interval(), TimeInterval::from_nanos(2_000_000_000));
    /// assert_eq!(Interval::from_log_2(-3).as_time_interval(), TimeInterval::from_nanos(125_000_000));
    /// ```
    pub fn as_time_interval(self) -> TimeInterval {
        const ONE_SECOND_SCALED: i64 = 1_000_000_000 << 16;

        let bits = if self.0 >= 0 {
            let shift = self.0.min(16) as u32;
            ONE_SECOND_SCALED.saturating_mul(1 << shift)
        } else {
            let shift = self.0.unsigned_abs().min(62) as u32;
            ONE_SECOND_SCALED >> shift
        };

        TimeInterval::from_scaled_nanos(bits)
    }

    /// Turn this into a [`core::time::Duration`]
    ///
    /// # Example
    /// ```
    /// # use ptp_core::time::Interval;
    /// use core::time::Duration;
    /// assert_eq!(Interval::from_log_2(3).as_core_duration(), Duration::from_secs(8));
    /// assert_eq!(Interval::from_log_2(-3).as_core_duration(), Duration::from_millis(125));
    /// ```
    pub fn as_core_duration(self) -> core::time::Duration {
        let nanos = self.as_time_interval().nanos();
        core::time::Duration::from_nanos(nanos.max(0) as u64)
    }
}

impl From<i8> for Interval {
    fn from(value: i8) -> Self {
        Self::from_log_2(value)
    }
}
