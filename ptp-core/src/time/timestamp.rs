use core::ops::{Add, Sub};

use super::TimeInterval;
use crate::datastructures::{array_at, slice_at_mut, WireFormat, WireFormatError};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// A point in time as carried on the wire: 48 bits of seconds and 32 bits of
/// nanoseconds.
///
/// The nanoseconds field is always below one second. Timestamps are ordered
/// chronologically.
///
/// For more details, see *IEEE1588-2019 section 5.3.3*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp {
    seconds: u64,
    nanos: u32,
}

impl Timestamp {
    /// Largest representable number of seconds (48 bits)
    pub const MAX_SECONDS: u64 = (1 << 48) - 1;

    /// The epoch
    pub const ZERO: Self = Self {
        seconds: 0,
        nanos: 0,
    };

    /// Create a timestamp from its wire fields.
    ///
    /// Returns `None` when `nanos` is a full second or more, or `seconds` does
    /// not fit in 48 bits.
    ///
    /// # Example
    /// ```
    /// # use ptp_core::time::Timestamp;
    /// assert!(Timestamp::new(10, 999_999_999).is_some());
    /// assert!(Timestamp::new(10, 1_000_000_000).is_none());
    /// ```
    pub const fn new(seconds: u64, nanos: u32) -> Option<Self> {
        if nanos >= NANOS_PER_SECOND || seconds > Self::MAX_SECONDS {
            None
        } else {
            Some(Self { seconds, nanos })
        }
    }

    /// Create a timestamp from a number of nanoseconds since the epoch.
    ///
    /// # Example
    /// ```
    /// # use ptp_core::time::Timestamp;
    /// let t = Timestamp::from_nanos(2_500_000_000);
    /// assert_eq!(t.seconds(), 2);
    /// assert_eq!(t.nanos(), 500_000_000);
    /// ```
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            seconds: nanos / NANOS_PER_SECOND as u64,
            nanos: (nanos % NANOS_PER_SECOND as u64) as u32,
        }
    }

    /// The seconds field
    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    /// The nanoseconds field
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Total number of nanoseconds since the epoch
    pub const fn total_nanos(&self) -> i128 {
        self.seconds as i128 * NANOS_PER_SECOND as i128 + self.nanos as i128
    }

    fn from_total_nanos_saturating(total: i128) -> Self {
        let max = Self::MAX_SECONDS as i128 * NANOS_PER_SECOND as i128
            + (NANOS_PER_SECOND as i128 - 1);
        let total = total.clamp(0, max);

        Self {
            seconds: (total / NANOS_PER_SECOND as i128) as u64,
            nanos: (total % NANOS_PER_SECOND as i128) as u32,
        }
    }
}

impl Sub for Timestamp {
    type Output = TimeInterval;

    /// The interval from `rhs` to `self`, saturating at the range of
    /// [`TimeInterval`].
    fn sub(self, rhs: Self) -> Self::Output {
        let nanos = self.total_nanos() - rhs.total_nanos();
        TimeInterval::from_nanos_saturating(nanos)
    }
}

impl Add<TimeInterval> for Timestamp {
    type Output = Timestamp;

    /// Sub-nanosecond parts of the interval are dropped; the result saturates
    /// at the epoch and at the 48 bit seconds limit.
    fn add(self, rhs: TimeInterval) -> Self::Output {
        Self::from_total_nanos_saturating(self.total_nanos() + rhs.nanos() as i128)
    }
}

impl Sub<TimeInterval> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: TimeInterval) -> Self::Output {
        Self::from_total_nanos_saturating(self.total_nanos() - rhs.nanos() as i128)
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

impl WireFormat for Timestamp {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = slice_at_mut(buffer, 0, 10)?;
        buffer[0..6].copy_from_slice(&self.seconds.to_be_bytes()[2..8]);
        buffer[6..10].copy_from_slice(&self.nanos.to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let bytes: [u8; 10] = array_at(buffer, 0)?;

        let mut seconds = [0; 8];
        seconds[2..8].copy_from_slice(&bytes[0..6]);
        let nanos = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);

        Timestamp::new(u64::from_be_bytes(seconds), nanos).ok_or(WireFormatError::InvalidTimestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_wireformat() {
        let representations = [
            (
                [0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01u8],
                Timestamp::new(2, 1).unwrap(),
            ),
            (
                [0x10, 0x00, 0x00, 0x00, 0x00, 0x02, 0x3b, 0x9a, 0xc9, 0xffu8],
                Timestamp::new(0x1000_0000_0002, 999_999_999).unwrap(),
            ),
        ];

        for (byte_representation, object_representation) in representations {
            let mut serialization_buffer = [0; 10];
            object_representation
                .serialize(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            let deserialized_data = Timestamp::deserialize(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn rejects_full_second_of_nanos() {
        let bytes = [0, 0, 0, 0, 0, 1, 0x3b, 0x9a, 0xca, 0x00];
        assert_eq!(
            Timestamp::deserialize(&bytes),
            Err(WireFormatError::InvalidTimestamp)
        );
    }

    #[test]
    fn rejects_short_buffer() {
        assert_eq!(
            Timestamp::deserialize(&[0; 9]),
            Err(WireFormatError::BufferTooShort)
        );
    }

    #[test]
    fn subtraction_crosses_seconds() {
        let a = Timestamp::new(5, 100).unwrap();
        let b = Timestamp::new(4, 999_999_900).unwrap();
        assert_eq!(a - b, TimeInterval::from_nanos(200));
        assert_eq!(b - a, TimeInterval::from_nanos(-200));
    }

    #[test]
    fn add_interval() {
        let t = Timestamp::new(1, 900_000_000).unwrap();
        assert_eq!(
            t + TimeInterval::from_nanos(200_000_000),
            Timestamp::new(2, 100_000_000).unwrap()
        );
        assert_eq!(Timestamp::ZERO - TimeInterval::from_nanos(5), Timestamp::ZERO);
    }
}
