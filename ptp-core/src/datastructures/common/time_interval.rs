use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use az::Cast;
use fixed::types::I48F16;

use crate::datastructures::{array_at, slice_at_mut, WireFormat, WireFormatError};

/// A signed time interval in nanoseconds, scaled by 2^16.
///
/// This is the representation of the correction field and of every interval
/// computed from timestamps. Arithmetic saturates instead of overflowing.
///
/// # Example
/// ```
/// # use ptp_core::time::TimeInterval;
/// let interval = TimeInterval::from_nanos(30);
/// assert_eq!(interval.scaled_nanos(), 30 << 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeInterval(pub I48F16);

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(TimeInterval(I48F16::from_bits(i64::deserialize(
            deserializer,
        )?)))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0.to_bits())
    }
}

impl TimeInterval {
    /// An interval of zero length
    pub const ZERO: Self = Self(I48F16::ZERO);

    /// Create an interval of a whole number of nanoseconds
    pub fn from_nanos(nanos: i64) -> Self {
        Self(I48F16::saturating_from_num(nanos))
    }

    pub(crate) fn from_nanos_saturating(nanos: i128) -> Self {
        Self(I48F16::saturating_from_num(nanos))
    }

    /// Create an interval from its raw scaled representation
    pub const fn from_scaled_nanos(bits: i64) -> Self {
        Self(I48F16::from_bits(bits))
    }

    /// The raw scaled representation, as carried in the correction field
    pub const fn scaled_nanos(self) -> i64 {
        self.0.to_bits()
    }

    /// Whole nanoseconds, rounded towards negative infinity
    pub fn nanos(self) -> i64 {
        self.0.to_num()
    }

    /// Nanoseconds as a float, for reporting only
    pub fn nanos_lossy(self) -> f64 {
        self.0.cast()
    }

    /// The absolute value of this interval
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Whether this interval is negative
    pub fn is_negative(self) -> bool {
        self.0.is_negative()
    }
}

impl Add for TimeInterval {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for TimeInterval {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for TimeInterval {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for TimeInterval {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for TimeInterval {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl Mul<i64> for TimeInterval {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0.saturating_mul_int(rhs))
    }
}

impl Div<i64> for TimeInterval {
    type Output = Self;

    /// Exact division on the scaled representation, rounding towards zero.
    ///
    /// Panics when `rhs` is zero.
    fn div(self, rhs: i64) -> Self::Output {
        Self::from_scaled_nanos(self.scaled_nanos().saturating_div(rhs))
    }
}

impl core::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl WireFormat for TimeInterval {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        slice_at_mut(buffer, 0, 8)?.copy_from_slice(&self.0.to_bits().to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self(I48F16::from_bits(i64::from_be_bytes(array_at(
            buffer, 0,
        )?))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_interval_wireformat() {
        let representations = [
            (
                [0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x80, 0x00u8],
                TimeInterval(I48F16::from_num(2.5f64)),
            ),
            (
                [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01u8],
                TimeInterval::from_scaled_nanos(1),
            ),
            (
                [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00u8],
                TimeInterval::from_nanos(-1),
            ),
        ];

        for (byte_representation, object_representation) in representations {
            // Test the serialization output
            let mut serialization_buffer = [0; 8];
            object_representation
                .serialize(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            // Test the deserialization output
            let deserialized_data = TimeInterval::deserialize(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn halving_is_exact() {
        let odd = TimeInterval::from_nanos(45);
        assert_eq!((odd / 2).scaled_nanos(), 45 << 15);
        assert_eq!(TimeInterval::from_nanos(10) / 2, TimeInterval::from_nanos(5));
    }

    #[test]
    fn arithmetic_saturates() {
        let max = TimeInterval::from_scaled_nanos(i64::MAX);
        assert_eq!(max + TimeInterval::from_nanos(1), max);
        assert_eq!(max * 3, max);
        assert_eq!(TimeInterval::from_nanos(i64::MAX).scaled_nanos(), i64::MAX);
    }

    #[test]
    fn nanos_round_down() {
        assert_eq!(TimeInterval::from_scaled_nanos((3 << 16) + 1).nanos(), 3);
        assert_eq!(TimeInterval::from_scaled_nanos(-1).nanos(), -1);
    }
}
