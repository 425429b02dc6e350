use core::cmp::Ordering;

use crate::datastructures::{array_at, slice_at_mut, WireFormat, WireFormatError};

/// How accurate the time of a clock is with respect to its time source.
///
/// Variants are ordered from most to least accurate; the ordering of the
/// numeric wire value is what the best master clock algorithm compares.
///
/// For more details see *IEEE1588-2019 section 7.6.2.6*.
#[allow(missing_docs)] // the variant names state the accuracy bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockAccuracy {
    PS1,
    PS2_5,
    PS10,
    PS25,
    PS100,
    PS250,
    NS1,
    NS2_5,
    NS10,
    NS25,
    NS100,
    NS250,
    US1,
    US2_5,
    US10,
    US25,
    US100,
    US250,
    MS1,
    MS2_5,
    MS10,
    MS25,
    MS100,
    MS250,
    S1,
    S10,
    /// Accuracy is worse than 10 seconds
    SGT10,
    /// Profile specific accuracy value (0x80..=0xFD)
    ProfileSpecific(u8),
    #[default]
    Unknown,
    /// Values not assigned by the standard
    Reserved(u8),
}

impl ClockAccuracy {
    /// The value of this accuracy on the wire
    pub fn to_primitive(self) -> u8 {
        use ClockAccuracy::*;

        match self {
            PS1 => 0x17,
            PS2_5 => 0x18,
            PS10 => 0x19,
            PS25 => 0x1a,
            PS100 => 0x1b,
            PS250 => 0x1c,
            NS1 => 0x1d,
            NS2_5 => 0x1e,
            NS10 => 0x1f,
            NS25 => 0x20,
            NS100 => 0x21,
            NS250 => 0x22,
            US1 => 0x23,
            US2_5 => 0x24,
            US10 => 0x25,
            US25 => 0x26,
            US100 => 0x27,
            US250 => 0x28,
            MS1 => 0x29,
            MS2_5 => 0x2a,
            MS10 => 0x2b,
            MS25 => 0x2c,
            MS100 => 0x2d,
            MS250 => 0x2e,
            S1 => 0x2f,
            S10 => 0x30,
            SGT10 => 0x31,
            ProfileSpecific(value) | Reserved(value) => value,
            Unknown => 0xfe,
        }
    }

    /// Interpret a wire value
    pub fn from_primitive(value: u8) -> Self {
        use ClockAccuracy::*;

        const KNOWN: [ClockAccuracy; 27] = [
            PS1, PS2_5, PS10, PS25, PS100, PS250, NS1, NS2_5, NS10, NS25, NS100, NS250, US1,
            US2_5, US10, US25, US100, US250, MS1, MS2_5, MS10, MS25, MS100, MS250, S1, S10, SGT10,
        ];

        match value {
            0x17..=0x31 => KNOWN[(value - 0x17) as usize],
            0x80..=0xfd => ProfileSpecific(value),
            0xfe => Unknown,
            _ => Reserved(value),
        }
    }

    /// Compare two accuracies; `Less` means `self` is more accurate.
    pub fn cmp_quality(&self, other: &Self) -> Ordering {
        self.to_primitive().cmp(&other.to_primitive())
    }
}

/// A description of the accuracy and type of a clock.
///
/// For more details see *IEEE1588-2019 section 5.3.7*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockQuality {
    /// The PTP clock class.
    ///
    /// Classes 1..=127 belong to clocks that can only act as grandmaster;
    /// 248 is the default for clocks that can also be slaves.
    ///
    /// See *IEEE1588-2019 section 7.6.2.5*.
    pub clock_class: u8,
    /// The accuracy of the clock
    pub clock_accuracy: ClockAccuracy,
    /// 2-log of the variance (in seconds^2) of the clock when not synchronized.
    ///
    /// See *IEEE1588-2019 section 7.6.3.5*.
    pub offset_scaled_log_variance: u16,
}

impl Default for ClockQuality {
    fn default() -> Self {
        Self {
            clock_class: 248,
            clock_accuracy: ClockAccuracy::Unknown,
            offset_scaled_log_variance: 0xffff,
        }
    }
}

impl ClockQuality {
    /// Size of a clock quality on the wire
    pub const WIRE_SIZE: usize = 4;
}

impl WireFormat for ClockQuality {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = slice_at_mut(buffer, 0, Self::WIRE_SIZE)?;
        buffer[0] = self.clock_class;
        buffer[1] = self.clock_accuracy.to_primitive();
        buffer[2..4].copy_from_slice(&self.offset_scaled_log_variance.to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let bytes: [u8; 4] = array_at(buffer, 0)?;

        Ok(Self {
            clock_class: bytes[0],
            clock_accuracy: ClockAccuracy::from_primitive(bytes[1]),
            offset_scaled_log_variance: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_values_survive_the_wire() {
        for i in 0..=u8::MAX {
            assert_eq!(ClockAccuracy::from_primitive(i).to_primitive(), i);
        }

        assert_eq!(ClockAccuracy::from_primitive(0x21), ClockAccuracy::NS100);
        assert_eq!(ClockAccuracy::from_primitive(0x31), ClockAccuracy::SGT10);
    }

    #[test]
    fn better_accuracy_orders_first() {
        assert_eq!(
            ClockAccuracy::NS25.cmp_quality(&ClockAccuracy::US1),
            Ordering::Less
        );
        assert_eq!(
            ClockAccuracy::Unknown.cmp_quality(&ClockAccuracy::SGT10),
            Ordering::Greater
        );
    }

    #[test]
    fn clock_quality_wireformat() {
        let bytes = [0x06, 0x21, 0x4e, 0x5d];
        let quality = ClockQuality {
            clock_class: 6,
            clock_accuracy: ClockAccuracy::NS100,
            offset_scaled_log_variance: 0x4e5d,
        };

        let mut buffer = [0; 4];
        quality.serialize(&mut buffer).unwrap();
        assert_eq!(buffer, bytes);
        assert_eq!(ClockQuality::deserialize(&bytes).unwrap(), quality);
    }
}
