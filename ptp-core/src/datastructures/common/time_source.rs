/// What the time values of a grandmaster are derived from, as advertised in
/// Announce messages.
///
/// For more details see *IEEE1588-2019 section 7.6.2.8*
#[allow(missing_docs)] // These variants are pretty self explaining
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeSource {
    AtomicClock,
    Gnss,
    TerrestrialRadio,
    SerialTimeCode,
    Ptp,
    Ntp,
    HandSet,
    Other,
    #[default]
    InternalOscillator,
    /// Any value without an assigned meaning; kept so it can be forwarded
    Unassigned(u8),
}

impl From<u8> for TimeSource {
    fn from(value: u8) -> Self {
        match value {
            0x10 => Self::AtomicClock,
            0x20 => Self::Gnss,
            0x30 => Self::TerrestrialRadio,
            0x39 => Self::SerialTimeCode,
            0x40 => Self::Ptp,
            0x50 => Self::Ntp,
            0x60 => Self::HandSet,
            0x90 => Self::Other,
            0xa0 => Self::InternalOscillator,
            v => Self::Unassigned(v),
        }
    }
}

impl From<TimeSource> for u8 {
    fn from(source: TimeSource) -> Self {
        match source {
            TimeSource::AtomicClock => 0x10,
            TimeSource::Gnss => 0x20,
            TimeSource::TerrestrialRadio => 0x30,
            TimeSource::SerialTimeCode => 0x39,
            TimeSource::Ptp => 0x40,
            TimeSource::Ntp => 0x50,
            TimeSource::HandSet => 0x60,
            TimeSource::Other => 0x90,
            TimeSource::InternalOscillator => 0xa0,
            TimeSource::Unassigned(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_value_is_preserved() {
        for i in 0..=u8::MAX {
            assert_eq!(u8::from(TimeSource::from(i)), i);
        }
        assert_eq!(TimeSource::from(0x20), TimeSource::Gnss);
    }
}
