use getset::CopyGetters;

use super::Header;
use crate::{
    datastructures::{
        array_at,
        common::{ClockIdentity, ClockQuality, LeapIndicator, TimeSource},
        datasets::TimePropertiesDS,
        slice_at_mut, WireFormat, WireFormatError,
    },
    time::Timestamp,
};

/// Body of an Announce message: the dataset of the grandmaster the sender
/// is synchronized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct AnnounceMessage {
    pub(crate) origin_timestamp: Timestamp,
    pub(crate) current_utc_offset: i16,
    pub(crate) grandmaster_priority_1: u8,
    pub(crate) grandmaster_clock_quality: ClockQuality,
    pub(crate) grandmaster_priority_2: u8,
    pub(crate) grandmaster_identity: ClockIdentity,
    pub(crate) steps_removed: u16,
    pub(crate) time_source: TimeSource,
}

impl AnnounceMessage {
    pub(crate) const CONTENT_SIZE: usize = 30;

    /// The time properties advertised by an Announce, half of which travel
    /// in the header flags.
    pub(crate) fn time_properties(&self, header: &Header) -> TimePropertiesDS {
        TimePropertiesDS {
            current_utc_offset: header
                .current_utc_offset_valid
                .then_some(self.current_utc_offset),
            leap_indicator: LeapIndicator::from_flags(header.leap61, header.leap59),
            time_traceable: header.time_tracable,
            frequency_traceable: header.frequency_tracable,
            ptp_timescale: header.ptp_timescale,
            time_source: self.time_source,
        }
    }

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = slice_at_mut(buffer, 0, Self::CONTENT_SIZE)?;

        self.origin_timestamp.serialize(&mut buffer[0..10])?;
        buffer[10..12].copy_from_slice(&self.current_utc_offset.to_be_bytes());
        buffer[12] = 0;
        buffer[13] = self.grandmaster_priority_1;
        self.grandmaster_clock_quality.serialize(&mut buffer[14..18])?;
        buffer[18] = self.grandmaster_priority_2;
        self.grandmaster_identity.serialize(&mut buffer[19..27])?;
        buffer[27..29].copy_from_slice(&self.steps_removed.to_be_bytes());
        buffer[29] = self.time_source.into();

        Ok(())
    }

    pub(crate) fn deserialize_content(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let bytes: [u8; Self::CONTENT_SIZE] = array_at(buffer, 0)?;

        if bytes[12] != 0 {
            return Err(WireFormatError::ReservedBitsSet);
        }

        Ok(Self {
            origin_timestamp: Timestamp::deserialize(&bytes[0..10])?,
            current_utc_offset: i16::from_be_bytes([bytes[10], bytes[11]]),
            grandmaster_priority_1: bytes[13],
            grandmaster_clock_quality: ClockQuality::deserialize(&bytes[14..18])?,
            grandmaster_priority_2: bytes[18],
            grandmaster_identity: ClockIdentity::deserialize(&bytes[19..27])?,
            steps_removed: u16::from_be_bytes([bytes[27], bytes[28]]),
            time_source: TimeSource::from(bytes[29]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockAccuracy;

    #[test]
    fn announce_wireformat() {
        let representations = [(
            [
                0x00, 0x00, 0x45, 0xb1, 0x11, 0x5a, 0x0a, 0x64, 0xfa, 0xb0, 0x00, 0x25, 0x00, 0x80,
                0xf8, 0xfe, 0xff, 0xff, 0x80, 0x00, 0x1d, 0xc1, 0xff, 0xfe, 0x12, 0x34, 0x56, 0x00,
                0x01, 0xa0,
            ],
            AnnounceMessage {
                origin_timestamp: Timestamp::new(1_169_232_218, 174_389_936).unwrap(),
                current_utc_offset: 37,
                grandmaster_priority_1: 128,
                grandmaster_clock_quality: ClockQuality {
                    clock_class: 248,
                    clock_accuracy: ClockAccuracy::Unknown,
                    offset_scaled_log_variance: 0xffff,
                },
                grandmaster_priority_2: 128,
                grandmaster_identity: ClockIdentity([
                    0x00, 0x1d, 0xc1, 0xff, 0xfe, 0x12, 0x34, 0x56,
                ]),
                steps_removed: 1,
                time_source: TimeSource::InternalOscillator,
            },
        )];

        for (byte_representation, object_representation) in representations {
            let mut serialization_buffer = [0; 30];
            object_representation
                .serialize_content(&mut serialization_buffer)
                .unwrap();
            assert_eq!(serialization_buffer, byte_representation);

            let deserialized_data =
                AnnounceMessage::deserialize_content(&byte_representation).unwrap();
            assert_eq!(deserialized_data, object_representation);
        }
    }

    #[test]
    fn reserved_byte_must_be_zero() {
        let mut bytes = [0u8; 30];
        bytes[12] = 0x01;
        assert_eq!(
            AnnounceMessage::deserialize_content(&bytes),
            Err(WireFormatError::ReservedBitsSet)
        );
    }
}
