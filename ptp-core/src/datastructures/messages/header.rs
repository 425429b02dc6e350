use getset::CopyGetters;

use super::MessageType;
use crate::datastructures::{
    array_at,
    common::{PortIdentity, TimeInterval},
    slice_at_mut, WireFormat, WireFormatError,
};

/// The 34 byte header that starts every PTP message.
///
/// The message type and length are not stored here; they follow from the
/// message body when serializing.
///
/// For more details see *IEEE1588-2019 section 13.3*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Header {
    /// Transport specific nibble (majorSdoId)
    pub(crate) transport_specific: u8,
    pub(crate) minor_version: u8,
    pub(crate) domain_number: u8,
    pub(crate) alternate_master_flag: bool,
    pub(crate) two_step_flag: bool,
    pub(crate) unicast_flag: bool,
    pub(crate) ptp_profile_specific_1: bool,
    pub(crate) ptp_profile_specific_2: bool,
    pub(crate) leap61: bool,
    pub(crate) leap59: bool,
    pub(crate) current_utc_offset_valid: bool,
    pub(crate) ptp_timescale: bool,
    pub(crate) time_tracable: bool,
    pub(crate) frequency_tracable: bool,
    pub(crate) correction_field: TimeInterval,
    pub(crate) message_type_specific: [u8; 4],
    pub(crate) source_port_identity: PortIdentity,
    pub(crate) sequence_id: u16,
    pub(crate) log_message_interval: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DeserializedHeader {
    pub(crate) header: Header,
    pub(crate) message_type: MessageType,
    pub(crate) message_length: u16,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            transport_specific: 0,
            minor_version: Header::MINOR_VERSION,
            domain_number: 0,
            alternate_master_flag: false,
            two_step_flag: false,
            unicast_flag: false,
            ptp_profile_specific_1: false,
            ptp_profile_specific_2: false,
            leap61: false,
            leap59: false,
            current_utc_offset_valid: false,
            ptp_timescale: false,
            time_tracable: false,
            frequency_tracable: false,
            correction_field: TimeInterval::ZERO,
            message_type_specific: [0; 4],
            source_port_identity: PortIdentity::default(),
            sequence_id: 0,
            log_message_interval: 0,
        }
    }
}

impl Header {
    pub(crate) const WIRE_SIZE: usize = 34;
    pub(crate) const VERSION: u8 = 2;
    pub(crate) const MINOR_VERSION: u8 = 1;

    pub(crate) fn serialize_header(
        &self,
        message_type: MessageType,
        message_length: usize,
        buffer: &mut [u8],
    ) -> Result<(), WireFormatError> {
        let buffer = slice_at_mut(buffer, 0, Self::WIRE_SIZE)?;
        let message_length = u16::try_from(message_length)
            .map_err(|_| WireFormatError::InvalidLength(u16::MAX))?;

        buffer[0] = ((self.transport_specific & 0x0f) << 4) | (message_type as u8);
        buffer[1] = Self::VERSION;
        buffer[2..4].copy_from_slice(&message_length.to_be_bytes());
        buffer[4] = self.domain_number;
        buffer[5] = self.minor_version;
        buffer[6] = 0;
        buffer[7] = 0;
        buffer[6] |= self.alternate_master_flag as u8;
        buffer[6] |= (self.two_step_flag as u8) << 1;
        buffer[6] |= (self.unicast_flag as u8) << 2;
        buffer[6] |= (self.ptp_profile_specific_1 as u8) << 5;
        buffer[6] |= (self.ptp_profile_specific_2 as u8) << 6;
        buffer[7] |= self.leap61 as u8;
        buffer[7] |= (self.leap59 as u8) << 1;
        buffer[7] |= (self.current_utc_offset_valid as u8) << 2;
        buffer[7] |= (self.ptp_timescale as u8) << 3;
        buffer[7] |= (self.time_tracable as u8) << 4;
        buffer[7] |= (self.frequency_tracable as u8) << 5;
        self.correction_field.serialize(&mut buffer[8..16])?;
        buffer[16..20].copy_from_slice(&self.message_type_specific);
        self.source_port_identity.serialize(&mut buffer[20..30])?;
        buffer[30..32].copy_from_slice(&self.sequence_id.to_be_bytes());
        buffer[32] = message_type.control_field();
        buffer[33] = self.log_message_interval as u8;

        Ok(())
    }

    pub(crate) fn deserialize_header(buffer: &[u8]) -> Result<DeserializedHeader, WireFormatError> {
        let bytes: [u8; Self::WIRE_SIZE] = array_at(buffer, 0)?;

        let version = bytes[1] & 0x0f;
        if version != Self::VERSION {
            return Err(WireFormatError::InvalidVersion(version));
        }
        if bytes[1] & 0xf0 != 0 {
            return Err(WireFormatError::ReservedBitsSet);
        }

        let raw_type = bytes[0] & 0x0f;
        let message_type = MessageType::try_from(raw_type)
            .map_err(|_| WireFormatError::UnsupportedMessageType(raw_type))?;

        let header = Self {
            transport_specific: bytes[0] >> 4,
            minor_version: bytes[5],
            domain_number: bytes[4],
            alternate_master_flag: (bytes[6] & (1 << 0)) > 0,
            two_step_flag: (bytes[6] & (1 << 1)) > 0,
            unicast_flag: (bytes[6] & (1 << 2)) > 0,
            ptp_profile_specific_1: (bytes[6] & (1 << 5)) > 0,
            ptp_profile_specific_2: (bytes[6] & (1 << 6)) > 0,
            leap61: (bytes[7] & (1 << 0)) > 0,
            leap59: (bytes[7] & (1 << 1)) > 0,
            current_utc_offset_valid: (bytes[7] & (1 << 2)) > 0,
            ptp_timescale: (bytes[7] & (1 << 3)) > 0,
            time_tracable: (bytes[7] & (1 << 4)) > 0,
            frequency_tracable: (bytes[7] & (1 << 5)) > 0,
            correction_field: TimeInterval::deserialize(&bytes[8..16])?,
            message_type_specific: [bytes[16], bytes[17], bytes[18], bytes[19]],
            source_port_identity: PortIdentity::deserialize(&bytes[20..30])?,
            sequence_id: u16::from_be_bytes([bytes[30], bytes[31]]),
            log_message_interval: bytes[33] as i8,
        };

        Ok(DeserializedHeader {
            header,
            message_type,
            message_length: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }
}
