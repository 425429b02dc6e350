//! Ptp network messages

pub use announce::AnnounceMessage;
pub use delay_req::DelayReqMessage;
pub use delay_resp::DelayRespMessage;
pub use follow_up::FollowUpMessage;
pub use header::Header;
pub(crate) use header::DeserializedHeader;
pub use p_delay_req::PDelayReqMessage;
pub use p_delay_resp::PDelayRespMessage;
pub use p_delay_resp_follow_up::PDelayRespFollowUpMessage;
pub use sync::SyncMessage;

use super::{
    common::{PortIdentity, TimeInterval},
    datasets::{InternalCurrentDS, InternalParentDS, TimePropertiesDS},
    WireFormatError,
};
use crate::{
    datastructures::common::LeapIndicator,
    time::{Interval, Timestamp},
};

mod announce;
mod delay_req;
mod delay_resp;
mod follow_up;
mod header;
mod p_delay_req;
mod p_delay_resp;
mod p_delay_resp_follow_up;
mod sync;

/// Maximum length of a message this crate sends
///
/// This can be used to preallocate buffers that can always fit packets
/// serialized by this crate.
pub const MAX_DATA_LEN: usize = 64;

/// Largest `messageLength` that is accepted when decoding
pub const MAX_MESSAGE_LEN: usize = 1500;

/// The kinds of message this crate understands.
///
/// Signaling and management messages are not handled; decoding them yields
/// [`WireFormatError::UnsupportedMessageType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MessageType {
    Sync = 0x0,
    DelayReq = 0x1,
    PDelayReq = 0x2,
    PDelayResp = 0x3,
    FollowUp = 0x8,
    DelayResp = 0x9,
    PDelayRespFollowUp = 0xa,
    Announce = 0xb,
}

pub struct EnumConversionError;

impl TryFrom<u8> for MessageType {
    type Error = EnumConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use MessageType::*;

        match value {
            0x0 => Ok(Sync),
            0x1 => Ok(DelayReq),
            0x2 => Ok(PDelayReq),
            0x3 => Ok(PDelayResp),
            0x8 => Ok(FollowUp),
            0x9 => Ok(DelayResp),
            0xa => Ok(PDelayRespFollowUp),
            0xb => Ok(Announce),
            _ => Err(EnumConversionError),
        }
    }
}

impl MessageType {
    /// Event messages are timestamped on transmission and reception
    pub fn is_event(self) -> bool {
        use MessageType::*;

        match self {
            Sync | DelayReq | PDelayReq | PDelayResp => true,
            FollowUp | DelayResp | PDelayRespFollowUp | Announce => false,
        }
    }

    /// The exact size of a message of this type on the wire, header included
    pub fn wire_size(self) -> usize {
        let content_size = match self {
            MessageType::Sync => SyncMessage::CONTENT_SIZE,
            MessageType::DelayReq => DelayReqMessage::CONTENT_SIZE,
            MessageType::PDelayReq => PDelayReqMessage::CONTENT_SIZE,
            MessageType::PDelayResp => PDelayRespMessage::CONTENT_SIZE,
            MessageType::FollowUp => FollowUpMessage::CONTENT_SIZE,
            MessageType::DelayResp => DelayRespMessage::CONTENT_SIZE,
            MessageType::PDelayRespFollowUp => PDelayRespFollowUpMessage::CONTENT_SIZE,
            MessageType::Announce => AnnounceMessage::CONTENT_SIZE,
        };

        Header::WIRE_SIZE + content_size
    }

    /// The deprecated control field, still filled in for PTPv1 hardware
    pub(crate) fn control_field(self) -> u8 {
        match self {
            MessageType::Sync => 0x00,
            MessageType::DelayReq => 0x01,
            MessageType::FollowUp => 0x02,
            MessageType::DelayResp => 0x03,
            _ => 0x05,
        }
    }
}

/// A decoded PTP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub(crate) header: Header,
    pub(crate) body: MessageBody,
}

/// The type specific part of a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MessageBody {
    Sync(SyncMessage),
    DelayReq(DelayReqMessage),
    PDelayReq(PDelayReqMessage),
    PDelayResp(PDelayRespMessage),
    FollowUp(FollowUpMessage),
    DelayResp(DelayRespMessage),
    PDelayRespFollowUp(PDelayRespFollowUpMessage),
    Announce(AnnounceMessage),
}

impl MessageBody {
    fn content_type(&self) -> MessageType {
        match self {
            MessageBody::Sync(_) => MessageType::Sync,
            MessageBody::DelayReq(_) => MessageType::DelayReq,
            MessageBody::PDelayReq(_) => MessageType::PDelayReq,
            MessageBody::PDelayResp(_) => MessageType::PDelayResp,
            MessageBody::FollowUp(_) => MessageType::FollowUp,
            MessageBody::DelayResp(_) => MessageType::DelayResp,
            MessageBody::PDelayRespFollowUp(_) => MessageType::PDelayRespFollowUp,
            MessageBody::Announce(_) => MessageType::Announce,
        }
    }

    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        match &self {
            MessageBody::Sync(m) => m.serialize_content(buffer),
            MessageBody::DelayReq(m) => m.serialize_content(buffer),
            MessageBody::PDelayReq(m) => m.serialize_content(buffer),
            MessageBody::PDelayResp(m) => m.serialize_content(buffer),
            MessageBody::FollowUp(m) => m.serialize_content(buffer),
            MessageBody::DelayResp(m) => m.serialize_content(buffer),
            MessageBody::PDelayRespFollowUp(m) => m.serialize_content(buffer),
            MessageBody::Announce(m) => m.serialize_content(buffer),
        }
    }

    fn deserialize(message_type: MessageType, buffer: &[u8]) -> Result<Self, WireFormatError> {
        let body = match message_type {
            MessageType::Sync => MessageBody::Sync(SyncMessage::deserialize_content(buffer)?),
            MessageType::DelayReq => {
                MessageBody::DelayReq(DelayReqMessage::deserialize_content(buffer)?)
            }
            MessageType::PDelayReq => {
                MessageBody::PDelayReq(PDelayReqMessage::deserialize_content(buffer)?)
            }
            MessageType::PDelayResp => {
                MessageBody::PDelayResp(PDelayRespMessage::deserialize_content(buffer)?)
            }
            MessageType::FollowUp => {
                MessageBody::FollowUp(FollowUpMessage::deserialize_content(buffer)?)
            }
            MessageType::DelayResp => {
                MessageBody::DelayResp(DelayRespMessage::deserialize_content(buffer)?)
            }
            MessageType::PDelayRespFollowUp => MessageBody::PDelayRespFollowUp(
                PDelayRespFollowUpMessage::deserialize_content(buffer)?,
            ),
            MessageType::Announce => {
                MessageBody::Announce(AnnounceMessage::deserialize_content(buffer)?)
            }
        };

        Ok(body)
    }
}

pub(crate) fn base_header(
    domain_number: u8,
    port_identity: PortIdentity,
    sequence_id: u16,
) -> Header {
    Header {
        domain_number,
        source_port_identity: port_identity,
        sequence_id,
        ..Default::default()
    }
}

impl Message {
    /// A Sync message. Without an origin timestamp the message is two-step
    /// and the timestamp follows in a Follow_Up.
    pub(crate) fn sync(
        header: Header,
        log_sync_interval: Interval,
        origin_timestamp: Option<Timestamp>,
    ) -> Self {
        let header = Header {
            two_step_flag: origin_timestamp.is_none(),
            log_message_interval: log_sync_interval.as_log_2(),
            ..header
        };

        Message {
            header,
            body: MessageBody::Sync(SyncMessage {
                origin_timestamp: origin_timestamp.unwrap_or_default(),
            }),
        }
    }

    pub(crate) fn follow_up(
        header: Header,
        log_sync_interval: Interval,
        precise_origin_timestamp: Timestamp,
    ) -> Self {
        let header = Header {
            log_message_interval: log_sync_interval.as_log_2(),
            ..header
        };

        Message {
            header,
            body: MessageBody::FollowUp(FollowUpMessage {
                precise_origin_timestamp,
            }),
        }
    }

    pub(crate) fn announce(
        header: Header,
        log_announce_interval: Interval,
        parent_ds: &InternalParentDS,
        current_ds: &InternalCurrentDS,
        time_properties_ds: &TimePropertiesDS,
    ) -> Self {
        let header = Header {
            leap59: time_properties_ds.leap_indicator == LeapIndicator::Leap59,
            leap61: time_properties_ds.leap_indicator == LeapIndicator::Leap61,
            current_utc_offset_valid: time_properties_ds.current_utc_offset.is_some(),
            ptp_timescale: time_properties_ds.ptp_timescale,
            time_tracable: time_properties_ds.time_traceable,
            frequency_tracable: time_properties_ds.frequency_traceable,
            log_message_interval: log_announce_interval.as_log_2(),
            ..header
        };

        let body = MessageBody::Announce(AnnounceMessage {
            origin_timestamp: Default::default(),
            current_utc_offset: time_properties_ds.current_utc_offset.unwrap_or_default(),
            grandmaster_priority_1: parent_ds.grandmaster_priority_1,
            grandmaster_clock_quality: parent_ds.grandmaster_clock_quality,
            grandmaster_priority_2: parent_ds.grandmaster_priority_2,
            grandmaster_identity: parent_ds.grandmaster_identity,
            steps_removed: current_ds.steps_removed,
            time_source: time_properties_ds.time_source,
        });

        Message { header, body }
    }

    pub(crate) fn delay_req(header: Header) -> Self {
        let header = Header {
            log_message_interval: 0x7f,
            ..header
        };

        Message {
            header,
            body: MessageBody::DelayReq(DelayReqMessage {
                origin_timestamp: Timestamp::default(),
            }),
        }
    }

    pub(crate) fn delay_resp(
        request_header: Header,
        port_identity: PortIdentity,
        min_delay_req_interval: Interval,
        receive_timestamp: Timestamp,
    ) -> Self {
        let header = Header {
            two_step_flag: false,
            source_port_identity: port_identity,
            log_message_interval: min_delay_req_interval.as_log_2(),
            ..request_header
        };

        let body = MessageBody::DelayResp(DelayRespMessage {
            receive_timestamp,
            requesting_port_identity: request_header.source_port_identity,
        });

        Message { header, body }
    }

    pub(crate) fn pdelay_req(header: Header) -> Self {
        let header = Header {
            log_message_interval: 0x7f,
            ..header
        };

        Message {
            header,
            body: MessageBody::PDelayReq(PDelayReqMessage {
                origin_timestamp: Timestamp::default(),
            }),
        }
    }

    /// Always a two-step response; the turnaround time is reported through
    /// the follow up.
    pub(crate) fn pdelay_resp(
        request_header: Header,
        port_identity: PortIdentity,
        request_receive_timestamp: Timestamp,
    ) -> Self {
        let header = Header {
            two_step_flag: true,
            source_port_identity: port_identity,
            log_message_interval: 0x7f,
            correction_field: TimeInterval::ZERO,
            ..request_header
        };

        let body = MessageBody::PDelayResp(PDelayRespMessage {
            request_receive_timestamp,
            requesting_port_identity: request_header.source_port_identity,
        });

        Message { header, body }
    }

    pub(crate) fn pdelay_resp_follow_up(
        request_header: Header,
        port_identity: PortIdentity,
        response_origin_timestamp: Timestamp,
    ) -> Self {
        let header = Header {
            two_step_flag: false,
            source_port_identity: port_identity,
            log_message_interval: 0x7f,
            ..request_header
        };

        let body = MessageBody::PDelayRespFollowUp(PDelayRespFollowUpMessage {
            response_origin_timestamp,
            requesting_port_identity: request_header.source_port_identity,
        });

        Message { header, body }
    }
}

impl Message {
    /// The common header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The type specific body
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// The type of this message
    pub fn message_type(&self) -> MessageType {
        self.body.content_type()
    }

    /// Whether this is an event message, which is timestamped
    pub fn is_event(&self) -> bool {
        self.message_type().is_event()
    }

    /// The byte size on the wire of this message
    pub fn wire_size(&self) -> usize {
        self.message_type().wire_size()
    }

    /// Serializes the object into the PTP wire format.
    ///
    /// Returns the used buffer size that contains the message or an error.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<usize, WireFormatError> {
        let wire_size = self.wire_size();
        let buffer = buffer
            .get_mut(..wire_size)
            .ok_or(WireFormatError::BufferTooShort)?;
        let (header, body) = buffer.split_at_mut(Header::WIRE_SIZE);

        self.header
            .serialize_header(self.message_type(), wire_size, header)?;
        self.body.serialize(body)?;

        Ok(wire_size)
    }

    /// Deserializes a message from the PTP wire format.
    ///
    /// Bytes beyond `messageLength` are treated as padding and ignored.
    pub fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let DeserializedHeader {
            header,
            message_type,
            message_length,
        } = Header::deserialize_header(buffer)?;

        let length = message_length as usize;
        if length > MAX_MESSAGE_LEN || length != message_type.wire_size() {
            return Err(WireFormatError::InvalidLength(message_length));
        }

        let content_buffer = buffer
            .get(Header::WIRE_SIZE..length)
            .ok_or(WireFormatError::BufferTooShort)?;

        let body = MessageBody::deserialize(message_type, content_buffer)?;

        Ok(Message { header, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::{ClockAccuracy, ClockIdentity, ClockQuality, TimeSource};

    fn identity(byte: u8, port_number: u16) -> PortIdentity {
        PortIdentity {
            clock_identity: ClockIdentity([byte; 8]),
            port_number,
        }
    }

    fn max_timestamp() -> Timestamp {
        Timestamp::new(Timestamp::MAX_SECONDS, 999_999_999).unwrap()
    }

    fn all_bodies() -> [MessageBody; 8] {
        let requester = identity(0xaa, 0xffff);
        [
            MessageBody::Sync(SyncMessage {
                origin_timestamp: max_timestamp(),
            }),
            MessageBody::DelayReq(DelayReqMessage {
                origin_timestamp: Timestamp::ZERO,
            }),
            MessageBody::PDelayReq(PDelayReqMessage {
                origin_timestamp: max_timestamp(),
            }),
            MessageBody::PDelayResp(PDelayRespMessage {
                request_receive_timestamp: Timestamp::new(3, 999_999_999).unwrap(),
                requesting_port_identity: requester,
            }),
            MessageBody::FollowUp(FollowUpMessage {
                precise_origin_timestamp: Timestamp::new(1, 0).unwrap(),
            }),
            MessageBody::DelayResp(DelayRespMessage {
                receive_timestamp: max_timestamp(),
                requesting_port_identity: requester,
            }),
            MessageBody::PDelayRespFollowUp(PDelayRespFollowUpMessage {
                response_origin_timestamp: Timestamp::ZERO,
                requesting_port_identity: requester,
            }),
            MessageBody::Announce(AnnounceMessage {
                origin_timestamp: Timestamp::ZERO,
                current_utc_offset: 37,
                grandmaster_priority_1: 0,
                grandmaster_clock_quality: ClockQuality {
                    clock_class: 6,
                    clock_accuracy: ClockAccuracy::NS25,
                    offset_scaled_log_variance: 0x4e5d,
                },
                grandmaster_priority_2: 255,
                grandmaster_identity: ClockIdentity([0xff; 8]),
                steps_removed: 254,
                time_source: TimeSource::Gnss,
            }),
        ]
    }

    #[test]
    fn every_type_has_its_exact_size() {
        let sizes = [44, 44, 54, 54, 44, 54, 54, 64];

        for (body, expected_size) in all_bodies().into_iter().zip(sizes) {
            for domain_number in [0, 127] {
                let message = Message {
                    header: Header {
                        domain_number,
                        sequence_id: u16::MAX,
                        correction_field: TimeInterval::from_nanos(-3),
                        ..base_header(domain_number, identity(1, 1), 7)
                    },
                    body,
                };

                let mut buffer = [0; MAX_DATA_LEN];
                let size = message.serialize(&mut buffer).unwrap();
                assert_eq!(size, expected_size);
                assert_eq!(u16::from_be_bytes([buffer[2], buffer[3]]) as usize, size);
                assert_eq!(Message::deserialize(&buffer[..size]).unwrap(), message);
            }
        }
    }

    #[test]
    fn padding_is_ignored() {
        let message = Message::delay_req(base_header(0, identity(1, 1), 1));
        let mut buffer = [0xee; MAX_DATA_LEN];
        let size = message.serialize(&mut buffer).unwrap();
        assert!(size < MAX_DATA_LEN);
        assert_eq!(Message::deserialize(&buffer).unwrap(), message);
    }

    #[test]
    fn length_must_match_type() {
        let message = Message::sync(base_header(0, identity(1, 1), 1), Interval::ONE_SECOND, None);
        let mut buffer = [0; MAX_DATA_LEN];
        message.serialize(&mut buffer).unwrap();

        buffer[3] = 54;
        assert_eq!(
            Message::deserialize(&buffer),
            Err(WireFormatError::InvalidLength(54))
        );

        buffer[2..4].copy_from_slice(&1501u16.to_be_bytes());
        assert_eq!(
            Message::deserialize(&buffer),
            Err(WireFormatError::InvalidLength(1501))
        );
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let message = Message::sync(base_header(0, identity(1, 1), 1), Interval::ONE_SECOND, None);
        let mut buffer = [0; MAX_DATA_LEN];
        let size = message.serialize(&mut buffer).unwrap();

        assert_eq!(
            Message::deserialize(&buffer[..size - 1]),
            Err(WireFormatError::BufferTooShort)
        );
        assert_eq!(
            Message::deserialize(&buffer[..20]),
            Err(WireFormatError::BufferTooShort)
        );
    }

    #[test]
    fn nanoseconds_out_of_range_are_rejected() {
        let message = Message::follow_up(
            base_header(0, identity(1, 1), 1),
            Interval::ONE_SECOND,
            Timestamp::new(1, 0).unwrap(),
        );
        let mut buffer = [0; MAX_DATA_LEN];
        message.serialize(&mut buffer).unwrap();

        buffer[40..44].copy_from_slice(&1_000_000_000u32.to_be_bytes());
        assert_eq!(
            Message::deserialize(&buffer),
            Err(WireFormatError::InvalidTimestamp)
        );
    }

    #[test]
    fn serialize_into_small_buffer_fails() {
        let message = Message::delay_req(base_header(0, identity(1, 1), 1));
        let mut buffer = [0; 43];
        assert_eq!(
            message.serialize(&mut buffer),
            Err(WireFormatError::BufferTooShort)
        );
    }

    #[test]
    fn delay_resp_answers_the_request() {
        let request = Message::delay_req(Header {
            correction_field: TimeInterval::from_nanos(12),
            ..base_header(3, identity(2, 1), 99)
        });

        let response = Message::delay_resp(
            request.header,
            identity(1, 1),
            Interval::from_log_2(-1),
            Timestamp::new(5, 5).unwrap(),
        );

        assert_eq!(response.header.sequence_id, 99);
        assert_eq!(response.header.domain_number, 3);
        assert_eq!(response.header.correction_field, TimeInterval::from_nanos(12));
        assert_eq!(response.header.log_message_interval, -1);
        let MessageBody::DelayResp(body) = response.body else {
            panic!("Unexpected body {:?}", response.body);
        };
        assert_eq!(body.requesting_port_identity, identity(2, 1));
    }
}
