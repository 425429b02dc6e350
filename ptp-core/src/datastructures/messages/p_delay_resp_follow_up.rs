use getset::CopyGetters;

use crate::{
    datastructures::{common::PortIdentity, WireFormat, WireFormatError},
    time::Timestamp,
};

/// Body of a Pdelay_Resp_Follow_Up message
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PDelayRespFollowUpMessage {
    pub(crate) response_origin_timestamp: Timestamp,
    pub(crate) requesting_port_identity: PortIdentity,
}

impl PDelayRespFollowUpMessage {
    pub(crate) const CONTENT_SIZE: usize = 20;

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        self.response_origin_timestamp.serialize(buffer)?;
        self.requesting_port_identity
            .serialize(buffer.get_mut(10..).ok_or(WireFormatError::BufferTooShort)?)
    }

    pub(crate) fn deserialize_content(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self {
            response_origin_timestamp: Timestamp::deserialize(buffer)?,
            requesting_port_identity: PortIdentity::deserialize(
                buffer.get(10..).ok_or(WireFormatError::BufferTooShort)?,
            )?,
        })
    }
}
