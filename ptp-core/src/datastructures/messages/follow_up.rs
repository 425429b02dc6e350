use getset::CopyGetters;

use crate::{
    datastructures::{WireFormat, WireFormatError},
    time::Timestamp,
};

/// Body of a Follow_Up message
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct FollowUpMessage {
    pub(crate) precise_origin_timestamp: Timestamp,
}

impl FollowUpMessage {
    pub(crate) const CONTENT_SIZE: usize = 10;

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        self.precise_origin_timestamp.serialize(buffer)
    }

    pub(crate) fn deserialize_content(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self {
            precise_origin_timestamp: Timestamp::deserialize(buffer)?,
        })
    }
}
