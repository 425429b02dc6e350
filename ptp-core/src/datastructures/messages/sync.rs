use getset::CopyGetters;

use crate::{
    datastructures::{WireFormat, WireFormatError},
    time::Timestamp,
};

/// Body of a Sync message
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SyncMessage {
    pub(crate) origin_timestamp: Timestamp,
}

impl SyncMessage {
    pub(crate) const CONTENT_SIZE: usize = 10;

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        self.origin_timestamp.serialize(buffer)
    }

    pub(crate) fn deserialize_content(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self {
            origin_timestamp: Timestamp::deserialize(buffer)?,
        })
    }
}
