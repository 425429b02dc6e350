use getset::CopyGetters;

use crate::{
    datastructures::{array_at, slice_at_mut, WireFormat, WireFormatError},
    time::Timestamp,
};

/// Body of a Pdelay_Req message
///
/// The origin timestamp is followed by ten reserved bytes, which keep the
/// request the same size as the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PDelayReqMessage {
    pub(crate) origin_timestamp: Timestamp,
}

impl PDelayReqMessage {
    pub(crate) const CONTENT_SIZE: usize = 20;

    pub(crate) fn serialize_content(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        self.origin_timestamp.serialize(buffer)?;
        slice_at_mut(buffer, 10, 10)?.fill(0);
        Ok(())
    }

    pub(crate) fn deserialize_content(buffer: &[u8]) -> Result<Self, WireFormatError> {
        let reserved: [u8; 10] = array_at(buffer, 10)?;
        if reserved != [0; 10] {
            return Err(WireFormatError::ReservedBitsSet);
        }

        Ok(Self {
            origin_timestamp: Timestamp::deserialize(buffer)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_bytes_must_be_zero() {
        let mut buffer = [0u8; 20];
        let message = PDelayReqMessage {
            origin_timestamp: Timestamp::new(7, 11).unwrap(),
        };
        message.serialize_content(&mut buffer).unwrap();
        assert_eq!(PDelayReqMessage::deserialize_content(&buffer), Ok(message));

        buffer[19] = 1;
        assert_eq!(
            PDelayReqMessage::deserialize_content(&buffer),
            Err(WireFormatError::ReservedBitsSet)
        );
    }
}
