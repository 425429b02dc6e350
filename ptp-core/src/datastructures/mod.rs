//! General datastructures as defined by IEEE1588-2019

pub mod common;
pub mod datasets;
pub mod messages;

/// Errors that can occur while encoding or decoding wire data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum WireFormatError {
    /// The buffer holds fewer bytes than the structure needs
    #[cfg_attr(feature = "std", error("buffer too short"))]
    BufferTooShort,
    /// The message carries a PTP version other than 2
    #[cfg_attr(feature = "std", error("unsupported ptp version {0}"))]
    InvalidVersion(u8),
    /// The message length does not match its type, or exceeds the sanity bound
    #[cfg_attr(feature = "std", error("invalid message length {0}"))]
    InvalidLength(u16),
    /// A reserved field carries non-zero bits
    #[cfg_attr(feature = "std", error("reserved bits set"))]
    ReservedBitsSet,
    /// A timestamp has a nanoseconds field of one second or more
    #[cfg_attr(feature = "std", error("invalid timestamp"))]
    InvalidTimestamp,
    /// Unknown message type, or a type this implementation does not handle
    #[cfg_attr(feature = "std", error("unsupported message type {0:#x}"))]
    UnsupportedMessageType(u8),
}

pub(crate) trait WireFormat: Sized {
    /// Serializes the object into the PTP wire format.
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError>;

    /// Deserializes the object from the PTP wire format.
    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError>;
}

/// Borrow exactly `N` bytes from the start of `buffer`.
pub(crate) fn array_at<const N: usize>(
    buffer: &[u8],
    offset: usize,
) -> Result<[u8; N], WireFormatError> {
    buffer
        .get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(WireFormatError::BufferTooShort)
}

/// Mutable window of exactly `len` bytes starting at `offset`.
pub(crate) fn slice_at_mut(
    buffer: &mut [u8],
    offset: usize,
    len: usize,
) -> Result<&mut [u8], WireFormatError> {
    buffer
        .get_mut(offset..offset + len)
        .ok_or(WireFormatError::BufferTooShort)
}
