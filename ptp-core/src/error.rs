//! Error type shared by the fallible operations of this crate

use crate::{
    datastructures::WireFormatError,
    port::{PortState, StateEvent},
};

/// Errors returned by ports and clock entities
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum Error {
    /// A configuration value or argument is out of range
    #[cfg_attr(feature = "std", error("invalid parameter"))]
    InvalidParameter,
    /// An outgoing message does not fit in the provided buffer
    #[cfg_attr(feature = "std", error("buffer overflow"))]
    BufferOverflow,
    /// A received frame is truncated or its length does not match its type
    #[cfg_attr(feature = "std", error("invalid message size"))]
    InvalidMessageSize,
    /// A timestamp is malformed, or timestamps are not in the expected order
    #[cfg_attr(feature = "std", error("invalid timestamp"))]
    InvalidTimestamp,
    /// The event is not accepted in the current port state
    #[cfg_attr(feature = "std", error("event {event:?} not allowed in state {state:?}"))]
    StateError {
        /// State the port was in
        state: PortState,
        /// The rejected event
        event: StateEvent,
    },
    /// A fixed capacity table is full, or the port is busy on another thread
    #[cfg_attr(feature = "std", error("resource unavailable"))]
    ResourceUnavailable,
    /// An announce or sync receipt timeout expired.
    ///
    /// Reserved for hosts and transports. The port itself handles receipt
    /// timeouts in [`Port::tick`](crate::Port::tick) by counting them and
    /// feeding the matching state event, without returning an error.
    #[cfg_attr(feature = "std", error("timeout"))]
    Timeout,
    /// The timer or clock reported an error
    #[cfg_attr(feature = "std", error("hardware error"))]
    HardwareError,
    /// The transport reported an error
    #[cfg_attr(feature = "std", error("network error"))]
    NetworkError,
    /// The message type is unknown or not handled
    #[cfg_attr(feature = "std", error("unsupported message"))]
    UnsupportedMessage,
}

impl From<WireFormatError> for Error {
    fn from(value: WireFormatError) -> Self {
        match value {
            WireFormatError::BufferTooShort | WireFormatError::InvalidLength(_) => {
                Error::InvalidMessageSize
            }
            WireFormatError::InvalidTimestamp => Error::InvalidTimestamp,
            WireFormatError::UnsupportedMessageType(_) => Error::UnsupportedMessage,
            WireFormatError::InvalidVersion(_) | WireFormatError::ReservedBitsSet => {
                Error::InvalidParameter
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_errors_map_to_kinds() {
        assert_eq!(
            Error::from(WireFormatError::InvalidLength(12)),
            Error::InvalidMessageSize
        );
        assert_eq!(
            Error::from(WireFormatError::UnsupportedMessageType(0xd)),
            Error::UnsupportedMessage
        );
        assert_eq!(
            Error::from(WireFormatError::InvalidVersion(1)),
            Error::InvalidParameter
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn display_names_state_and_event() {
        use std::string::ToString;

        let error = Error::StateError {
            state: PortState::Master,
            event: StateEvent::Initialize,
        };
        assert_eq!(
            error.to_string(),
            "event Initialize not allowed in state Master"
        );
    }
}
