//! Definitions of the abstract network interface

use crate::time::{TimeInterval, Timestamp};

/// How a frame handed to [`Transport::send`] must be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendContext {
    /// Event messages need a transmit timestamp and go to the event port
    pub event: bool,
    /// Peer delay messages go to the link local multicast group and must not
    /// be forwarded by bridges or transparent clocks
    pub link_local: bool,
}

/// A frame written into the receive buffer by [`Transport::receive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Number of bytes written into the buffer
    pub len: usize,
    /// The time at which the frame was received, preferably captured by the
    /// network hardware
    pub timestamp: Option<Timestamp>,
}

/// What the transport supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportCapabilities {
    /// Whether timestamps are captured by hardware
    pub hardware_timestamps: bool,
    /// Resolution of the captured timestamps
    pub timestamp_resolution: TimeInterval,
}

/// Multicast groups a port wants to receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MulticastGroups {
    /// The group for all messages except peer delay
    pub primary: bool,
    /// The link local group used by the peer delay mechanism
    pub link_local: bool,
}

/// Abstraction for a network port.
///
/// Framing (Ethernet, UDP/IPv4, UDP/IPv6) is up to the implementation; the
/// core only deals with PTP messages. No method may block: `receive` returns
/// `Ok(None)` when nothing is pending.
pub trait Transport {
    /// Error reported by the underlying network
    type Error: core::fmt::Debug;

    /// Send a single PTP message.
    ///
    /// For event messages the transmit timestamp should be returned if it is
    /// known.
    fn send(&mut self, frame: &[u8], context: SendContext)
        -> Result<Option<Timestamp>, Self::Error>;

    /// Receive a single PTP message into `buffer` if one is pending
    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<ReceivedFrame>, Self::Error>;

    /// Report the timestamping capabilities of the transport
    fn capabilities(&self) -> TransportCapabilities;

    /// Join or leave the PTP multicast groups
    fn set_multicast(&mut self, groups: MulticastGroups) -> Result<(), Self::Error>;
}
