use arrayvec::ArrayVec;
use atomic_refcell::AtomicRefCell;

use super::MAX_PORTS;
use crate::{
    datastructures::{
        common::TimeInterval,
        messages::{Header, MessageType, MAX_MESSAGE_LEN},
        WireFormat,
    },
    network::{SendContext, Transport},
    time::Timestamp,
    Error,
};

/// Which delay mechanism the ports around a [`TransparentClock`] use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransparentMode {
    /// Delay requests pass through the clock and are corrected like any
    /// other event message
    EndToEnd,
    /// Every link is measured separately; the delay of the ingress link is
    /// added to forwarded Sync messages
    PeerToPeer,
}

#[derive(Debug)]
struct TransparentPortInner<T> {
    transport: T,
    forwarded: u64,
    link_delay: Option<TimeInterval>,
}

#[derive(Debug)]
struct TransparentPort<T> {
    port_number: u16,
    inner: AtomicRefCell<TransparentPortInner<T>>,
}

/// A clock that forwards PTP messages between its ports and accounts for the
/// time they spend inside.
///
/// There is no state machine and no BMCA. The host receives a frame on one
/// port, decides where it goes and calls [`TransparentClock::forward`] with
/// the ingress and egress timestamps.
#[derive(Debug)]
pub struct TransparentClock<T> {
    mode: TransparentMode,
    ports: ArrayVec<TransparentPort<T>, MAX_PORTS>,
}

/// Add the residence time `egress - ingress` to the correction field of an
/// event message, in place.
///
/// General messages, Signaling and Management included, are left untouched.
/// A residence time below zero is rejected with [`Error::InvalidTimestamp`].
///
/// # Example
/// ```
/// # use ptp_core::{instance::correct_residence_time, time::Timestamp};
/// let mut frame = [0u8; 44];
/// frame[0] = 0x00; // Sync
/// frame[1] = 0x02;
///
/// correct_residence_time(
///     &mut frame,
///     Timestamp::from_nanos(100),
///     Timestamp::from_nanos(130),
/// )
/// .unwrap();
/// assert_eq!(i64::from_be_bytes(frame[8..16].try_into().unwrap()), 30 << 16);
/// ```
pub fn correct_residence_time(
    frame: &mut [u8],
    ingress: Timestamp,
    egress: Timestamp,
) -> Result<(), Error> {
    if frame.len() < Header::WIRE_SIZE {
        return Err(Error::InvalidMessageSize);
    }

    if !matches!(forwarded_type(frame[0])?, Some(message_type) if message_type.is_event()) {
        return Ok(());
    }

    let residence_time = egress - ingress;
    if residence_time.is_negative() {
        return Err(Error::InvalidTimestamp);
    }

    add_correction(frame, residence_time)
}

/// The type of a frame a transparent clock passes on. Signaling and
/// Management frames have no [`MessageType`] here and are forwarded as they
/// are.
fn forwarded_type(first_byte: u8) -> Result<Option<MessageType>, Error> {
    match first_byte & 0x0f {
        SIGNALING | MANAGEMENT => Ok(None),
        nibble => MessageType::try_from(nibble)
            .map(Some)
            .map_err(|_| Error::UnsupportedMessage),
    }
}

const SIGNALING: u8 = 0xc;
const MANAGEMENT: u8 = 0xd;

fn add_correction(frame: &mut [u8], extra: TimeInterval) -> Result<(), Error> {
    let correction = TimeInterval::deserialize(&frame[8..16])?;
    (correction + extra).serialize(&mut frame[8..16])?;
    Ok(())
}

impl<T: Transport> TransparentClock<T> {
    pub fn new(mode: TransparentMode) -> Self {
        Self {
            mode,
            ports: ArrayVec::new(),
        }
    }

    /// Add a port. Port numbers must be unique and there can be at most
    /// [`MAX_PORTS`] ports.
    pub fn add_port(&mut self, port_number: u16, transport: T) -> Result<(), Error> {
        if self.find(port_number).is_some() || port_number == 0 || port_number == 0xffff {
            return Err(Error::InvalidParameter);
        }

        self.ports
            .try_push(TransparentPort {
                port_number,
                inner: AtomicRefCell::new(TransparentPortInner {
                    transport,
                    forwarded: 0,
                    link_delay: None,
                }),
            })
            .map_err(|_| Error::ResourceUnavailable)
    }

    fn find(&self, port_number: u16) -> Option<&TransparentPort<T>> {
        self.ports
            .iter()
            .find(|port| port.port_number == port_number)
    }

    /// Record the measured delay of the link attached to a port, which is
    /// added to every Sync received on it in [`TransparentMode::PeerToPeer`]
    pub fn set_link_delay(&self, port_number: u16, delay: TimeInterval) -> Result<(), Error> {
        let port = self.find(port_number).ok_or(Error::InvalidParameter)?;
        let mut inner = port
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)?;
        inner.link_delay = Some(delay);
        Ok(())
    }

    /// Correct a frame received on `ingress_port` and send it out on
    /// `egress_port`
    pub fn forward(
        &self,
        ingress_port: u16,
        egress_port: u16,
        frame: &[u8],
        ingress_timestamp: Timestamp,
        egress_timestamp: Timestamp,
    ) -> Result<(), Error> {
        if ingress_port == egress_port {
            return Err(Error::InvalidParameter);
        }
        let ingress = self.find(ingress_port).ok_or(Error::InvalidParameter)?;
        let egress = self.find(egress_port).ok_or(Error::InvalidParameter)?;

        let mut buffer = [0; MAX_MESSAGE_LEN];
        let buffer = buffer
            .get_mut(..frame.len())
            .ok_or(Error::InvalidMessageSize)?;
        buffer.copy_from_slice(frame);

        correct_residence_time(buffer, ingress_timestamp, egress_timestamp)?;

        let message_type = forwarded_type(buffer[0])?;

        if self.mode == TransparentMode::PeerToPeer && message_type == Some(MessageType::Sync) {
            let link_delay = ingress
                .inner
                .try_borrow()
                .map_err(|_| Error::ResourceUnavailable)?
                .link_delay;
            if let Some(link_delay) = link_delay {
                add_correction(buffer, link_delay)?;
            }
        }

        let mut egress = egress
            .inner
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)?;

        let context = SendContext {
            event: matches!(message_type, Some(message_type) if message_type.is_event()),
            link_local: false,
        };
        egress.transport.send(buffer, context).map_err(|error| {
            log::error!("port {}: failed to forward: {:?}", egress_port, error);
            Error::NetworkError
        })?;
        egress.forwarded += 1;

        log::trace!(
            "forwarded {:?} from port {} to port {}",
            message_type,
            ingress_port,
            egress_port
        );

        Ok(())
    }
}

impl<T> TransparentClock<T> {
    pub fn mode(&self) -> TransparentMode {
        self.mode
    }

    /// Number of frames sent out on a port
    pub fn forwarded(&self, port_number: u16) -> Option<u64> {
        let port = self
            .ports
            .iter()
            .find(|port| port.port_number == port_number)?;
        port.inner.try_borrow().ok().map(|inner| inner.forwarded)
    }
}
