use super::ClockIdentity;
use crate::datastructures::{array_at, slice_at_mut, WireFormat, WireFormatError};

/// Identity of a single port of a PTP instance.
///
/// Ordered by clock identity first, then by port number.
///
/// For more details, see *IEEE1588-2019 section 5.3.5*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortIdentity {
    /// Identity of the clock this port is part of
    pub clock_identity: ClockIdentity,
    /// Number of the port, starting at 1
    pub port_number: u16,
}

impl PortIdentity {
    /// Size of a port identity on the wire
    pub const WIRE_SIZE: usize = 10;
}

impl WireFormat for PortIdentity {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        let buffer = slice_at_mut(buffer, 0, Self::WIRE_SIZE)?;
        self.clock_identity.serialize(&mut buffer[0..8])?;
        buffer[8..10].copy_from_slice(&self.port_number.to_be_bytes());
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self {
            clock_identity: ClockIdentity::deserialize(buffer)?,
            port_number: u16::from_be_bytes(array_at(buffer, 8)?),
        })
    }
}

impl core::fmt::Display for PortIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.clock_identity, self.port_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_identity_wireformat() {
        let bytes = [0x40, 0x6d, 0x16, 0x36, 0xc4, 0x24, 0x0e, 0x38, 0x04, 0xa9u8];
        let identity = PortIdentity {
            clock_identity: ClockIdentity([0x40, 0x6d, 0x16, 0x36, 0xc4, 0x24, 0x0e, 0x38]),
            port_number: 1193,
        };

        let mut buffer = [0; 10];
        identity.serialize(&mut buffer).unwrap();
        assert_eq!(buffer, bytes);
        assert_eq!(PortIdentity::deserialize(&bytes).unwrap(), identity);
    }

    #[test]
    fn identity_orders_before_port_number() {
        let a = PortIdentity {
            clock_identity: ClockIdentity([1; 8]),
            port_number: 9,
        };
        let b = PortIdentity {
            clock_identity: ClockIdentity([2; 8]),
            port_number: 1,
        };
        assert!(a < b);
    }
}
