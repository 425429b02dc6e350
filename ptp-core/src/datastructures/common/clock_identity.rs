use crate::datastructures::{array_at, slice_at_mut, WireFormat, WireFormatError};

/// The identity of a PTP node.
///
/// All ptp clocks in a network need a unique clock identity. A common approach
/// is to use a mac address of the device to generate a unique identifier (see
/// [`from_mac_address`](`Self::from_mac_address`)).
///
/// Identities compare lexicographically on their bytes, which is the final
/// tie-break of the best master clock algorithm.
///
/// For more details, see *IEEE1588-2019 section 7.5.2.2.2*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockIdentity(pub [u8; 8]);

impl ClockIdentity {
    /// Create a [`ClockIdentity`] from a mac address.
    ///
    /// Uses the EUI-64 mapping: the mac address is split in half with `FF:FE`
    /// inserted in the middle.
    ///
    /// # Example
    /// ```
    /// # use ptp_core::config::ClockIdentity;
    /// let id = ClockIdentity::from_mac_address([0xA, 0xB, 0xC, 0xD, 0xE, 0xF]);
    /// assert_eq!(id.0, [0xA, 0xB, 0xC, 0xFF, 0xFE, 0xD, 0xE, 0xF]);
    /// ```
    pub fn from_mac_address(addr: [u8; 6]) -> Self {
        let mut this = Self([0; 8]);

        this.0[0..3].copy_from_slice(&addr[0..3]);
        this.0[3] = 0xFF;
        this.0[4] = 0xFE;
        this.0[5..8].copy_from_slice(&addr[3..6]);

        this
    }
}

impl WireFormat for ClockIdentity {
    fn serialize(&self, buffer: &mut [u8]) -> Result<(), WireFormatError> {
        slice_at_mut(buffer, 0, 8)?.copy_from_slice(&self.0);
        Ok(())
    }

    fn deserialize(buffer: &[u8]) -> Result<Self, WireFormatError> {
        Ok(Self(array_at(buffer, 0)?))
    }
}

impl core::fmt::Display for ClockIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, val) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ":")?;
            }

            write!(f, "{:02x}", val)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_identity_wireformat() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08u8];
        let identity = ClockIdentity(bytes);

        let mut serialization_buffer = [0; 8];
        identity.serialize(&mut serialization_buffer).unwrap();
        assert_eq!(serialization_buffer, bytes);
        assert_eq!(ClockIdentity::deserialize(&bytes).unwrap(), identity);
        assert_eq!(
            ClockIdentity::deserialize(&bytes[..7]),
            Err(WireFormatError::BufferTooShort)
        );
    }

    #[test]
    fn ordering_is_lexicographic() {
        let low = ClockIdentity([0, 0, 0, 0, 0, 0, 0, 0xff]);
        let high = ClockIdentity([0, 0, 0, 0, 0, 0, 1, 0]);
        assert!(low < high);
    }

    #[test]
    fn display() {
        let id = ClockIdentity([0xde, 0xad, 0xbe, 0xef, 0, 1, 2, 3]);
        assert_eq!(std::format!("{id}"), "de:ad:be:ef:00:01:02:03");
    }
}
