use crate::{
    config::{ClockIdentity, ClockQuality},
    Error,
};

/// Configuration of the local clock, shared by all its ports.
///
/// These become the fields of the default dataset and are advertised when the
/// clock is master.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceConfig {
    /// Identity of the clock, usually derived from a MAC address
    pub clock_identity: ClockIdentity,
    /// First BMCA priority, lower wins
    pub priority_1: u8,
    /// Second BMCA priority, lower wins
    pub priority_2: u8,
    /// The PTP domain this clock lives in, `0..=127`
    pub domain_number: u8,
    /// Never let this clock become a master
    pub slave_only: bool,
    /// Quality of the local oscillator
    pub clock_quality: ClockQuality,
    /// Send the precise origin timestamp of a Sync in a Follow_Up
    pub two_step: bool,
}

impl InstanceConfig {
    /// Configuration with default priorities (128) in domain 0
    ///
    /// # Example
    /// ```
    /// # use ptp_core::config::{ClockIdentity, InstanceConfig};
    /// let config = InstanceConfig::new(ClockIdentity([1; 8]));
    /// assert_eq!(config.priority_1, 128);
    /// assert!(config.two_step);
    /// ```
    pub fn new(clock_identity: ClockIdentity) -> Self {
        Self {
            clock_identity,
            priority_1: 128,
            priority_2: 128,
            domain_number: 0,
            slave_only: false,
            clock_quality: ClockQuality::default(),
            two_step: true,
        }
    }

    /// Check the domain number is in the range PTP allows.
    pub fn validate(&self) -> Result<(), Error> {
        if self.domain_number > 127 {
            return Err(Error::InvalidParameter);
        }

        Ok(())
    }
}
