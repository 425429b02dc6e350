use crate::{time::Interval, Error};

/// Which delay mechanism a port is using.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DelayMechanism {
    /// End to end delay mechanism. Delay measurement is done directly to the
    /// chosen master, across potential transparent nodes in between.
    E2E {
        /// The time between sending two delay requests
        interval: Interval,
    },
    /// Peer to peer delay mechanism. Delay measurement is done on the
    /// individual links.
    P2P {
        /// The time between sending two peer delay requests
        interval: Interval,
    },
}

impl DelayMechanism {
    /// The request interval of either mechanism
    pub fn interval(&self) -> Interval {
        match self {
            DelayMechanism::E2E { interval } | DelayMechanism::P2P { interval } => *interval,
        }
    }
}

/// Configuration items of the PTP PortDS dataset. Dynamical fields are kept
/// as part of [`Port`](crate::port::Port).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortConfig {
    /// Number of the port within its clock, `1..0xFFFF`
    pub port_number: u16,

    /// Domain of the port. Frames from other domains are dropped.
    pub domain_number: u8,

    /// The time between announcements.
    pub announce_interval: Interval,

    /// Time between two sync messages when this port is in master mode.
    pub sync_interval: Interval,

    /// The mechanism used to measure the delay at this port.
    pub delay_mechanism: DelayMechanism,

    /// Specifies how many [`announce_interval`](`Self::announce_interval`)s to
    /// wait until the announce message expires.
    pub announce_receipt_timeout: u8,

    /// Specifies how many [`sync_interval`](`Self::sync_interval`)s a slave
    /// waits for a Sync before it considers synchronization lost.
    pub sync_receipt_timeout: u8,

    /// PTP version, only 2 is supported
    pub version: u8,

    /// Never let this port become a slave.
    pub master_only: bool,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_number: 1,
            domain_number: 0,
            announce_interval: Interval::TWO_SECONDS,
            sync_interval: Interval::ONE_SECOND,
            delay_mechanism: DelayMechanism::E2E {
                interval: Interval::ONE_SECOND,
            },
            announce_receipt_timeout: 3,
            sync_receipt_timeout: 3,
            version: 2,
            master_only: false,
        }
    }
}

impl PortConfig {
    /// Minimum time between two (peer) delay request messages
    pub fn min_delay_req_interval(&self) -> Interval {
        self.delay_mechanism.interval()
    }

    /// Check every field against the range PTP allows.
    ///
    /// # Example
    /// ```
    /// # use ptp_core::config::PortConfig;
    /// # use ptp_core::Error;
    /// assert!(PortConfig::default().validate().is_ok());
    ///
    /// let config = PortConfig { port_number: 0, ..Default::default() };
    /// assert_eq!(config.validate(), Err(Error::InvalidParameter));
    /// ```
    pub fn validate(&self) -> Result<(), Error> {
        let valid = self.port_number != 0
            && self.port_number != 0xffff
            && self.domain_number <= 127
            && self.announce_interval.is_configurable()
            && self.sync_interval.is_configurable()
            && self.min_delay_req_interval().is_configurable()
            && self.announce_receipt_timeout >= 2
            && self.sync_receipt_timeout >= 2
            && self.version == 2;

        if valid {
            Ok(())
        } else {
            Err(Error::InvalidParameter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_fields() {
        let invalid = [
            PortConfig {
                port_number: 0xffff,
                ..Default::default()
            },
            PortConfig {
                domain_number: 128,
                ..Default::default()
            },
            PortConfig {
                announce_interval: Interval::from_log_2(5),
                ..Default::default()
            },
            PortConfig {
                sync_interval: Interval::from_log_2(-8),
                ..Default::default()
            },
            PortConfig {
                delay_mechanism: DelayMechanism::P2P {
                    interval: Interval::from_log_2(7),
                },
                ..Default::default()
            },
            PortConfig {
                announce_receipt_timeout: 1,
                ..Default::default()
            },
            PortConfig {
                sync_receipt_timeout: 0,
                ..Default::default()
            },
            PortConfig {
                version: 1,
                ..Default::default()
            },
        ];

        for config in invalid {
            assert_eq!(config.validate(), Err(Error::InvalidParameter), "{config:?}");
        }
    }

    #[test]
    fn accepts_boundaries() {
        let config = PortConfig {
            port_number: 0xfffe,
            domain_number: 127,
            announce_interval: Interval::from_log_2(4),
            sync_interval: Interval::from_log_2(-7),
            announce_receipt_timeout: 2,
            sync_receipt_timeout: 2,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }
}
