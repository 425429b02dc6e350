use crate::{
    config::{PortConfig, PortIdentity},
    port::PortState,
    time::TimeInterval,
};

/// Delay mechanism of a port and its state, see also *IEEE1588-2019 section
/// 8.2.15.4.4*
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DelayMechanism {
    /// End to end delay measurement
    E2E {
        /// See *IEEE1588-2019 section 8.2.15.3.2*
        log_min_delay_req_interval: i8,
    },
    /// Peer to peer delay measurement
    P2P {
        /// See *IEEE1588-2019 section 8.2.15.4.5*
        log_min_p_delay_req_interval: i8,
        /// See *IEEE1588-2019 section 8.2.15.3.3*. `None` until the first
        /// exchange with the peer completes.
        mean_link_delay: Option<TimeInterval>,
    },
}

/// A concrete implementation of the PTP Port dataset (IEEE1588-2019 section
/// 8.2.15)
///
/// meanLinkDelay, logMinDelayReqInterval and logMinPDelayReqInterval are
/// exposed through the delay mechanism type when the relevant delay mechanism
/// is in use.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortDS {
    /// See *IEEE1588-2019 section 8.2.15.2.1*
    pub port_identity: PortIdentity,
    /// See *IEEE1588-2019 section 8.2.15.3.1*
    pub port_state: PortState,
    /// See *IEEE1588-2019 section 8.2.15.4.1*
    pub log_announce_interval: i8,
    /// See *IEEE1588-2019 section 8.2.15.4.2*
    pub announce_receipt_timeout: u8,
    /// See *IEEE1588-2019 section 8.2.15.4.3*
    pub log_sync_interval: i8,
    /// See *IEEE1588-2019 section 8.2.15.4.4*
    pub delay_mechanism: DelayMechanism,
    /// See *IEEE1588-2019 section 8.2.15.4.6*
    pub version_number: u8,
    /// See *IEEE1588-2019 section 8.2.15.4.7*
    pub minor_version_number: u8,
    /// See *IEEE1588-2019 section 8.2.15.5.2*
    pub master_only: bool,
}

impl PortDS {
    pub(crate) fn new(
        port_identity: PortIdentity,
        port_state: PortState,
        config: &PortConfig,
        mean_link_delay: Option<TimeInterval>,
    ) -> Self {
        let delay_mechanism = match config.delay_mechanism {
            crate::config::DelayMechanism::E2E { interval } => DelayMechanism::E2E {
                log_min_delay_req_interval: interval.as_log_2(),
            },
            crate::config::DelayMechanism::P2P { interval } => DelayMechanism::P2P {
                log_min_p_delay_req_interval: interval.as_log_2(),
                mean_link_delay,
            },
        };

        Self {
            port_identity,
            port_state,
            log_announce_interval: config.announce_interval.as_log_2(),
            announce_receipt_timeout: config.announce_receipt_timeout,
            log_sync_interval: config.sync_interval.as_log_2(),
            delay_mechanism,
            version_number: config.version,
            minor_version_number: 1,
            master_only: config.master_only,
        }
    }
}
