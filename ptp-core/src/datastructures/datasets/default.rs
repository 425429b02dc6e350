use crate::{
    config::InstanceConfig,
    datastructures::common::{ClockIdentity, ClockQuality},
};

/// The local clock as the best master clock algorithm sees it.
///
/// Created once from the [`InstanceConfig`] and shared by all ports of the
/// instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct InternalDefaultDS {
    pub(crate) clock_identity: ClockIdentity,
    pub(crate) number_ports: u16,
    pub(crate) clock_quality: ClockQuality,
    pub(crate) priority_1: u8,
    pub(crate) priority_2: u8,
    pub(crate) domain_number: u8,
    pub(crate) slave_only: bool,
    pub(crate) two_step: bool,
}

impl InternalDefaultDS {
    pub(crate) fn new(config: &InstanceConfig) -> Self {
        Self {
            clock_identity: config.clock_identity,
            number_ports: 0,
            clock_quality: config.clock_quality,
            priority_1: config.priority_1,
            priority_2: config.priority_2,
            domain_number: config.domain_number,
            slave_only: config.slave_only,
            two_step: config.two_step,
        }
    }

    /// A clock of class 1..=127 can never become a slave, so it recommends
    /// itself as grandmaster rather than as ordinary master.
    pub(crate) fn is_grandmaster_class(&self) -> bool {
        (1..=127).contains(&self.clock_quality.clock_class)
    }
}
