use crate::{
    config::{ClockIdentity, ClockQuality},
    datastructures::datasets::InternalDefaultDS,
};

/// The fixed description of the local clock: the values it offers to the
/// best master clock algorithm, plus how it sends Sync.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefaultDS {
    pub clock_identity: ClockIdentity,
    /// Ports added to the clock so far
    pub number_ports: u16,
    pub clock_quality: ClockQuality,
    pub priority_1: u8,
    pub priority_2: u8,
    pub domain_number: u8,
    /// A slave only clock never takes the master role
    pub slave_only: bool,
    /// Sync carries no timestamp and is followed by a Follow_Up
    pub two_step: bool,
}

impl From<&InternalDefaultDS> for DefaultDS {
    fn from(default_ds: &InternalDefaultDS) -> Self {
        let InternalDefaultDS {
            clock_identity,
            number_ports,
            clock_quality,
            priority_1,
            priority_2,
            domain_number,
            slave_only,
            two_step,
        } = *default_ds;

        Self {
            clock_identity,
            number_ports,
            clock_quality,
            priority_1,
            priority_2,
            domain_number,
            slave_only,
            two_step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstanceConfig;

    #[test]
    fn snapshot_follows_instance_config() {
        let config = InstanceConfig {
            priority_1: 64,
            domain_number: 4,
            slave_only: true,
            ..InstanceConfig::new(ClockIdentity([7; 8]))
        };
        let mut internal = InternalDefaultDS::new(&config);
        internal.number_ports = 2;

        let default_ds = DefaultDS::from(&internal);
        assert_eq!(default_ds.clock_identity, ClockIdentity([7; 8]));
        assert_eq!(default_ds.number_ports, 2);
        assert_eq!(default_ds.priority_1, 64);
        assert_eq!(default_ds.domain_number, 4);
        assert!(default_ds.slave_only);
        assert_eq!(default_ds.two_step, config.two_step);
    }
}
