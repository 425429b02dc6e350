//! Ordering of announced datasets, as used by the best master clock
//! algorithm

use core::cmp::Ordering;

use crate::datastructures::{
    common::{ClockIdentity, ClockQuality, PortIdentity},
    datasets::InternalDefaultDS,
    messages::AnnounceMessage,
};

/// The fields of an Announce (or of the local clock) that take part in the
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ComparisonDataset {
    gm_priority_1: u8,
    gm_clock_quality: ClockQuality,
    gm_priority_2: u8,
    gm_identity: ClockIdentity,
    steps_removed: u16,
    sender: PortIdentity,
}

impl ComparisonDataset {
    pub(crate) fn from_announce(announce: &AnnounceMessage, sender: PortIdentity) -> Self {
        Self {
            gm_priority_1: announce.grandmaster_priority_1,
            gm_clock_quality: announce.grandmaster_clock_quality,
            gm_priority_2: announce.grandmaster_priority_2,
            gm_identity: announce.grandmaster_identity,
            steps_removed: announce.steps_removed,
            sender,
        }
    }

    pub(crate) fn from_own(default_ds: &InternalDefaultDS) -> Self {
        Self {
            gm_priority_1: default_ds.priority_1,
            gm_clock_quality: default_ds.clock_quality,
            gm_priority_2: default_ds.priority_2,
            gm_identity: default_ds.clock_identity,
            steps_removed: 0,
            sender: PortIdentity {
                clock_identity: default_ds.clock_identity,
                port_number: 0,
            },
        }
    }

    /// Compare two datasets, `Less` meaning `self` is the better master.
    ///
    /// The grandmaster fields are compared in order: priority 1, clock class,
    /// clock accuracy, offset scaled log variance, priority 2 and finally the
    /// grandmaster identity. Two paths to the same grandmaster are ordered by
    /// steps removed and then by the identity of the sending port.
    pub(crate) fn compare(&self, other: &Self) -> Ordering {
        let a = &self.gm_clock_quality;
        let b = &other.gm_clock_quality;

        self.gm_priority_1
            .cmp(&other.gm_priority_1)
            .then(a.clock_class.cmp(&b.clock_class))
            .then_with(|| a.clock_accuracy.cmp_quality(&b.clock_accuracy))
            .then(a.offset_scaled_log_variance.cmp(&b.offset_scaled_log_variance))
            .then(self.gm_priority_2.cmp(&other.gm_priority_2))
            .then(self.gm_identity.cmp(&other.gm_identity))
            .then(self.steps_removed.cmp(&other.steps_removed))
            .then(self.sender.cmp(&other.sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{datastructures::common::ClockAccuracy, time::Timestamp};

    fn dataset(gm: u8) -> ComparisonDataset {
        ComparisonDataset {
            gm_priority_1: 128,
            gm_clock_quality: ClockQuality::default(),
            gm_priority_2: 128,
            gm_identity: ClockIdentity([gm; 8]),
            steps_removed: 1,
            sender: PortIdentity {
                clock_identity: ClockIdentity([gm; 8]),
                port_number: 1,
            },
        }
    }

    #[test]
    fn each_step_decides_in_order() {
        let base = dataset(5);

        // Every variant is better than `base` in exactly one field, while
        // being worse in all later ones.
        let better = [
            ComparisonDataset {
                gm_priority_1: 127,
                gm_priority_2: 255,
                gm_identity: ClockIdentity([9; 8]),
                ..base
            },
            ComparisonDataset {
                gm_clock_quality: ClockQuality {
                    clock_class: 6,
                    ..ClockQuality::default()
                },
                gm_priority_2: 255,
                ..base
            },
            ComparisonDataset {
                gm_clock_quality: ClockQuality {
                    clock_accuracy: ClockAccuracy::NS100,
                    ..ClockQuality::default()
                },
                gm_priority_2: 255,
                ..base
            },
            ComparisonDataset {
                gm_clock_quality: ClockQuality {
                    offset_scaled_log_variance: 0x4000,
                    ..ClockQuality::default()
                },
                gm_identity: ClockIdentity([9; 8]),
                ..base
            },
            ComparisonDataset {
                gm_priority_2: 1,
                gm_identity: ClockIdentity([9; 8]),
                ..base
            },
            ComparisonDataset {
                gm_identity: ClockIdentity([4; 8]),
                steps_removed: 20,
                ..base
            },
            ComparisonDataset {
                steps_removed: 0,
                sender: PortIdentity {
                    clock_identity: ClockIdentity([9; 8]),
                    port_number: 1,
                },
                ..base
            },
        ];

        for (i, candidate) in better.iter().enumerate() {
            assert_eq!(candidate.compare(&base), Ordering::Less, "step {}", i);
            assert_eq!(base.compare(candidate), Ordering::Greater, "step {}", i);
        }
    }

    #[test]
    fn order_is_strict_and_transitive() {
        let datasets = [
            ComparisonDataset {
                gm_priority_1: 10,
                ..dataset(3)
            },
            ComparisonDataset {
                gm_priority_1: 20,
                ..dataset(1)
            },
            ComparisonDataset {
                gm_priority_1: 30,
                ..dataset(2)
            },
            dataset(7),
        ];

        for a in &datasets {
            assert_eq!(a.compare(a), Ordering::Equal);
            for b in &datasets {
                if a != b {
                    assert_ne!(a.compare(b), Ordering::Equal);
                    assert_eq!(a.compare(b), b.compare(a).reverse());
                }
                for c in &datasets {
                    if a.compare(b) == Ordering::Less && b.compare(c) == Ordering::Less {
                        assert_eq!(a.compare(c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn own_dataset_uses_default_ds() {
        let config = crate::config::InstanceConfig {
            priority_1: 64,
            ..crate::config::InstanceConfig::new(ClockIdentity([1; 8]))
        };
        let own = ComparisonDataset::from_own(&InternalDefaultDS::new(&config));

        let announce = AnnounceMessage {
            origin_timestamp: Timestamp::ZERO,
            current_utc_offset: 0,
            grandmaster_priority_1: 128,
            grandmaster_clock_quality: ClockQuality::default(),
            grandmaster_priority_2: 128,
            grandmaster_identity: ClockIdentity([0; 8]),
            steps_removed: 0,
            time_source: Default::default(),
        };
        let foreign = ComparisonDataset::from_announce(
            &announce,
            PortIdentity {
                clock_identity: ClockIdentity([0; 8]),
                port_number: 1,
            },
        );

        assert_eq!(own.compare(&foreign), Ordering::Less);
    }
}
