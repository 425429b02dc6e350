//! Implementation of the best master clock algorithm for a single port

use core::cmp::Ordering;

use super::{
    dataset_comparison::ComparisonDataset,
    foreign_master::{ForeignMasterList, ForeignMasterRecord, Registration},
};
use crate::{
    datastructures::{
        common::{ClockIdentity, PortIdentity},
        messages::{AnnounceMessage, Header},
    },
    time::{TimeInterval, Timestamp},
};

/// The master currently selected by a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selected {
    Nothing,
    Local,
    Foreign(PortIdentity),
}

/// Outcome of a comparison pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BmcaDecision {
    NoChange,
    NewBestMaster(ForeignMasterRecord),
    BecomeMaster,
    ForeignMasterLost,
}

#[derive(Debug)]
pub(crate) struct Bmca {
    foreign_masters: ForeignMasterList,
    selected: Selected,
}

impl Bmca {
    pub(crate) fn new(own_clock_identity: ClockIdentity) -> Self {
        Self {
            foreign_masters: ForeignMasterList::new(own_clock_identity),
            selected: Selected::Nothing,
        }
    }

    pub(crate) fn register_announce_message(
        &mut self,
        header: &Header,
        announce: &AnnounceMessage,
        now: Timestamp,
    ) -> Registration {
        self.foreign_masters
            .register_announce_message(header, announce, now)
    }

    pub(crate) fn purge(&mut self, now: Timestamp, window: TimeInterval) -> usize {
        self.foreign_masters.purge(now, window)
    }

    /// Compare the best qualified foreign master against the local clock.
    ///
    /// `local` is `None` for a clock that can never be master. The selection
    /// is updated to match the decision.
    pub(crate) fn decide(&mut self, local: Option<&ComparisonDataset>) -> BmcaDecision {
        let best = self.foreign_masters.best_qualified().copied();

        let foreign_wins = match (&best, local) {
            (Some(best), Some(local)) => best.dataset().compare(local) == Ordering::Less,
            (Some(_), None) => true,
            (None, _) => false,
        };

        match best {
            Some(best) if foreign_wins => {
                if self.selected == Selected::Foreign(best.sender) {
                    BmcaDecision::NoChange
                } else {
                    self.selected = Selected::Foreign(best.sender);
                    BmcaDecision::NewBestMaster(best)
                }
            }
            Some(_) => {
                if self.selected == Selected::Local {
                    BmcaDecision::NoChange
                } else {
                    self.selected = Selected::Local;
                    BmcaDecision::BecomeMaster
                }
            }
            None => match self.selected {
                Selected::Foreign(_) => {
                    self.selected = Selected::Nothing;
                    BmcaDecision::ForeignMasterLost
                }
                Selected::Nothing | Selected::Local => BmcaDecision::NoChange,
            },
        }
    }

    /// Select the local clock without a comparison, used when nothing was
    /// heard within the announce receipt timeout.
    pub(crate) fn select_local(&mut self) {
        self.selected = Selected::Local;
    }

    pub(crate) fn selected(&self) -> Selected {
        self.selected
    }

    pub(crate) fn has_qualified(&self) -> bool {
        self.foreign_masters.best_qualified().is_some()
    }

    pub(crate) fn foreign_master(&self, sender: PortIdentity) -> Option<&ForeignMasterRecord> {
        self.foreign_masters.get(sender)
    }

    pub(crate) fn clear(&mut self) {
        self.foreign_masters.clear();
        self.selected = Selected::Nothing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bmc::foreign_master::tests::{announce, header},
        config::InstanceConfig,
        datastructures::datasets::InternalDefaultDS,
    };

    fn at(seconds: u64) -> Timestamp {
        Timestamp::new(seconds, 0).unwrap()
    }

    fn local(priority_1: u8) -> ComparisonDataset {
        let config = InstanceConfig {
            priority_1,
            ..InstanceConfig::new(ClockIdentity([0x50; 8]))
        };
        ComparisonDataset::from_own(&InternalDefaultDS::new(&config))
    }

    #[test]
    fn better_foreign_master_replaces_qualified_one() {
        let mut bmca = Bmca::new(ClockIdentity([0x50; 8]));
        let local = local(200);

        bmca.register_announce_message(&header(0x10, 0), &announce(0x10, 128), at(0));
        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::NoChange);

        bmca.register_announce_message(&header(0x10, 1), &announce(0x10, 128), at(1));
        let BmcaDecision::NewBestMaster(record) = bmca.decide(Some(&local)) else {
            panic!("expected a new best master");
        };
        assert_eq!(record.announce.grandmaster_identity, ClockIdentity([0x10; 8]));
        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::NoChange);

        // a better clock only counts once it is qualified
        bmca.register_announce_message(&header(0x20, 0), &announce(0x20, 64), at(2));
        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::NoChange);

        bmca.register_announce_message(&header(0x20, 1), &announce(0x20, 64), at(3));
        let BmcaDecision::NewBestMaster(record) = bmca.decide(Some(&local)) else {
            panic!("expected a new best master");
        };
        assert_eq!(record.announce.grandmaster_identity, ClockIdentity([0x20; 8]));
        assert_eq!(bmca.selected(), Selected::Foreign(record.sender));
    }

    #[test]
    fn local_clock_wins_over_worse_foreign() {
        let mut bmca = Bmca::new(ClockIdentity([0x50; 8]));
        let local = local(10);

        for sequence_id in 0..2 {
            bmca.register_announce_message(&header(0x10, sequence_id), &announce(0x10, 128), at(0));
        }

        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::BecomeMaster);
        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::NoChange);

        // a clock that can not be master follows any foreign master
        assert!(matches!(bmca.decide(None), BmcaDecision::NewBestMaster(_)));
    }

    #[test]
    fn aged_out_master_is_lost() {
        let mut bmca = Bmca::new(ClockIdentity([0x50; 8]));
        let local = local(200);

        for sequence_id in 0..2 {
            bmca.register_announce_message(&header(0x10, sequence_id), &announce(0x10, 128), at(0));
        }
        assert!(matches!(bmca.decide(Some(&local)), BmcaDecision::NewBestMaster(_)));

        assert_eq!(bmca.purge(at(7), TimeInterval::from_nanos(6_000_000_000)), 1);
        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::ForeignMasterLost);
        assert_eq!(bmca.decide(Some(&local)), BmcaDecision::NoChange);
    }
}
