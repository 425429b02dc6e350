use super::{Port, PortInner, PortObserver, PortState, StateEvent};
use crate::{
    bmc::{
        bmca::{BmcaDecision, Selected},
        dataset_comparison::ComparisonDataset,
        foreign_master::{ForeignMasterRecord, Registration},
    },
    datastructures::{
        common::TimeSource,
        datasets::{InternalCurrentDS, InternalParentDS, TimePropertiesDS},
        messages::{AnnounceMessage, Header},
    },
    filters::Filter,
    network::Transport,
    time::Timestamp,
    Error,
};

/// What a master advertises when it has no better source of time
fn local_time_properties() -> TimePropertiesDS {
    TimePropertiesDS {
        ptp_timescale: true,
        time_source: TimeSource::InternalOscillator,
        ..Default::default()
    }
}

impl<T, F> PortInner<T, F> {
    /// Take over the datasets of a foreign master
    fn follow(&mut self, record: &ForeignMasterRecord) {
        let announce = &record.announce;

        self.parent_ds = InternalParentDS {
            parent_port_identity: record.sender,
            grandmaster_identity: announce.grandmaster_identity,
            grandmaster_clock_quality: announce.grandmaster_clock_quality,
            grandmaster_priority_1: announce.grandmaster_priority_1,
            grandmaster_priority_2: announce.grandmaster_priority_2,
        };
        self.current_ds.steps_removed = announce.steps_removed + 1;
        self.time_properties_ds = record.time_properties;
    }

    fn become_master(&mut self) {
        self.parent_ds = InternalParentDS::new(&self.default_ds);
        self.current_ds = InternalCurrentDS::default();
        self.time_properties_ds = local_time_properties();
    }
}

impl<T: Transport, F: Filter, O: PortObserver> Port<T, F, O> {
    pub(super) fn handle_announce(
        &self,
        inner: &mut PortInner<T, F>,
        now: Timestamp,
        header: &Header,
        announce: &AnnounceMessage,
    ) -> Result<(), Error> {
        match inner.bmca.register_announce_message(header, announce, now) {
            Registration::Inserted | Registration::Refreshed => {}
            Registration::Ignored => return Ok(()),
            Registration::TableFull => {
                log::debug!(
                    "port {}: foreign master table full, ignoring {:?}",
                    self.port_identity.port_number,
                    header.source_port_identity
                );
                inner.statistics.foreign_master_overflows += 1;
                return Ok(());
            }
        }

        let sender = header.source_port_identity;
        match inner.bmca.selected() {
            Selected::Nothing | Selected::Local => inner.last_announce_rx = Some(now),
            Selected::Foreign(parent) if parent == sender => {
                inner.last_announce_rx = Some(now);

                if matches!(
                    inner.state,
                    PortState::Passive | PortState::Uncalibrated | PortState::Slave
                ) {
                    if let Some(record) = inner.bmca.foreign_master(sender).copied() {
                        inner.follow(&record);
                    }
                }
            }
            Selected::Foreign(_) => {}
        }

        self.run_bmca(inner, now)
    }

    /// Purge stale foreign masters, compare the best remaining one against
    /// the local clock and act on the outcome
    pub(super) fn run_bmca(&self, inner: &mut PortInner<T, F>, now: Timestamp) -> Result<(), Error> {
        let window = inner.announce_window();
        inner.bmca.purge(now, window);

        let local = if inner.default_ds.slave_only {
            None
        } else {
            Some(ComparisonDataset::from_own(&inner.default_ds))
        };

        let decision = inner.bmca.decide(local.as_ref());
        self.apply_decision(inner, now, decision)
    }

    fn apply_decision(
        &self,
        inner: &mut PortInner<T, F>,
        now: Timestamp,
        decision: BmcaDecision,
    ) -> Result<(), Error> {
        let event = match decision {
            BmcaDecision::NoChange => return Ok(()),
            BmcaDecision::NewBestMaster(record) => {
                log::info!(
                    "port {}: new best master {:?}",
                    self.port_identity.port_number,
                    record.sender
                );
                inner.follow(&record);
                inner.slave = Default::default();
                inner.last_announce_rx = Some(now);
                inner.last_sync_rx = Some(now);

                if inner.config.master_only {
                    StateEvent::RsPassive
                } else {
                    StateEvent::RsSlave
                }
            }
            BmcaDecision::BecomeMaster => {
                inner.become_master();

                if inner.default_ds.is_grandmaster_class() {
                    StateEvent::RsGrandMaster
                } else {
                    StateEvent::RsMaster
                }
            }
            BmcaDecision::ForeignMasterLost => {
                inner.statistics.announce_timeouts += 1;
                StateEvent::AnnounceReceiptTimeout
            }
        };

        match self.apply_event(inner, now, event) {
            Err(Error::StateError { state, event }) => {
                log::debug!(
                    "port {}: ignoring {:?} in state {:?}",
                    self.port_identity.port_number,
                    event,
                    state
                );
                Ok(())
            }
            result => result,
        }
    }

    pub(super) fn announce_receipt_timeout(
        &self,
        inner: &mut PortInner<T, F>,
        now: Timestamp,
    ) -> Result<(), Error> {
        if inner.state != PortState::Listening {
            inner.statistics.announce_timeouts += 1;
            return self.apply_event(inner, now, StateEvent::AnnounceReceiptTimeout);
        }

        inner.last_announce_rx = Some(now);

        let window = inner.announce_window();
        inner.bmca.purge(now, window);
        if inner.bmca.has_qualified() {
            return self.run_bmca(inner, now);
        }

        inner.statistics.announce_timeouts += 1;
        if inner.default_ds.slave_only {
            return self.apply_event(inner, now, StateEvent::AnnounceReceiptTimeout);
        }

        // Nobody else is around, so we are the best master
        inner.bmca.select_local();
        self.apply_decision(inner, now, BmcaDecision::BecomeMaster)
    }
}
