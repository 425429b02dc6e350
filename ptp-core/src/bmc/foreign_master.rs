//! Implementation of the [ForeignMasterList]

use arrayvec::ArrayVec;

use super::dataset_comparison::ComparisonDataset;
use crate::{
    datastructures::{
        common::{ClockIdentity, PortIdentity},
        datasets::TimePropertiesDS,
        messages::{AnnounceMessage, Header},
    },
    time::{TimeInterval, Timestamp},
};

/// The maximum amount of foreign masters to store at the same time
pub(crate) const MAX_FOREIGN_MASTERS: usize = 16;

/// This is the amount of announce messages that must have been received from
/// a foreign master for it to be qualified
const FOREIGN_MASTER_THRESHOLD: u16 = 2;

/// A foreign master as learned from its Announce messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ForeignMasterRecord {
    pub(crate) sender: PortIdentity,
    pub(crate) announce: AnnounceMessage,
    pub(crate) time_properties: TimePropertiesDS,
    pub(crate) last_seen: Timestamp,
    pub(crate) received_count: u16,
    last_sequence_id: u16,
}

impl ForeignMasterRecord {
    fn new(header: &Header, announce: &AnnounceMessage, now: Timestamp) -> Self {
        Self {
            sender: header.source_port_identity,
            announce: *announce,
            time_properties: announce.time_properties(header),
            last_seen: now,
            received_count: 1,
            last_sequence_id: header.sequence_id,
        }
    }

    fn refresh(&mut self, header: &Header, announce: &AnnounceMessage, now: Timestamp) {
        self.announce = *announce;
        self.time_properties = announce.time_properties(header);
        self.last_seen = now;
        self.received_count = self.received_count.saturating_add(1);
        self.last_sequence_id = header.sequence_id;
    }

    pub(crate) fn is_qualified(&self) -> bool {
        self.received_count >= FOREIGN_MASTER_THRESHOLD
    }

    pub(crate) fn dataset(&self) -> ComparisonDataset {
        ComparisonDataset::from_announce(&self.announce, self.sender)
    }
}

/// What happened to an Announce handed to
/// [`ForeignMasterList::register_announce_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
    /// A record for a previously unseen sender was created
    Inserted,
    /// The record of a known sender was refreshed
    Refreshed,
    /// The message did not pass the qualification rules
    Ignored,
    /// The sender is new, but the table has no room left
    TableFull,
}

#[derive(Debug)]
pub(crate) struct ForeignMasterList {
    records: ArrayVec<ForeignMasterRecord, MAX_FOREIGN_MASTERS>,
    own_clock_identity: ClockIdentity,
}

impl ForeignMasterList {
    pub(crate) fn new(own_clock_identity: ClockIdentity) -> Self {
        Self {
            records: ArrayVec::new(),
            own_clock_identity,
        }
    }

    pub(crate) fn register_announce_message(
        &mut self,
        header: &Header,
        announce: &AnnounceMessage,
        now: Timestamp,
    ) -> Registration {
        let sender = header.source_port_identity;

        // Our own messages, possibly from another port of the same clock
        if sender.clock_identity == self.own_clock_identity {
            return Registration::Ignored;
        }

        if announce.steps_removed >= 255 {
            return Registration::Ignored;
        }

        match self.records.iter_mut().find(|r| r.sender == sender) {
            Some(record) => {
                // Repeated or older than the last one seen, with some logic for
                // u16 rollover
                let distance = header.sequence_id.wrapping_sub(record.last_sequence_id);
                if distance == 0 || distance >= u16::MAX / 2 {
                    return Registration::Ignored;
                }

                record.refresh(header, announce, now);
                Registration::Refreshed
            }
            None => {
                // Existing entries are never evicted for a new sender
                match self
                    .records
                    .try_push(ForeignMasterRecord::new(header, announce, now))
                {
                    Ok(()) => Registration::Inserted,
                    Err(_) => Registration::TableFull,
                }
            }
        }
    }

    /// Remove every record that has not been refreshed within `window`.
    ///
    /// Returns the number of removed records.
    pub(crate) fn purge(&mut self, now: Timestamp, window: TimeInterval) -> usize {
        let before = self.records.len();
        self.records.retain(|r| now - r.last_seen <= window);
        before - self.records.len()
    }

    /// The best of the qualified records
    pub(crate) fn best_qualified(&self) -> Option<&ForeignMasterRecord> {
        self.records
            .iter()
            .filter(|r| r.is_qualified())
            .min_by(|a, b| a.dataset().compare(&b.dataset()))
    }

    pub(crate) fn get(&self, sender: PortIdentity) -> Option<&ForeignMasterRecord> {
        self.records.iter().find(|r| r.sender == sender)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::datastructures::common::ClockQuality;

    pub(crate) fn announce(gm: u8, priority_1: u8) -> AnnounceMessage {
        AnnounceMessage {
            origin_timestamp: Timestamp::ZERO,
            current_utc_offset: 37,
            grandmaster_priority_1: priority_1,
            grandmaster_clock_quality: ClockQuality::default(),
            grandmaster_priority_2: 128,
            grandmaster_identity: ClockIdentity([gm; 8]),
            steps_removed: 0,
            time_source: Default::default(),
        }
    }

    pub(crate) fn header(gm: u8, sequence_id: u16) -> Header {
        Header {
            source_port_identity: PortIdentity {
                clock_identity: ClockIdentity([gm; 8]),
                port_number: 1,
            },
            sequence_id,
            ..Default::default()
        }
    }

    fn at(seconds: u64) -> Timestamp {
        Timestamp::new(seconds, 0).unwrap()
    }

    #[test]
    fn qualifies_after_two_announces() {
        let mut list = ForeignMasterList::new(ClockIdentity([0; 8]));

        let registration = list.register_announce_message(&header(1, 0), &announce(1, 128), at(0));
        assert_eq!(registration, Registration::Inserted);
        assert!(list.best_qualified().is_none());

        let registration = list.register_announce_message(&header(1, 1), &announce(1, 128), at(1));
        assert_eq!(registration, Registration::Refreshed);
        assert_eq!(list.best_qualified().unwrap().sender, header(1, 0).source_port_identity);
    }

    #[test]
    fn ignores_own_old_and_distant_announces() {
        let mut list = ForeignMasterList::new(ClockIdentity([9; 8]));

        assert_eq!(
            list.register_announce_message(&header(9, 0), &announce(9, 128), at(0)),
            Registration::Ignored
        );

        let far = AnnounceMessage {
            steps_removed: 255,
            ..announce(1, 128)
        };
        assert_eq!(
            list.register_announce_message(&header(1, 0), &far, at(0)),
            Registration::Ignored
        );

        list.register_announce_message(&header(1, 10), &announce(1, 128), at(0));
        assert_eq!(
            list.register_announce_message(&header(1, 9), &announce(1, 128), at(0)),
            Registration::Ignored
        );
        // wraps around
        list.register_announce_message(&header(2, u16::MAX), &announce(2, 128), at(0));
        assert_eq!(
            list.register_announce_message(&header(2, 0), &announce(2, 128), at(0)),
            Registration::Refreshed
        );
    }

    #[test]
    fn repeated_announce_does_not_qualify() {
        let mut list = ForeignMasterList::new(ClockIdentity([0; 8]));

        list.register_announce_message(&header(1, 7), &announce(1, 128), at(0));
        assert_eq!(
            list.register_announce_message(&header(1, 7), &announce(1, 128), at(1)),
            Registration::Ignored
        );
        assert!(list.best_qualified().is_none());

        list.register_announce_message(&header(1, 8), &announce(1, 128), at(1));
        assert!(list.best_qualified().is_some());
    }

    #[test]
    fn full_table_rejects_new_senders() {
        let mut list = ForeignMasterList::new(ClockIdentity([0; 8]));

        for gm in 1..=MAX_FOREIGN_MASTERS as u8 {
            assert_eq!(
                list.register_announce_message(&header(gm, 0), &announce(gm, 128), at(0)),
                Registration::Inserted
            );
        }

        assert_eq!(
            list.register_announce_message(&header(100, 0), &announce(100, 1), at(0)),
            Registration::TableFull
        );
        assert_eq!(list.len(), MAX_FOREIGN_MASTERS);
        assert!(list.get(header(100, 0).source_port_identity).is_none());

        // known senders are still refreshed
        assert_eq!(
            list.register_announce_message(&header(1, 1), &announce(1, 128), at(1)),
            Registration::Refreshed
        );
    }

    #[test]
    fn purge_removes_stale_records() {
        let mut list = ForeignMasterList::new(ClockIdentity([0; 8]));
        list.register_announce_message(&header(1, 0), &announce(1, 128), at(0));
        list.register_announce_message(&header(1, 1), &announce(1, 128), at(2));
        list.register_announce_message(&header(2, 0), &announce(2, 128), at(5));

        let window = TimeInterval::from_nanos(6_000_000_000);
        assert_eq!(list.purge(at(8), window), 0);
        assert_eq!(list.purge(at(9), window), 1);
        assert!(list.best_qualified().is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn best_is_chosen_among_qualified() {
        let mut list = ForeignMasterList::new(ClockIdentity([0; 8]));
        for sequence_id in 0..2 {
            list.register_announce_message(&header(1, sequence_id), &announce(1, 128), at(0));
            list.register_announce_message(&header(2, sequence_id), &announce(2, 100), at(0));
        }
        // better, but seen only once
        list.register_announce_message(&header(3, 0), &announce(3, 1), at(0));

        assert_eq!(
            list.best_qualified().unwrap().announce.grandmaster_identity,
            ClockIdentity([2; 8])
        );
    }
}
