use crate::datastructures::messages::MessageType;

/// Counters kept per port, reset by [`Port::initialize`](`super::Port::initialize`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortStatistics {
    pub state_transitions: u64,
    pub announce_sent: u64,
    pub announce_received: u64,
    pub sync_sent: u64,
    pub sync_received: u64,
    pub follow_up_sent: u64,
    pub follow_up_received: u64,
    pub delay_req_sent: u64,
    pub delay_req_received: u64,
    pub delay_resp_sent: u64,
    pub delay_resp_received: u64,
    pub pdelay_req_sent: u64,
    pub pdelay_req_received: u64,
    pub pdelay_resp_sent: u64,
    pub pdelay_resp_received: u64,
    pub pdelay_resp_follow_up_sent: u64,
    pub pdelay_resp_follow_up_received: u64,
    pub announce_timeouts: u64,
    pub sync_timeouts: u64,
    pub qualification_timeouts: u64,
    pub fault_events: u64,
    pub dropped_frames: u64,
    pub foreign_master_overflows: u64,
}

impl PortStatistics {
    pub(crate) fn count_sent(&mut self, message_type: MessageType) {
        *self.sent_counter(message_type) += 1;
    }

    pub(crate) fn count_received(&mut self, message_type: MessageType) {
        *self.received_counter(message_type) += 1;
    }

    fn sent_counter(&mut self, message_type: MessageType) -> &mut u64 {
        match message_type {
            MessageType::Announce => &mut self.announce_sent,
            MessageType::Sync => &mut self.sync_sent,
            MessageType::FollowUp => &mut self.follow_up_sent,
            MessageType::DelayReq => &mut self.delay_req_sent,
            MessageType::DelayResp => &mut self.delay_resp_sent,
            MessageType::PDelayReq => &mut self.pdelay_req_sent,
            MessageType::PDelayResp => &mut self.pdelay_resp_sent,
            MessageType::PDelayRespFollowUp => &mut self.pdelay_resp_follow_up_sent,
        }
    }

    fn received_counter(&mut self, message_type: MessageType) -> &mut u64 {
        match message_type {
            MessageType::Announce => &mut self.announce_received,
            MessageType::Sync => &mut self.sync_received,
            MessageType::FollowUp => &mut self.follow_up_received,
            MessageType::DelayReq => &mut self.delay_req_received,
            MessageType::DelayResp => &mut self.delay_resp_received,
            MessageType::PDelayReq => &mut self.pdelay_req_received,
            MessageType::PDelayResp => &mut self.pdelay_resp_received,
            MessageType::PDelayRespFollowUp => &mut self.pdelay_resp_follow_up_received,
        }
    }
}
