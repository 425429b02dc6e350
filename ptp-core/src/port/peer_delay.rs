use super::PortInner;
use crate::{
    clock::Timer,
    datastructures::{
        common::PortIdentity,
        messages::{Header, Message, PDelayRespFollowUpMessage, PDelayRespMessage},
    },
    filters::Filter,
    network::Transport,
    time::{TimeInterval, Timestamp},
    Error,
};

/// An outstanding Pdelay_Req and the responses received for it so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPeerDelay {
    sequence_id: u16,
    t1: Timestamp,
    response: Option<PeerResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeerResponse {
    responder: PortIdentity,
    t2: Timestamp,
    t4: Timestamp,
    correction: TimeInterval,
}

/// State of the peer delay mechanism, both as initiator and responder
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct PeerDelayState {
    pending: Option<PendingPeerDelay>,
    mean_link_delay: Option<TimeInterval>,
}

impl PeerDelayState {
    pub(super) fn mean_link_delay(&self) -> Option<TimeInterval> {
        self.mean_link_delay
    }
}

/// Propagation delay of the link. The turnaround time of the responder
/// (`t3 - t2`) is removed from the round trip (`t4 - t1`), as is any
/// correction accumulated by the response messages.
fn link_delay(
    t1: Timestamp,
    t2: Timestamp,
    t3: Timestamp,
    t4: Timestamp,
    correction: TimeInterval,
) -> TimeInterval {
    ((t4 - t1) - (t3 - t2) - correction) / 2
}

impl<T: Transport, F: Filter> PortInner<T, F> {
    pub(super) fn send_pdelay_req<C: Timer>(&mut self, timer: &C) -> Result<(), Error> {
        log::trace!("port {}: sending peer delay request", self.port_identity.port_number);

        let sequence_id = self.sequence_ids.pdelay_req.generate();
        let message = Message::pdelay_req(self.header(sequence_id));
        let sent = self.send(&message, true)?;

        self.peer_delay.pending = Some(PendingPeerDelay {
            sequence_id,
            t1: sent.unwrap_or_else(|| timer.now()),
            response: None,
        });

        Ok(())
    }

    /// Answer a Pdelay_Req with a Pdelay_Resp carrying its receive time,
    /// then report the transmit time of the response in a follow up
    pub(super) fn handle_pdelay_req<C: Timer>(
        &mut self,
        timer: &C,
        header: &Header,
        rx: Timestamp,
    ) -> Result<(), Error> {
        let response = Message::pdelay_resp(*header, self.port_identity, rx);
        let sent = self.send(&response, true)?;

        let t3 = sent.unwrap_or_else(|| timer.now());
        let follow_up = Message::pdelay_resp_follow_up(*header, self.port_identity, t3);
        self.send(&follow_up, true).map(drop)
    }

    pub(super) fn handle_pdelay_resp(
        &mut self,
        header: &Header,
        message: &PDelayRespMessage,
        rx: Timestamp,
    ) {
        if message.requesting_port_identity != self.port_identity {
            return;
        }

        let Some(pending) = &mut self.peer_delay.pending else {
            return;
        };
        if pending.sequence_id != header.sequence_id {
            log::debug!("Unexpected peer delay response {:?}", header.sequence_id);
            return;
        }

        let response = PeerResponse {
            responder: header.source_port_identity,
            t2: message.request_receive_timestamp,
            t4: rx,
            correction: header.correction_field,
        };
        pending.response = Some(response);

        // A one-step responder already corrected for its turnaround time
        if !header.two_step_flag {
            let t2 = response.t2;
            self.finish_peer_delay(t2, TimeInterval::ZERO);
        }
    }

    pub(super) fn handle_pdelay_resp_follow_up(
        &mut self,
        header: &Header,
        message: &PDelayRespFollowUpMessage,
    ) {
        if message.requesting_port_identity != self.port_identity {
            return;
        }

        let Some(pending) = self.peer_delay.pending else {
            return;
        };
        let Some(response) = pending.response else {
            return;
        };
        if pending.sequence_id != header.sequence_id
            || response.responder != header.source_port_identity
        {
            return;
        }

        self.finish_peer_delay(message.response_origin_timestamp, header.correction_field);
    }

    fn finish_peer_delay(&mut self, t3: Timestamp, correction: TimeInterval) {
        let Some(PendingPeerDelay {
            t1,
            response: Some(response),
            ..
        }) = self.peer_delay.pending.take()
        else {
            return;
        };

        let delay = link_delay(
            t1,
            response.t2,
            t3,
            response.t4,
            response.correction + correction,
        );
        log::debug!(
            "port {}: mean link delay {}",
            self.port_identity.port_number,
            delay
        );

        self.peer_delay.mean_link_delay = Some(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turnaround_is_removed() {
        let delay = link_delay(
            Timestamp::from_nanos(1_000),
            Timestamp::from_nanos(1_100),
            Timestamp::from_nanos(1_400),
            Timestamp::from_nanos(1_520),
            TimeInterval::ZERO,
        );
        // round trip 520, turnaround 300
        assert_eq!(delay, TimeInterval::from_nanos(110));
    }

    #[test]
    fn correction_is_subtracted() {
        let delay = link_delay(
            Timestamp::from_nanos(0),
            Timestamp::from_nanos(50),
            Timestamp::from_nanos(50),
            Timestamp::from_nanos(120),
            TimeInterval::from_nanos(20),
        );
        assert_eq!(delay, TimeInterval::from_nanos(50));
    }
}
