use super::{PortInner, PortState};
use crate::{
    clock::Timer,
    datastructures::messages::{Header, Message},
    filters::Filter,
    network::Transport,
    time::Timestamp,
    Error,
};

impl<T: Transport, F: Filter> PortInner<T, F> {
    pub(super) fn send_announce(&mut self) -> Result<(), Error> {
        log::trace!("port {}: sending announce", self.port_identity.port_number);

        let sequence_id = self.sequence_ids.announce.generate();
        let header = self.header(sequence_id);
        let message = Message::announce(
            header,
            self.config.announce_interval,
            &self.parent_ds,
            &self.current_ds,
            &self.time_properties_ds,
        );

        self.send(&message, false).map(drop)
    }

    /// Send a Sync, followed by a Follow_Up carrying its transmit time for a
    /// two-step clock
    pub(super) fn send_sync<C: Timer>(&mut self, timer: &C) -> Result<(), Error> {
        log::trace!("port {}: sending sync", self.port_identity.port_number);

        let sequence_id = self.sequence_ids.sync.generate();
        let header = self.header(sequence_id);
        let interval = self.config.sync_interval;

        if self.default_ds.two_step {
            let sent = self.send(&Message::sync(header, interval, None), false)?;
            let origin = sent.unwrap_or_else(|| timer.now());
            self.send(&Message::follow_up(header, interval, origin), false)
                .map(drop)
        } else {
            let message = Message::sync(header, interval, Some(timer.now()));
            self.send(&message, false).map(drop)
        }
    }

    /// Answer a Delay_Req with the time it was received
    pub(super) fn handle_delay_req(&mut self, header: &Header, rx: Timestamp) -> Result<(), Error> {
        if self.state != PortState::Master {
            return Ok(());
        }

        let response = Message::delay_resp(
            *header,
            self.port_identity,
            self.config.min_delay_req_interval(),
            rx,
        );

        self.send(&response, false).map(drop)
    }
}
