use super::{Measurement, Port, PortInner, PortObserver, PortState, StateEvent};
use crate::{
    clock::Timer,
    config::DelayMechanism,
    datastructures::messages::{
        DelayRespMessage, FollowUpMessage, Header, Message, SyncMessage,
    },
    filters::{Filter, FilterUpdate},
    network::Transport,
    time::{TimeInterval, Timestamp},
    Error,
};

/// A two-step Sync waiting for its Follow_Up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSync {
    sequence_id: u16,
    recv_time: Timestamp,
    correction: TimeInterval,
}

/// The last complete Sync: when it arrived and how long it took from the
/// master, including the offset between the clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyncSample {
    recv_time: Timestamp,
    master_to_slave: TimeInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDelay {
    sequence_id: u16,
    send_time: Timestamp,
}

/// Measurement state of a port following a master
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct SlaveState {
    pending_sync: Option<PendingSync>,
    last_sync: Option<SyncSample>,
    pending_delay: Option<PendingDelay>,
    mean_delay: Option<TimeInterval>,
}

impl SlaveState {
    /// Forget everything measured against the old time base
    fn clock_stepped(&mut self) {
        self.pending_sync = None;
        self.last_sync = None;
        self.pending_delay = None;
    }
}

/// Offset and mean path delay from the two one-way measurements of the end
/// to end mechanism
fn offset_and_delay(
    master_to_slave: TimeInterval,
    slave_to_master: TimeInterval,
) -> (TimeInterval, TimeInterval) {
    (
        (master_to_slave - slave_to_master) / 2,
        (master_to_slave + slave_to_master) / 2,
    )
}

impl<T, F> PortInner<T, F> {
    /// Only messages from the selected master count
    fn from_parent(&self, header: &Header) -> bool {
        matches!(self.state, PortState::Uncalibrated | PortState::Slave)
            && header.source_port_identity == self.parent_ds.parent_port_identity
    }
}

impl<T: Transport, F: Filter> PortInner<T, F> {
    pub(super) fn send_delay_req<C: Timer>(&mut self, timer: &C) -> Result<(), Error> {
        log::trace!("port {}: sending delay request", self.port_identity.port_number);

        let sequence_id = self.sequence_ids.delay_req.generate();
        let message = Message::delay_req(self.header(sequence_id));
        let sent = self.send(&message, false)?;

        self.slave.pending_delay = Some(PendingDelay {
            sequence_id,
            send_time: sent.unwrap_or_else(|| timer.now()),
        });

        Ok(())
    }
}

impl<T: Transport, F: Filter, O: PortObserver> Port<T, F, O> {
    pub(super) fn handle_sync<C: Timer>(
        &self,
        inner: &mut PortInner<T, F>,
        timer: &C,
        header: &Header,
        sync: &SyncMessage,
        rx: Timestamp,
    ) -> Result<(), Error> {
        if !inner.from_parent(header) {
            return Ok(());
        }

        log::debug!("Received sync {:?}", header.sequence_id);
        inner.last_sync_rx = Some(rx);

        if header.two_step_flag {
            inner.slave.pending_sync = Some(PendingSync {
                sequence_id: header.sequence_id,
                recv_time: rx,
                correction: header.correction_field,
            });
            Ok(())
        } else {
            inner.slave.pending_sync = None;
            let master_to_slave = (rx - sync.origin_timestamp) - header.correction_field;
            self.sync_measurement(inner, timer, rx, master_to_slave)
        }
    }

    pub(super) fn handle_follow_up<C: Timer>(
        &self,
        inner: &mut PortInner<T, F>,
        timer: &C,
        header: &Header,
        follow_up: &FollowUpMessage,
    ) -> Result<(), Error> {
        if !inner.from_parent(header) {
            return Ok(());
        }

        let pending = match inner.slave.pending_sync {
            Some(pending) if pending.sequence_id == header.sequence_id => pending,
            _ => {
                log::debug!("Unexpected follow up {:?}", header.sequence_id);
                return Ok(());
            }
        };
        inner.slave.pending_sync = None;

        let master_to_slave = (pending.recv_time - follow_up.precise_origin_timestamp)
            - pending.correction
            - header.correction_field;
        self.sync_measurement(inner, timer, pending.recv_time, master_to_slave)
    }

    fn sync_measurement<C: Timer>(
        &self,
        inner: &mut PortInner<T, F>,
        timer: &C,
        recv_time: Timestamp,
        master_to_slave: TimeInterval,
    ) -> Result<(), Error> {
        inner.slave.last_sync = Some(SyncSample {
            recv_time,
            master_to_slave,
        });

        let delay = match inner.config.delay_mechanism {
            DelayMechanism::E2E { .. } => inner.slave.mean_delay,
            DelayMechanism::P2P { .. } => inner.peer_delay.mean_link_delay(),
        };

        // Without a delay estimate there is nothing to measure yet
        let Some(delay) = delay else {
            return Ok(());
        };

        let measurement = Measurement {
            event_time: recv_time,
            offset: master_to_slave - delay,
            delay: Some(delay),
        };
        self.process_measurement(inner, timer, measurement)
    }

    pub(super) fn handle_delay_resp<C: Timer>(
        &self,
        inner: &mut PortInner<T, F>,
        timer: &C,
        header: &Header,
        delay_resp: &DelayRespMessage,
    ) -> Result<(), Error> {
        if !inner.from_parent(header) || delay_resp.requesting_port_identity != inner.port_identity
        {
            return Ok(());
        }

        let pending = match inner.slave.pending_delay {
            Some(pending) if pending.sequence_id == header.sequence_id => pending,
            _ => {
                log::debug!("Unexpected delay response {:?}", header.sequence_id);
                return Ok(());
            }
        };
        let Some(last_sync) = inner.slave.last_sync else {
            return Ok(());
        };
        inner.slave.pending_delay = None;

        let slave_to_master =
            (delay_resp.receive_timestamp - pending.send_time) - header.correction_field;
        let (offset, delay) = offset_and_delay(last_sync.master_to_slave, slave_to_master);
        inner.slave.mean_delay = Some(delay);

        let measurement = Measurement {
            event_time: last_sync.recv_time,
            offset,
            delay: Some(delay),
        };
        self.process_measurement(inner, timer, measurement)
    }

    /// Record a measurement, hand it to the filter and finish calibration
    fn process_measurement<C: Timer>(
        &self,
        inner: &mut PortInner<T, F>,
        timer: &C,
        measurement: Measurement,
    ) -> Result<(), Error> {
        inner.current_ds.offset_from_master = measurement.offset;
        if let Some(delay) = measurement.delay {
            inner.current_ds.mean_path_delay = delay;
        }

        match inner.filter.measurement(measurement, timer) {
            Ok(FilterUpdate::Stepped(_)) => inner.slave.clock_stepped(),
            Ok(FilterUpdate::Steered(_)) => {}
            Err(error) => {
                log::error!(
                    "port {}: could not adjust clock: {:?}",
                    self.port_identity.port_number,
                    error
                );
                return Err(Error::HardwareError);
            }
        }

        if inner.state == PortState::Uncalibrated {
            self.apply_event(inner, timer.now(), StateEvent::MasterClockSelected)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_delay_from_four_timestamps() {
        let t1 = Timestamp::from_nanos(1000);
        let t2 = Timestamp::from_nanos(1050);
        let t3 = Timestamp::from_nanos(2000);
        let t4 = Timestamp::from_nanos(2040);

        let (offset, delay) = offset_and_delay(t2 - t1, t4 - t3);
        assert_eq!(offset, TimeInterval::from_nanos(5));
        assert_eq!(delay, TimeInterval::from_nanos(45));
    }

    #[test]
    fn odd_sums_keep_fractional_nanoseconds() {
        let (offset, delay) =
            offset_and_delay(TimeInterval::from_nanos(51), TimeInterval::from_nanos(40));
        assert_eq!(offset.scaled_nanos(), (11 << 16) / 2);
        assert_eq!(delay.scaled_nanos(), (91 << 16) / 2);
    }
}
