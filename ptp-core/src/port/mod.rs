//! Abstraction of a network [`Port`] of a device.
//!
//! See [`Port`] for a detailed description.

use core::sync::atomic::{AtomicU32, Ordering};

use atomic_refcell::{AtomicRefCell, AtomicRefMut};
pub use measurement::Measurement;
pub use observer::{NoObserver, PortObserver};
pub use state::{PortState, StateEvent, Transition};
pub use statistics::PortStatistics;

use self::{
    peer_delay::PeerDelayState, sequence_id::SequenceIds, slave::SlaveState,
    state::AtomicPortState,
};
use crate::{
    bmc::bmca::Bmca,
    clock::Timer,
    config::{DelayMechanism, InstanceConfig, PortConfig},
    datastructures::{
        common::PortIdentity,
        datasets::{InternalCurrentDS, InternalDefaultDS, InternalParentDS, TimePropertiesDS},
        messages::{base_header, Header, Message, MessageBody, MAX_DATA_LEN, MAX_MESSAGE_LEN},
    },
    filters::{Filter, PiFilter},
    network::{MulticastGroups, SendContext, Transport},
    observability::{current::CurrentDS, parent::ParentDS, port::PortDS},
    time::{Interval, TimeInterval, Timestamp},
    Error,
};

mod bmca;
mod master;
mod measurement;
mod observer;
mod peer_delay;
mod sequence_id;
mod slave;
mod state;
mod statistics;

/// A single port of a PTP clock.
///
/// The port owns its [`Transport`], the foreign master table, the
/// synchronization state and a [`Filter`] steering the local clock. The host
/// drives it from two sides:
/// * the receive path calls [`Port::handle_frame`] (or [`Port::poll`]) for
///   every frame the transport delivers;
/// * the periodic path calls [`Port::tick`], which handles receipt timeouts
///   and sends Announce, Sync, Delay_Req and Pdelay_Req messages when due.
///
/// Every method takes `&self`. The mutable protocol state is guarded by an
/// [`AtomicRefCell`]: when two threads use the port at the same time the
/// second one gets [`Error::ResourceUnavailable`] instead of blocking. The
/// current state and some counters are readable without taking the lock.
///
/// # Generics
/// * **`T`**: the [`Transport`] used to send and receive frames
/// * **`F`**: the [`Filter`] turning measurements into clock corrections
/// * **`O`**: the [`PortObserver`] notified of state changes and faults
///
/// # Example
/// ```no_run
/// # struct Network;
/// # impl ptp_core::Transport for Network {
/// #     type Error = ();
/// #     fn send(&mut self, _: &[u8], _: ptp_core::network::SendContext) -> Result<Option<ptp_core::time::Timestamp>, ()> { unimplemented!() }
/// #     fn receive(&mut self, _: &mut [u8]) -> Result<Option<ptp_core::network::ReceivedFrame>, ()> { unimplemented!() }
/// #     fn capabilities(&self) -> ptp_core::network::TransportCapabilities { unimplemented!() }
/// #     fn set_multicast(&mut self, _: ptp_core::network::MulticastGroups) -> Result<(), ()> { unimplemented!() }
/// # }
/// # struct Clock;
/// # impl ptp_core::Timer for Clock {
/// #     type Error = ();
/// #     fn now(&self) -> ptp_core::time::Timestamp { unimplemented!() }
/// #     fn schedule_periodic(&self, _: core::time::Duration, _: ptp_core::clock::PeriodicTask) -> Result<ptp_core::clock::TimerHandle, ()> { unimplemented!() }
/// #     fn cancel(&self, _: ptp_core::clock::TimerHandle) -> Result<(), ()> { unimplemented!() }
/// #     fn adjust_frequency(&self, _: f64) -> Result<(), ()> { unimplemented!() }
/// #     fn step_clock(&self, _: ptp_core::time::TimeInterval) -> Result<(), ()> { unimplemented!() }
/// #     fn capabilities(&self) -> ptp_core::clock::TimerCapabilities { unimplemented!() }
/// # }
/// use ptp_core::config::{ClockIdentity, InstanceConfig, PortConfig, ServoConfig};
/// use ptp_core::port::{NoObserver, Port};
///
/// let instance = InstanceConfig::new(ClockIdentity([1, 2, 3, 0xff, 0xfe, 4, 5, 6]));
/// let port: Port<Network> = Port::new(
///     PortConfig::default(),
///     &instance,
///     Network,
///     ServoConfig::default(),
///     NoObserver,
/// )
/// .unwrap();
///
/// let timer = Clock;
/// port.initialize(&timer).unwrap();
/// port.start(&timer).unwrap();
///
/// // Every 125ms, and whenever the network has data
/// port.tick(&timer).unwrap();
/// port.poll(&timer).unwrap();
/// ```
#[derive(Debug)]
pub struct Port<T, F: Filter = PiFilter, O = NoObserver> {
    port_identity: PortIdentity,
    status: PortStatus,
    inner: AtomicRefCell<PortInner<T, F>>,
    observer: O,
}

/// The part of the port state that is readable without the lock
#[derive(Debug)]
struct PortStatus {
    state: AtomicPortState,
    state_transitions: AtomicU32,
    fault_events: AtomicU32,
    /// Frames handed to a busy port, which could not be handled
    contended_frames: AtomicU32,
}

impl PortStatus {
    fn new() -> Self {
        Self {
            state: AtomicPortState::new(PortState::Initializing),
            state_transitions: AtomicU32::new(0),
            fault_events: AtomicU32::new(0),
            contended_frames: AtomicU32::new(0),
        }
    }
}

/// Next time a message is due; `None` means it is due right away
#[derive(Debug, Default, Clone, Copy)]
struct Schedule {
    announce: Option<Timestamp>,
    sync: Option<Timestamp>,
    delay_req: Option<Timestamp>,
    pdelay_req: Option<Timestamp>,
}

fn is_due(due: Option<Timestamp>, now: Timestamp) -> bool {
    due.map_or(true, |due| now >= due)
}

fn keep_first(result: &mut Result<(), Error>, next: Result<(), Error>) {
    if result.is_ok() {
        *result = next;
    }
}

#[derive(Debug)]
pub(crate) struct PortInner<T, F> {
    config: PortConfig,
    default_ds: InternalDefaultDS,
    port_identity: PortIdentity,
    transport: T,
    filter: F,
    state: PortState,
    state_entered: Timestamp,
    bmca: Bmca,
    current_ds: InternalCurrentDS,
    parent_ds: InternalParentDS,
    time_properties_ds: TimePropertiesDS,
    sequence_ids: SequenceIds,
    schedule: Schedule,
    last_announce_rx: Option<Timestamp>,
    last_sync_rx: Option<Timestamp>,
    slave: SlaveState,
    peer_delay: PeerDelayState,
    statistics: PortStatistics,
    packet_buffer: [u8; MAX_DATA_LEN],
}

impl<T: Transport, F: Filter> PortInner<T, F> {
    fn new(
        config: PortConfig,
        default_ds: InternalDefaultDS,
        port_identity: PortIdentity,
        transport: T,
        filter: F,
    ) -> Self {
        Self {
            config,
            default_ds,
            port_identity,
            transport,
            filter,
            state: PortState::Initializing,
            state_entered: Timestamp::ZERO,
            bmca: Bmca::new(default_ds.clock_identity),
            current_ds: InternalCurrentDS::default(),
            parent_ds: InternalParentDS::new(&default_ds),
            time_properties_ds: TimePropertiesDS::default(),
            sequence_ids: SequenceIds::default(),
            schedule: Schedule::default(),
            last_announce_rx: None,
            last_sync_rx: None,
            slave: SlaveState::default(),
            peer_delay: PeerDelayState::default(),
            statistics: PortStatistics::default(),
            packet_buffer: [0; MAX_DATA_LEN],
        }
    }

    /// Run the entry actions of `state`
    fn enter(&mut self, state: PortState, now: Timestamp) {
        self.state = state;
        self.state_entered = now;

        match state {
            PortState::Initializing => {
                self.bmca.clear();
                self.current_ds = InternalCurrentDS::default();
                self.parent_ds = InternalParentDS::new(&self.default_ds);
                self.time_properties_ds = TimePropertiesDS::default();
                self.slave = SlaveState::default();
                self.peer_delay = PeerDelayState::default();
                self.schedule = Schedule::default();
                self.last_announce_rx = None;
                self.last_sync_rx = None;
            }
            PortState::Listening => {
                self.bmca.clear();
                self.last_announce_rx = None;
            }
            PortState::Master => {
                self.schedule.announce = None;
                self.schedule.sync = None;
            }
            PortState::Uncalibrated => {
                self.schedule.delay_req = None;
                self.last_sync_rx = None;
                self.slave = SlaveState::default();
            }
            PortState::Slave => {
                self.schedule.delay_req = None;
            }
            PortState::Faulty
            | PortState::Disabled
            | PortState::PreMaster
            | PortState::Passive => {}
        }

        if state != PortState::Slave {
            self.filter.demobilize();
        }
    }

    fn header(&self, sequence_id: u16) -> Header {
        base_header(self.config.domain_number, self.port_identity, sequence_id)
    }

    fn announce_window(&self) -> TimeInterval {
        self.config.announce_interval.as_time_interval()
            * i64::from(self.config.announce_receipt_timeout)
    }

    fn sync_window(&self) -> TimeInterval {
        self.config.sync_interval.as_time_interval() * i64::from(self.config.sync_receipt_timeout)
    }

    fn is_p2p(&self) -> bool {
        matches!(self.config.delay_mechanism, DelayMechanism::P2P { .. })
    }

    fn set_multicast(&mut self, primary: bool) -> Result<(), Error> {
        let groups = MulticastGroups {
            primary,
            link_local: primary && self.is_p2p(),
        };

        self.transport.set_multicast(groups).map_err(|error| {
            log::error!(
                "port {}: could not change multicast groups: {:?}",
                self.port_identity.port_number,
                error
            );
            Error::NetworkError
        })
    }

    /// Serialize and send a message, returning its transmit timestamp if the
    /// transport captured one
    fn send(&mut self, message: &Message, link_local: bool) -> Result<Option<Timestamp>, Error> {
        let length = message.serialize(&mut self.packet_buffer).map_err(|error| {
            log::error!(
                "port {}: could not serialize {:?}: {:?}",
                self.port_identity.port_number,
                message.message_type(),
                error
            );
            Error::BufferOverflow
        })?;

        let context = SendContext {
            event: message.is_event(),
            link_local,
        };

        let timestamp = self
            .transport
            .send(&self.packet_buffer[..length], context)
            .map_err(|error| {
                log::error!(
                    "port {}: failed to send {:?}: {:?}",
                    self.port_identity.port_number,
                    message.message_type(),
                    error
                );
                Error::NetworkError
            })?;

        self.statistics.count_sent(message.message_type());

        Ok(timestamp)
    }

    fn drop_frame(&mut self, reason: &str) {
        log::debug!("port {}: dropped frame, {}", self.port_identity.port_number, reason);
        self.statistics.dropped_frames += 1;
    }
}

impl<T: Transport, F: Filter, O: PortObserver> Port<T, F, O> {
    /// Create a port in the Initializing state.
    ///
    /// Both configurations are validated, and the port must live in the
    /// domain of its clock.
    pub fn new(
        config: PortConfig,
        instance_config: &InstanceConfig,
        transport: T,
        filter_config: F::Config,
        observer: O,
    ) -> Result<Self, Error> {
        config.validate()?;
        instance_config.validate()?;

        if config.domain_number != instance_config.domain_number {
            return Err(Error::InvalidParameter);
        }

        let mut default_ds = InternalDefaultDS::new(instance_config);
        default_ds.number_ports = 1;

        let port_identity = PortIdentity {
            clock_identity: instance_config.clock_identity,
            port_number: config.port_number,
        };

        Ok(Port {
            port_identity,
            status: PortStatus::new(),
            inner: AtomicRefCell::new(PortInner::new(
                config,
                default_ds,
                port_identity,
                transport,
                F::new(filter_config),
            )),
            observer,
        })
    }

    fn lock(&self) -> Result<AtomicRefMut<'_, PortInner<T, F>>, Error> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)
    }

    /// Feed an event to the state machine and run the entry actions of the
    /// new state
    fn apply_event(
        &self,
        inner: &mut PortInner<T, F>,
        now: Timestamp,
        event: StateEvent,
    ) -> Result<(), Error> {
        let from = inner.state;
        let to = match from.transition(event) {
            Some(Transition::To(to)) => to,
            Some(Transition::Stay) => return Ok(()),
            None => return Err(Error::StateError { state: from, event }),
        };

        inner.enter(to, now);
        self.status.state.store(to);

        if from != to {
            log::info!(
                "port {}: {:?} -> {:?} ({:?})",
                self.port_identity.port_number,
                from,
                to,
                event
            );
            inner.statistics.state_transitions += 1;
            self.status.state_transitions.fetch_add(1, Ordering::Relaxed);
            self.observer
                .on_state_change(self.port_identity, from, to, event);
        }

        if to == PortState::Faulty {
            inner.statistics.fault_events += 1;
            self.status.fault_events.fetch_add(1, Ordering::Relaxed);
            self.observer.on_fault(self.port_identity);
        }

        Ok(())
    }

    /// Power up the port: back to Initializing with all protocol state and
    /// statistics cleared
    pub fn initialize<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        self.apply_event(inner, timer.now(), StateEvent::PowerUp)?;

        inner.statistics = PortStatistics::default();
        self.status.state_transitions.store(0, Ordering::Relaxed);
        self.status.fault_events.store(0, Ordering::Relaxed);
        self.status.contended_frames.store(0, Ordering::Relaxed);

        Ok(())
    }

    /// Join the multicast groups and start listening for masters.
    ///
    /// Valid from Initializing and from Disabled.
    pub fn start<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        let event = match inner.state {
            PortState::Initializing => StateEvent::Initialize,
            PortState::Disabled => StateEvent::DesignatedEnabled,
            state => {
                return Err(Error::StateError {
                    state,
                    event: StateEvent::Initialize,
                })
            }
        };

        inner.set_multicast(true)?;
        self.apply_event(inner, timer.now(), event)
    }

    /// Disable the port. Nothing is sent until it is started again.
    pub fn stop<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;

        self.apply_event(inner, timer.now(), StateEvent::DesignatedDisabled)?;
        inner.set_multicast(false)
    }

    /// Report a fault, forcing the port into the Faulty state
    pub fn fault<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        self.handle_event(timer, StateEvent::FaultDetected)
    }

    /// Report that a fault is resolved. The port moves to Initializing and
    /// has to be started again.
    pub fn clear_fault<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        self.handle_event(timer, StateEvent::FaultCleared)
    }

    /// Feed an arbitrary event to the state machine.
    ///
    /// Returns [`Error::StateError`] when the current state does not accept
    /// the event, leaving the state unchanged.
    pub fn handle_event<C: Timer>(&self, timer: &C, event: StateEvent) -> Result<(), Error> {
        let mut guard = self.lock()?;
        self.apply_event(&mut guard, timer.now(), event)
    }

    /// Handle a single received frame.
    ///
    /// `rx_timestamp` is the receive time captured by the transport; when it
    /// is missing the current time of the timer is used. Frames that can't
    /// be decoded are counted as dropped and reported; frames for another
    /// domain, our own frames and frames received while the port is not
    /// active are dropped silently.
    ///
    /// A frame handed over while the port is busy is counted as dropped and
    /// [`Error::ResourceUnavailable`] is returned. [`Port::poll`] leaves
    /// pending frames on the transport instead.
    pub fn handle_frame<C: Timer>(
        &self,
        timer: &C,
        frame: &[u8],
        rx_timestamp: Option<Timestamp>,
    ) -> Result<(), Error> {
        let mut guard = match self.lock() {
            Ok(guard) => guard,
            Err(error) => {
                log::warn!(
                    "port {}: busy, dropping frame",
                    self.port_identity.port_number
                );
                self.status.contended_frames.fetch_add(1, Ordering::Relaxed);
                return Err(error);
            }
        };

        self.process_frame(&mut guard, timer, frame, rx_timestamp)
    }

    fn process_frame<C: Timer>(
        &self,
        inner: &mut PortInner<T, F>,
        timer: &C,
        frame: &[u8],
        rx_timestamp: Option<Timestamp>,
    ) -> Result<(), Error> {
        if !inner.state.is_active() {
            inner.drop_frame("port not active");
            return Ok(());
        }

        let message = match Message::deserialize(frame) {
            Ok(message) => message,
            Err(error) => {
                log::warn!(
                    "port {}: could not parse packet: {:?}",
                    self.port_identity.port_number,
                    error
                );
                inner.statistics.dropped_frames += 1;
                return Err(error.into());
            }
        };

        let header = message.header;
        if header.domain_number != inner.config.domain_number {
            inner.drop_frame("wrong domain");
            return Ok(());
        }
        if header.source_port_identity == inner.port_identity {
            inner.drop_frame("own message");
            return Ok(());
        }

        let now = timer.now();
        let rx = rx_timestamp.unwrap_or(now);
        inner.statistics.count_received(message.message_type());

        match message.body {
            MessageBody::Announce(announce) => self.handle_announce(inner, now, &header, &announce),
            MessageBody::Sync(sync) => self.handle_sync(inner, timer, &header, &sync, rx),
            MessageBody::FollowUp(follow_up) => {
                self.handle_follow_up(inner, timer, &header, &follow_up)
            }
            MessageBody::DelayReq(_) => {
                if inner.is_p2p() {
                    inner.drop_frame("delay request on peer delay port");
                    Ok(())
                } else {
                    inner.handle_delay_req(&header, rx)
                }
            }
            MessageBody::DelayResp(delay_resp) => {
                self.handle_delay_resp(inner, timer, &header, &delay_resp)
            }
            MessageBody::PDelayReq(_) => {
                if inner.is_p2p() {
                    inner.handle_pdelay_req(timer, &header, rx)
                } else {
                    inner.drop_frame("peer delay request on end to end port");
                    Ok(())
                }
            }
            MessageBody::PDelayResp(pdelay_resp) => {
                inner.handle_pdelay_resp(&header, &pdelay_resp, rx);
                Ok(())
            }
            MessageBody::PDelayRespFollowUp(follow_up) => {
                inner.handle_pdelay_resp_follow_up(&header, &follow_up);
                Ok(())
            }
        }
    }

    /// Receive and handle every frame pending on the transport.
    ///
    /// Returns the number of frames received. Handling continues after a
    /// frame fails; the first error is returned once the transport is empty.
    /// A busy port returns [`Error::ResourceUnavailable`] without taking
    /// anything from the transport.
    pub fn poll<C: Timer>(&self, timer: &C) -> Result<usize, Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let mut buffer = [0; MAX_MESSAGE_LEN];
        let mut result = Ok(());
        let mut count = 0;

        loop {
            let received = inner.transport.receive(&mut buffer).map_err(|error| {
                log::error!(
                    "port {}: failed to receive: {:?}",
                    self.port_identity.port_number,
                    error
                );
                Error::NetworkError
            })?;

            let Some(frame) = received else {
                break;
            };

            count += 1;
            let length = frame.len.min(buffer.len());
            keep_first(
                &mut result,
                self.process_frame(inner, timer, &buffer[..length], frame.timestamp),
            );
        }

        result.map(|()| count)
    }

    /// Handle the periodic work of the port.
    ///
    /// First the receipt timeouts are checked, then every message that is
    /// due is sent. All due messages are attempted even if one fails; the
    /// first error is returned.
    pub fn tick<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let now = timer.now();

        let mut result = self.check_timeouts(inner, now);

        match inner.state {
            PortState::Master => {
                if is_due(inner.schedule.announce, now) {
                    inner.schedule.announce =
                        Some(now + inner.config.announce_interval.as_time_interval());
                    keep_first(&mut result, inner.send_announce());
                }
                if is_due(inner.schedule.sync, now) {
                    inner.schedule.sync = Some(now + inner.config.sync_interval.as_time_interval());
                    keep_first(&mut result, inner.send_sync(timer));
                }
            }
            PortState::Uncalibrated | PortState::Slave if !inner.is_p2p() => {
                if is_due(inner.schedule.delay_req, now) {
                    inner.schedule.delay_req =
                        Some(now + inner.config.delay_mechanism.interval().as_time_interval());
                    keep_first(&mut result, inner.send_delay_req(timer));
                }
            }
            _ => {}
        }

        if inner.state.is_active() && inner.is_p2p() && is_due(inner.schedule.pdelay_req, now) {
            inner.schedule.pdelay_req =
                Some(now + inner.config.delay_mechanism.interval().as_time_interval());
            keep_first(&mut result, inner.send_pdelay_req(timer));
        }

        result
    }

    fn check_timeouts(&self, inner: &mut PortInner<T, F>, now: Timestamp) -> Result<(), Error> {
        match inner.state {
            PortState::Listening
            | PortState::Passive
            | PortState::Uncalibrated
            | PortState::Slave => {
                let deadline =
                    inner.last_announce_rx.unwrap_or(inner.state_entered) + inner.announce_window();
                if now >= deadline {
                    self.announce_receipt_timeout(inner, now)?;
                }
            }
            PortState::PreMaster => {
                let steps = i64::from(inner.current_ds.steps_removed) + 1;
                let qualification = inner.config.announce_interval.as_time_interval() * steps;
                if now >= inner.state_entered + qualification {
                    inner.statistics.qualification_timeouts += 1;
                    self.apply_event(inner, now, StateEvent::QualificationTimeoutExpires)?;
                }
            }
            _ => {}
        }

        if matches!(inner.state, PortState::Uncalibrated | PortState::Slave) {
            let deadline = inner.last_sync_rx.unwrap_or(inner.state_entered) + inner.sync_window();
            if now >= deadline {
                log::debug!(
                    "port {}: no sync from {:?}",
                    self.port_identity.port_number,
                    inner.parent_ds.parent_port_identity
                );
                inner.statistics.sync_timeouts += 1;
                self.apply_event(inner, now, StateEvent::SyncReceiptTimeout)?;
            }
        }

        Ok(())
    }

    /// Change the announce interval, effective from the next Announce
    pub fn set_announce_interval(&self, interval: Interval) -> Result<(), Error> {
        if !interval.is_configurable() {
            return Err(Error::InvalidParameter);
        }
        self.lock()?.config.announce_interval = interval;
        Ok(())
    }

    /// Change the sync interval, effective from the next Sync
    pub fn set_sync_interval(&self, interval: Interval) -> Result<(), Error> {
        if !interval.is_configurable() {
            return Err(Error::InvalidParameter);
        }
        self.lock()?.config.sync_interval = interval;
        Ok(())
    }
}

impl<T, F: Filter, O> Port<T, F, O> {
    /// Identity of this port
    pub fn port_identity(&self) -> PortIdentity {
        self.port_identity
    }

    /// The number of this port within its clock
    pub fn port_number(&self) -> u16 {
        self.port_identity.port_number
    }

    /// Current state, read without taking the lock
    pub fn state(&self) -> PortState {
        self.status.state.load()
    }

    /// Indicate whether this port is in the master state.
    pub fn is_master(&self) -> bool {
        self.state() == PortState::Master
    }

    /// Indicate whether this port follows a master, calibrated or not.
    pub fn is_slave(&self) -> bool {
        matches!(self.state(), PortState::Slave | PortState::Uncalibrated)
    }

    /// Indicate whether this port is steering its clock.
    pub fn is_synchronized(&self) -> bool {
        self.state() == PortState::Slave
    }

    /// State changes since the last [`Port::initialize`], read without
    /// taking the lock
    pub fn state_transitions(&self) -> u32 {
        self.status.state_transitions.load(Ordering::Relaxed)
    }

    /// Faults since the last [`Port::initialize`], read without taking the
    /// lock
    pub fn fault_events(&self) -> u32 {
        self.status.fault_events.load(Ordering::Relaxed)
    }

    fn read<R>(&self, f: impl FnOnce(&PortInner<T, F>) -> R) -> Result<R, Error> {
        let inner = self
            .inner
            .try_borrow()
            .map_err(|_| Error::ResourceUnavailable)?;
        Ok(f(&inner))
    }

    /// A snapshot of the counters of this port
    pub fn statistics(&self) -> Result<PortStatistics, Error> {
        let contended = u64::from(self.status.contended_frames.load(Ordering::Relaxed));
        self.read(|inner| PortStatistics {
            dropped_frames: inner.statistics.dropped_frames + contended,
            ..inner.statistics
        })
    }

    /// A snapshot of the port dataset
    pub fn port_ds(&self) -> Result<PortDS, Error> {
        self.read(|inner| {
            PortDS::new(
                inner.port_identity,
                inner.state,
                &inner.config,
                inner.peer_delay.mean_link_delay(),
            )
        })
    }

    /// A snapshot of the current dataset
    pub fn current_ds(&self) -> Result<CurrentDS, Error> {
        self.read(|inner| CurrentDS::from(&inner.current_ds))
    }

    /// A snapshot of the parent dataset
    pub fn parent_ds(&self) -> Result<ParentDS, Error> {
        self.read(|inner| ParentDS::from(&inner.parent_ds))
    }

    /// The time properties of the grandmaster in use
    pub fn time_properties_ds(&self) -> Result<TimePropertiesDS, Error> {
        self.read(|inner| inner.time_properties_ds)
    }

    /// The configuration the port currently runs with
    pub fn config(&self) -> Result<PortConfig, Error> {
        self.read(|inner| inner.config)
    }
}
