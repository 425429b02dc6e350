use atomic_refcell::AtomicRefCell;

use super::{cancel_tick, schedule_tick};
use crate::{
    clock::{Timer, TimerHandle},
    config::{InstanceConfig, PortConfig},
    datastructures::datasets::InternalDefaultDS,
    filters::{Filter, PiFilter},
    network::Transport,
    observability::default::DefaultDS,
    port::{NoObserver, Port, PortObserver},
    time::Timestamp,
    Error,
};

/// A PTP clock with exactly one port.
///
/// All protocol work is done by the [`Port`]; the clock adds the periodic
/// schedule and the default dataset.
#[derive(Debug)]
pub struct OrdinaryClock<T, F: Filter = PiFilter, O = NoObserver> {
    default_ds: InternalDefaultDS,
    port: Port<T, F, O>,
    tick_handle: AtomicRefCell<Option<TimerHandle>>,
}

impl<T: Transport, F: Filter, O: PortObserver> OrdinaryClock<T, F, O> {
    /// Create the clock and its port
    pub fn new(
        instance_config: InstanceConfig,
        port_config: PortConfig,
        transport: T,
        filter_config: F::Config,
        observer: O,
    ) -> Result<Self, Error> {
        let port = Port::new(
            port_config,
            &instance_config,
            transport,
            filter_config,
            observer,
        )?;

        let mut default_ds = InternalDefaultDS::new(&instance_config);
        default_ds.number_ports = 1;

        Ok(Self {
            default_ds,
            port,
            tick_handle: AtomicRefCell::new(None),
        })
    }

    /// See [`Port::initialize`]
    pub fn initialize<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        self.port.initialize(timer)
    }

    /// Start the port and schedule the periodic tick
    pub fn start<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut tick_handle = self
            .tick_handle
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)?;

        self.port.start(timer)?;

        if tick_handle.is_none() {
            *tick_handle = Some(schedule_tick(timer)?);
        }

        Ok(())
    }

    /// Cancel the periodic tick and disable the port
    pub fn stop<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut tick_handle = self
            .tick_handle
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)?;

        if let Some(handle) = tick_handle.take() {
            cancel_tick(timer, handle)?;
        }

        self.port.stop(timer)
    }

    /// See [`Port::tick`]
    pub fn tick<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        self.port.tick(timer)
    }

    /// See [`Port::poll`]
    pub fn poll<C: Timer>(&self, timer: &C) -> Result<usize, Error> {
        self.port.poll(timer)
    }

    /// See [`Port::handle_frame`]
    pub fn handle_frame<C: Timer>(
        &self,
        timer: &C,
        frame: &[u8],
        rx_timestamp: Option<Timestamp>,
    ) -> Result<(), Error> {
        self.port.handle_frame(timer, frame, rx_timestamp)
    }
}

impl<T, F: Filter, O> OrdinaryClock<T, F, O> {
    /// The only port of this clock
    pub fn port(&self) -> &Port<T, F, O> {
        &self.port
    }

    pub fn is_master(&self) -> bool {
        self.port.is_master()
    }

    pub fn is_slave(&self) -> bool {
        self.port.is_slave()
    }

    pub fn is_synchronized(&self) -> bool {
        self.port.is_synchronized()
    }

    /// The default dataset of this clock
    pub fn default_ds(&self) -> DefaultDS {
        DefaultDS::from(&self.default_ds)
    }
}
