use arrayvec::ArrayVec;
use atomic_refcell::AtomicRefCell;

use super::{cancel_tick, keep_first, schedule_tick, MAX_PORTS};
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

/// A PTP clock with several ports.
///
/// Every port runs its own state machine and BMCA against the shared
/// [`InstanceConfig`]. Operations on the clock fan out to all ports; they
/// carry on past a failing port and report the first error.
///
/// Using the time of the synchronized port to steer the other ports is left
/// to the host: all ports are usually created over the same [`Timer`].
#[derive(Debug)]
pub struct BoundaryClock<T, F: Filter = PiFilter, O = NoObserver> {
    instance_config: InstanceConfig,
    ports: ArrayVec<Port<T, F, O>, MAX_PORTS>,
    tick_handle: AtomicRefCell<Option<TimerHandle>>,
}

impl<T: Transport, F: Filter, O: PortObserver> BoundaryClock<T, F, O> {
    /// Create a clock without any ports
    pub fn new(instance_config: InstanceConfig) -> Result<Self, Error> {
        instance_config.validate()?;

        Ok(Self {
            instance_config,
            ports: ArrayVec::new(),
            tick_handle: AtomicRefCell::new(None),
        })
    }

    /// Add a port to the clock.
    ///
    /// Fails with [`Error::InvalidParameter`] when the port number is taken
    /// or the configuration is invalid, and with
    /// [`Error::ResourceUnavailable`] when the clock has [`MAX_PORTS`] ports.
    pub fn add_port(
        &mut self,
        config: PortConfig,
        transport: T,
        filter_config: F::Config,
        observer: O,
    ) -> Result<&Port<T, F, O>, Error> {
        if self.find_port(config.port_number).is_some() {
            return Err(Error::InvalidParameter);
        }
        if self.ports.is_full() {
            return Err(Error::ResourceUnavailable);
        }

        let port = Port::new(
            config,
            &self.instance_config,
            transport,
            filter_config,
            observer,
        )?;
        self.ports.push(port);

        Ok(&self.ports[self.ports.len() - 1])
    }

    fn for_each_port(
        &self,
        mut f: impl FnMut(&Port<T, F, O>) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut result = Ok(());
        for port in &self.ports {
            keep_first(&mut result, f(port));
        }
        result
    }

    /// Power up every port
    pub fn initialize<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        self.for_each_port(|port| port.initialize(timer))
    }

    /// Start every port and schedule the periodic tick
    pub fn start<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut tick_handle = self
            .tick_handle
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)?;

        self.for_each_port(|port| port.start(timer))?;

        if tick_handle.is_none() {
            *tick_handle = Some(schedule_tick(timer)?);
        }

        Ok(())
    }

    /// Cancel the periodic tick and disable every port
    pub fn stop<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        let mut tick_handle = self
            .tick_handle
            .try_borrow_mut()
            .map_err(|_| Error::ResourceUnavailable)?;

        let mut result = match tick_handle.take() {
            Some(handle) => cancel_tick(timer, handle),
            None => Ok(()),
        };
        keep_first(&mut result, self.for_each_port(|port| port.stop(timer)));

        result
    }

    /// Run the periodic work of every active port
    pub fn tick<C: Timer>(&self, timer: &C) -> Result<(), Error> {
        self.for_each_port(|port| {
            if port.state().is_active() {
                port.tick(timer)
            } else {
                Ok(())
            }
        })
    }

    /// Receive pending frames on every port, returning how many were handled
    pub fn poll<C: Timer>(&self, timer: &C) -> Result<usize, Error> {
        let mut total = 0;
        self.for_each_port(|port| {
            total += port.poll(timer)?;
            Ok(())
        })?;
        Ok(total)
    }

    /// Hand a received frame to the port it arrived on
    pub fn process_message<C: Timer>(
        &self,
        timer: &C,
        port_number: u16,
        frame: &[u8],
        rx_timestamp: Option<Timestamp>,
    ) -> Result<(), Error> {
        let port = self
            .find_port(port_number)
            .ok_or(Error::InvalidParameter)?;

        port.handle_frame(timer, frame, rx_timestamp)
    }
}

impl<T, F: Filter, O> BoundaryClock<T, F, O> {
    /// Look up a port by its number
    pub fn find_port(&self, port_number: u16) -> Option<&Port<T, F, O>> {
        self.ports
            .iter()
            .find(|port| port.port_number() == port_number)
    }

    pub fn ports(&self) -> &[Port<T, F, O>] {
        &self.ports
    }

    /// Whether any port is master
    pub fn is_master(&self) -> bool {
        self.ports.iter().any(Port::is_master)
    }

    /// Whether any port follows a master
    pub fn is_slave(&self) -> bool {
        self.ports.iter().any(Port::is_slave)
    }

    /// Whether any port is steering the clock
    pub fn is_synchronized(&self) -> bool {
        self.ports.iter().any(Port::is_synchronized)
    }

    pub fn default_ds(&self) -> DefaultDS {
        let mut default_ds = InternalDefaultDS::new(&self.instance_config);
        default_ds.number_ports = self.ports.len() as u16;
        DefaultDS::from(&default_ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bmc::foreign_master::tests::header,
        clock::test::FakeTimer,
        config::ServoConfig,
        datastructures::messages::{Message, MessageBody, SyncMessage},
        network::test::{FakeNetwork, FakeTransport},
        port::{
            tests::{announce_from, instance},
            PortState,
        },
    };

    fn port_config(port_number: u16) -> PortConfig {
        PortConfig {
            port_number,
            ..Default::default()
        }
    }

    fn clock<'a>(networks: &'a [FakeNetwork]) -> BoundaryClock<FakeTransport<'a>> {
        let mut clock = BoundaryClock::new(instance(200)).unwrap();
        for (index, network) in networks.iter().enumerate() {
            clock
                .add_port(
                    port_config(index as u16 + 1),
                    network.transport(),
                    ServoConfig::default(),
                    NoObserver,
                )
                .unwrap();
        }
        clock
    }

    #[test]
    fn port_numbers_are_unique() {
        let networks = [FakeNetwork::default(), FakeNetwork::default()];
        let mut clock = clock(&networks[..1]);

        let result = clock.add_port(
            port_config(1),
            networks[1].transport(),
            ServoConfig::default(),
            NoObserver,
        );
        assert!(matches!(result, Err(Error::InvalidParameter)));
        assert_eq!(clock.ports().len(), 1);
    }

    #[test]
    fn port_table_is_bounded() {
        let networks: [FakeNetwork; MAX_PORTS + 1] = Default::default();
        let mut clock = clock(&networks[..MAX_PORTS]);

        let result = clock.add_port(
            port_config(100),
            networks[MAX_PORTS].transport(),
            ServoConfig::default(),
            NoObserver,
        );
        assert!(matches!(result, Err(Error::ResourceUnavailable)));
        assert_eq!(clock.default_ds().number_ports, MAX_PORTS as u16);
    }

    #[test]
    fn frames_reach_their_port() {
        let networks = [FakeNetwork::default(), FakeNetwork::default()];
        let clock = clock(&networks);
        let timer = FakeTimer::new(100);
        clock.initialize(&timer).unwrap();
        clock.start(&timer).unwrap();

        for sequence_id in 0..2 {
            let announce = announce_from(0x20, 128, sequence_id);
            let mut buffer = [0; 64];
            let length = announce.serialize(&mut buffer).unwrap();
            clock
                .process_message(&timer, 2, &buffer[..length], None)
                .unwrap();
        }

        assert_eq!(clock.find_port(1).unwrap().state(), PortState::Listening);
        assert_eq!(clock.find_port(2).unwrap().state(), PortState::Uncalibrated);
        assert!(clock.is_slave());
        assert!(!clock.is_synchronized());

        assert_eq!(
            clock.process_message(&timer, 3, &[0; 44], None),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn ticks_fan_out_to_every_port() {
        let networks = [FakeNetwork::default(), FakeNetwork::default()];
        let clock = clock(&networks);
        let timer = FakeTimer::new(100);
        clock.initialize(&timer).unwrap();
        clock.start(&timer).unwrap();

        // A foreign master on port 1 only
        networks[0].deliver(&announce_from(0x20, 128, 0), None);
        networks[0].deliver(&announce_from(0x20, 128, 1), None);
        assert_eq!(clock.poll(&timer), Ok(2));

        for sequence_id in 2..66 {
            timer.advance_millis(125);
            clock.tick(&timer).unwrap();

            let sync = Message {
                header: header(0x20, sequence_id),
                body: MessageBody::Sync(SyncMessage {
                    origin_timestamp: timer.now(),
                }),
            };
            networks[0].deliver(&announce_from(0x20, 128, sequence_id), None);
            networks[0].deliver(&sync, None);
            assert_eq!(clock.poll(&timer), Ok(2));
        }

        assert!(clock.find_port(1).unwrap().is_slave());
        assert!(clock.find_port(2).unwrap().is_master());
        assert!(clock.is_master());
        assert!(clock.is_slave());

        clock.stop(&timer).unwrap();
        assert!(clock
            .ports()
            .iter()
            .all(|port| port.state() == PortState::Disabled));
    }
}
