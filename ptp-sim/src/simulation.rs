//! Builds the clocks and links of a [`Config`] and drives them in simulated
//! time.

use std::{collections::HashMap, time::Duration};

use ptp_core::{
    filters::PiFilter,
    instance::{BoundaryClock, OrdinaryClock, TransparentClock, TransparentMode, TICK_INTERVAL},
    network::{MulticastGroups, Transport},
    Error, MessageType, Timer, MAX_MESSAGE_LEN,
};
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{
    clock::SimClock,
    config::{ClockKind, Config, ConfigError, PortRef},
    network::{LinkError, LoopbackNetwork, LoopbackPort},
    observer::{ClockStatus, LogObserver, PortStatus},
};

/// How often every port is checked for received frames. Frames are
/// timestamped on arrival, so this only bounds the processing latency.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("link error: {0}")]
    Link(#[from] LinkError),
    #[error("clock {clock}: {source}")]
    Ptp {
        clock: String,
        #[source]
        source: Error,
    },
}

type Ordinary = OrdinaryClock<LoopbackPort, PiFilter, LogObserver>;
type Boundary = BoundaryClock<LoopbackPort, PiFilter, LogObserver>;

enum Entity {
    Ordinary(Ordinary),
    Boundary(Boundary),
    Transparent {
        clock: TransparentClock<LoopbackPort>,
        /// Receive side of the ports handed to `clock`
        ports: Vec<(u16, LoopbackPort)>,
    },
}

struct Node {
    name: String,
    clock: SimClock,
    entity: Entity,
}

pub struct Simulation {
    nodes: Vec<Node>,
}

impl Simulation {
    /// Create every clock of `config` at the current instant and cable them
    /// up
    pub fn new(config: &Config) -> Result<Self, SimulationError> {
        let start = Instant::now();
        let network = LoopbackNetwork::new(config.seed);
        let mut interfaces = HashMap::new();
        let mut nodes = Vec::with_capacity(config.clocks.len());

        for clock_config in &config.clocks {
            let name = clock_config.name.clone();
            let ptp_error = |source| SimulationError::Ptp {
                clock: clock_config.name.clone(),
                source,
            };
            let clock = SimClock::new(
                start,
                clock_config.initial_offset_ns,
                clock_config.frequency_error_ppm,
            );

            let mut add_interface = |number: u16| {
                let port = network.add_port(clock.clone());
                interfaces.insert(
                    PortRef {
                        clock: name.clone(),
                        port: number,
                    },
                    port.clone(),
                );
                port
            };

            let instance_config = clock_config.instance_config(config.domain);
            let entity = match clock_config.kind {
                ClockKind::Ordinary => {
                    let settings = &clock_config.ports[0];
                    Entity::Ordinary(
                        OrdinaryClock::new(
                            instance_config,
                            settings.port_config(config.domain),
                            add_interface(settings.number),
                            Default::default(),
                            LogObserver::new(&name),
                        )
                        .map_err(ptp_error)?,
                    )
                }
                ClockKind::Boundary => {
                    let mut boundary = BoundaryClock::new(instance_config).map_err(ptp_error)?;
                    for settings in &clock_config.ports {
                        boundary
                            .add_port(
                                settings.port_config(config.domain),
                                add_interface(settings.number),
                                Default::default(),
                                LogObserver::new(&name),
                            )
                            .map_err(ptp_error)?;
                    }
                    Entity::Boundary(boundary)
                }
                ClockKind::Transparent => {
                    let mut transparent = TransparentClock::new(TransparentMode::EndToEnd);
                    let mut ports = Vec::new();
                    for settings in &clock_config.ports {
                        let port = add_interface(settings.number);
                        transparent
                            .add_port(settings.number, port.clone())
                            .map_err(ptp_error)?;
                        ports.push((settings.number, port));
                    }
                    Entity::Transparent {
                        clock: transparent,
                        ports,
                    }
                }
            };

            nodes.push(Node {
                name,
                clock,
                entity,
            });
        }

        for link in &config.links {
            let missing = |end: &PortRef| {
                ConfigError::Invalid(format!("link to unknown port {end}"))
            };
            let a = interfaces.get(&link.a).ok_or_else(|| missing(&link.a))?;
            let b = interfaces.get(&link.b).ok_or_else(|| missing(&link.b))?;
            network.connect(
                a,
                b,
                Duration::from_nanos(link.delay_ns),
                Duration::from_nanos(link.jitter_ns),
            )?;
        }

        Ok(Simulation { nodes })
    }

    /// Power up and start every clock
    pub fn start(&mut self) -> Result<(), SimulationError> {
        for node in &mut self.nodes {
            let result = match &mut node.entity {
                Entity::Ordinary(clock) => clock
                    .initialize(&node.clock)
                    .and_then(|()| clock.start(&node.clock)),
                Entity::Boundary(clock) => clock
                    .initialize(&node.clock)
                    .and_then(|()| clock.start(&node.clock)),
                Entity::Transparent { ports, .. } => {
                    for (_, port) in ports.iter_mut() {
                        port.set_multicast(MulticastGroups {
                            primary: true,
                            link_local: false,
                        })?;
                    }
                    Ok(())
                }
            };

            result.map_err(|source| SimulationError::Ptp {
                clock: node.name.clone(),
                source,
            })?;
            tracing::debug!(clock = %node.name, "started");
        }

        Ok(())
    }

    /// Stop every clock, reporting the first failure
    pub fn stop(&self) -> Result<(), SimulationError> {
        let mut result = Ok(());
        for node in &self.nodes {
            let stopped = match &node.entity {
                Entity::Ordinary(clock) => clock.stop(&node.clock),
                Entity::Boundary(clock) => clock.stop(&node.clock),
                Entity::Transparent { .. } => Ok(()),
            };
            if let Err(source) = stopped {
                if result.is_ok() {
                    result = Err(SimulationError::Ptp {
                        clock: node.name.clone(),
                        source,
                    });
                }
            }
        }
        result
    }

    /// Run the started clocks for `duration` of tokio time
    pub async fn run(&self, duration: Duration) {
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = tick.tick() => self.tick(),
                _ = poll.tick() => self.poll(),
            }
        }
    }

    fn tick(&self) {
        for node in &self.nodes {
            if node.clock.tick_interval().is_none() {
                continue;
            }

            let result = match &node.entity {
                Entity::Ordinary(clock) => clock.tick(&node.clock),
                Entity::Boundary(clock) => clock.tick(&node.clock),
                Entity::Transparent { .. } => Ok(()),
            };
            if let Err(error) = result {
                tracing::warn!(clock = %node.name, %error, "tick failed");
            }
        }
    }

    fn poll(&self) {
        for node in &self.nodes {
            let result = match &node.entity {
                Entity::Ordinary(clock) => clock.poll(&node.clock).map(drop),
                Entity::Boundary(clock) => clock.poll(&node.clock).map(drop),
                Entity::Transparent { clock, ports } => {
                    forward_pending(&node.clock, clock, ports);
                    Ok(())
                }
            };
            if let Err(error) = result {
                tracing::warn!(clock = %node.name, %error, "poll failed");
            }
        }
    }

    /// Snapshot of every clock. Offsets are taken against the first clock
    /// that is master on all of its ports.
    pub fn status(&self) -> Vec<ClockStatus> {
        let grandmaster = self.nodes.iter().find(|node| match &node.entity {
            Entity::Ordinary(clock) => clock.is_master(),
            Entity::Boundary(clock) => clock.is_master() && !clock.is_slave(),
            Entity::Transparent { .. } => false,
        });

        self.nodes
            .iter()
            .map(|node| {
                let offset_from_grandmaster = grandmaster.map(|grandmaster| {
                    let offset = node.clock.offset_from(&grandmaster.clock);
                    offset.clamp(i64::MIN as i128, i64::MAX as i128) as i64
                });

                let mut status = ClockStatus {
                    name: node.name.clone(),
                    kind: "transparent",
                    synchronized: false,
                    offset_from_grandmaster,
                    frequency_adjustment_ppb: node.clock.adjustment_ppb(),
                    default_ds: None,
                    ports: Vec::new(),
                    forwarded: Vec::new(),
                };

                match &node.entity {
                    Entity::Ordinary(clock) => {
                        status.kind = "ordinary";
                        status.synchronized = clock.is_synchronized();
                        status.default_ds = Some(clock.default_ds());
                        status.ports.extend(PortStatus::of(clock.port()).ok());
                    }
                    Entity::Boundary(clock) => {
                        status.kind = "boundary";
                        status.synchronized = clock.is_synchronized();
                        status.default_ds = Some(clock.default_ds());
                        status
                            .ports
                            .extend(clock.ports().iter().filter_map(|p| PortStatus::of(p).ok()));
                    }
                    Entity::Transparent { clock, ports } => {
                        status.forwarded = ports
                            .iter()
                            .filter_map(|(number, _)| Some((*number, clock.forwarded(*number)?)))
                            .collect();
                    }
                }

                status
            })
            .collect()
    }
}

/// Hand every frame waiting on a transparent clock port to all its other
/// ports
fn forward_pending(
    timer: &SimClock,
    clock: &TransparentClock<LoopbackPort>,
    ports: &[(u16, LoopbackPort)],
) {
    let mut buffer = [0; MAX_MESSAGE_LEN];
    for (ingress, port) in ports {
        let mut port = port.clone();
        loop {
            let received = match port.receive(&mut buffer) {
                Ok(Some(received)) => received,
                Ok(None) => break,
                Err(error) => {
                    tracing::warn!(port = ingress, %error, "receive failed");
                    break;
                }
            };
            let frame = &buffer[..received.len];
            let Some(ingress_timestamp) = received.timestamp else {
                continue;
            };

            // Peer delay messages stay on their link
            let message_type = frame
                .first()
                .and_then(|byte| MessageType::try_from(byte & 0x0f).ok());
            if matches!(
                message_type,
                Some(
                    MessageType::PDelayReq
                        | MessageType::PDelayResp
                        | MessageType::PDelayRespFollowUp
                )
            ) {
                continue;
            }

            for (egress, _) in ports.iter().filter(|(egress, _)| egress != ingress) {
                if let Err(error) =
                    clock.forward(*ingress, *egress, frame, ingress_timestamp, timer.now())
                {
                    tracing::debug!(ingress, egress, %error, "frame not forwarded");
                }
            }
        }
    }
}
