//! An in-memory network of point to point links implementing [`Transport`]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use ptp_core::{
    network::{MulticastGroups, ReceivedFrame, SendContext, Transport, TransportCapabilities},
    time::{TimeInterval, Timestamp},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;
use tokio::time::Instant;

use crate::clock::SimClock;

/// Frames waiting on a port beyond this are dropped, like a full socket
/// buffer would
pub const RECEIVE_QUEUE_LEN: usize = 64;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("port {0} is already linked")]
    AlreadyLinked(usize),
    #[error("a port cannot be linked to itself")]
    SelfLink,
    #[error("frame of {needed} bytes does not fit a buffer of {available} bytes")]
    BufferTooSmall { needed: usize, available: usize },
}

#[derive(Debug, Clone, Copy)]
struct Link {
    peer: usize,
    delay: Duration,
    jitter: Duration,
}

#[derive(Debug)]
struct PendingFrame {
    arrival: Instant,
    data: Vec<u8>,
}

#[derive(Debug)]
struct Endpoint {
    clock: SimClock,
    groups: MulticastGroups,
    link: Option<Link>,
    queue: VecDeque<PendingFrame>,
    dropped: u64,
}

#[derive(Debug)]
struct Hub {
    endpoints: Vec<Endpoint>,
    rng: StdRng,
}

/// The medium shared by all ports of a simulation
#[derive(Debug, Clone)]
pub struct LoopbackNetwork {
    hub: Arc<Mutex<Hub>>,
}

/// One network interface. Clones refer to the same interface.
#[derive(Debug, Clone)]
pub struct LoopbackPort {
    index: usize,
    hub: Arc<Mutex<Hub>>,
}

fn lock(hub: &Mutex<Hub>) -> MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoopbackNetwork {
    /// Create an empty network whose link jitter is drawn from `seed`
    pub fn new(seed: u64) -> Self {
        LoopbackNetwork {
            hub: Arc::new(Mutex::new(Hub {
                endpoints: Vec::new(),
                rng: StdRng::seed_from_u64(seed),
            })),
        }
    }

    /// Add an unlinked interface. Frames it receives are timestamped by
    /// `clock`.
    pub fn add_port(&self, clock: SimClock) -> LoopbackPort {
        let mut hub = lock(&self.hub);
        hub.endpoints.push(Endpoint {
            clock,
            groups: MulticastGroups {
                primary: false,
                link_local: false,
            },
            link: None,
            queue: VecDeque::new(),
            dropped: 0,
        });

        LoopbackPort {
            index: hub.endpoints.len() - 1,
            hub: self.hub.clone(),
        }
    }

    /// Connect two interfaces with a cable. Every frame takes `delay` plus
    /// a random part of `jitter` to cross it.
    pub fn connect(
        &self,
        a: &LoopbackPort,
        b: &LoopbackPort,
        delay: Duration,
        jitter: Duration,
    ) -> Result<(), LinkError> {
        if a.index == b.index {
            return Err(LinkError::SelfLink);
        }

        let mut hub = lock(&self.hub);
        for index in [a.index, b.index] {
            if hub.endpoints[index].link.is_some() {
                return Err(LinkError::AlreadyLinked(index));
            }
        }

        hub.endpoints[a.index].link = Some(Link {
            peer: b.index,
            delay,
            jitter,
        });
        hub.endpoints[b.index].link = Some(Link {
            peer: a.index,
            delay,
            jitter,
        });

        Ok(())
    }
}

impl LoopbackPort {
    /// Frames lost because the receive queue was full
    pub fn dropped(&self) -> u64 {
        lock(&self.hub).endpoints[self.index].dropped
    }
}

impl Transport for LoopbackPort {
    type Error = LinkError;

    fn send(
        &mut self,
        frame: &[u8],
        context: SendContext,
    ) -> Result<Option<Timestamp>, Self::Error> {
        let now = Instant::now();
        let mut hub = lock(&self.hub);
        let hub = &mut *hub;

        let sender = &hub.endpoints[self.index];
        let tx_timestamp = context.event.then(|| sender.clock.timestamp_at(now));

        let Some(link) = sender.link else {
            log::trace!("port {} is not linked, frame lost", self.index);
            return Ok(tx_timestamp);
        };

        let jitter = if link.jitter.is_zero() {
            Duration::ZERO
        } else {
            hub.rng.gen_range(Duration::ZERO..=link.jitter)
        };

        let receiver = &mut hub.endpoints[link.peer];
        let joined = if context.link_local {
            receiver.groups.link_local
        } else {
            receiver.groups.primary
        };

        if !joined {
            return Ok(tx_timestamp);
        }
        if receiver.queue.len() >= RECEIVE_QUEUE_LEN {
            receiver.dropped += 1;
            return Ok(tx_timestamp);
        }

        let arrival = now + link.delay + jitter;
        // Jitter must not reorder frames on one cable
        let arrival = match receiver.queue.back() {
            Some(last) => arrival.max(last.arrival),
            None => arrival,
        };
        receiver.queue.push_back(PendingFrame {
            arrival,
            data: frame.to_vec(),
        });

        Ok(tx_timestamp)
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<Option<ReceivedFrame>, Self::Error> {
        let mut hub = lock(&self.hub);
        let endpoint = &mut hub.endpoints[self.index];

        match endpoint.queue.front() {
            Some(frame) if frame.arrival <= Instant::now() => {
                if frame.data.len() > buffer.len() {
                    return Err(LinkError::BufferTooSmall {
                        needed: frame.data.len(),
                        available: buffer.len(),
                    });
                }
            }
            _ => return Ok(None),
        }

        let Some(frame) = endpoint.queue.pop_front() else {
            return Ok(None);
        };
        buffer[..frame.data.len()].copy_from_slice(&frame.data);

        Ok(Some(ReceivedFrame {
            len: frame.data.len(),
            timestamp: Some(endpoint.clock.timestamp_at(frame.arrival)),
        }))
    }

    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities {
            hardware_timestamps: true,
            timestamp_resolution: TimeInterval::from_nanos(1),
        }
    }

    fn set_multicast(&mut self, groups: MulticastGroups) -> Result<(), Self::Error> {
        lock(&self.hub).endpoints[self.index].groups = groups;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_GROUPS: MulticastGroups = MulticastGroups {
        primary: true,
        link_local: true,
    };

    const EVENT: SendContext = SendContext {
        event: true,
        link_local: false,
    };

    fn pair(delay: Duration) -> (LoopbackNetwork, SimClock, LoopbackPort, LoopbackPort) {
        let start = Instant::now();
        let clock = SimClock::new(start, 0, 0.0);
        let network = LoopbackNetwork::new(0);
        let mut a = network.add_port(clock.clone());
        let mut b = network.add_port(clock.clone());
        a.set_multicast(ALL_GROUPS).unwrap();
        b.set_multicast(ALL_GROUPS).unwrap();
        network.connect(&a, &b, delay, Duration::ZERO).unwrap();
        (network, clock, a, b)
    }

    #[tokio::test(start_paused = true)]
    async fn frames_arrive_after_the_link_delay() {
        let (_network, _clock, mut a, mut b) = pair(Duration::from_micros(5));

        let sent = a.send(&[1, 2, 3], EVENT).unwrap().unwrap();

        let mut buffer = [0; 16];
        assert_eq!(b.receive(&mut buffer), Ok(None));

        tokio::time::advance(Duration::from_millis(1)).await;
        let received = b.receive(&mut buffer).unwrap().unwrap();
        assert_eq!(&buffer[..received.len], &[1, 2, 3]);
        assert_eq!(
            received.timestamp.unwrap() - sent,
            TimeInterval::from_nanos(5000)
        );
        assert_eq!(a.receive(&mut buffer), Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn general_frames_have_no_transmit_timestamp() {
        let (_network, _clock, mut a, _b) = pair(Duration::ZERO);
        let general = SendContext {
            event: false,
            link_local: false,
        };
        assert_eq!(a.send(&[0; 4], general), Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn groups_filter_delivery() {
        let (_network, _clock, mut a, mut b) = pair(Duration::ZERO);
        b.set_multicast(MulticastGroups {
            primary: true,
            link_local: false,
        })
        .unwrap();

        let peer_delay = SendContext {
            event: true,
            link_local: true,
        };
        a.send(&[7], peer_delay).unwrap();
        a.send(&[8], EVENT).unwrap();

        let mut buffer = [0; 4];
        let received = b.receive(&mut buffer).unwrap().unwrap();
        assert_eq!(buffer[..received.len], [8]);
        assert_eq!(b.receive(&mut buffer), Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn small_buffers_keep_the_frame() {
        let (_network, _clock, mut a, mut b) = pair(Duration::ZERO);
        a.send(&[0; 8], EVENT).unwrap();

        let mut small = [0; 4];
        assert_eq!(
            b.receive(&mut small),
            Err(LinkError::BufferTooSmall {
                needed: 8,
                available: 4
            })
        );

        let mut buffer = [0; 8];
        assert!(b.receive(&mut buffer).unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn full_queues_drop_frames() {
        let (_network, _clock, mut a, b) = pair(Duration::ZERO);
        for _ in 0..RECEIVE_QUEUE_LEN + 3 {
            a.send(&[0], EVENT).unwrap();
        }
        assert_eq!(b.dropped(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn ports_take_one_link() {
        let (network, clock, a, _b) = pair(Duration::ZERO);
        let c = network.add_port(clock);

        assert_eq!(
            network.connect(&a, &c, Duration::ZERO, Duration::ZERO),
            Err(LinkError::AlreadyLinked(a.index))
        );
        assert_eq!(
            network.connect(&c, &c, Duration::ZERO, Duration::ZERO),
            Err(LinkError::SelfLink)
        );
    }
}
