//! `ptp-core` is a library implementing the protocol core of PTP version 2
//! (IEEE1588-2019): the message codec, the best master clock algorithm, the
//! port state machine and the clock entities built on top of it.
//!
//! The library does not allocate and does not need the standard library, so
//! it can run on embedded targets. Enabling the `std` feature (on by default)
//! only adds [`std::error::Error`] implementations to the error types.
//!
//! # Device interfaces
//! `ptp-core` has no access to the clock or the network by itself. The host
//! provides them by implementing two traits:
//! * [`Timer`]: reads, steps and steers the local clock and runs periodic
//!   work
//! * [`Transport`]: sends and receives frames, with timestamps where the
//!   hardware can provide them
//!
//! # Clocks
//! A [`Port`](port::Port) does all protocol work for one network interface.
//! The [`instance`] module composes ports into an
//! [`OrdinaryClock`](instance::OrdinaryClock), a
//! [`BoundaryClock`](instance::BoundaryClock) or a
//! [`TransparentClock`](instance::TransparentClock).
//!
//! The host calls `tick` on a clock every
//! [`TICK_INTERVAL`](instance::TICK_INTERVAL) and hands every received frame
//! to the port it arrived on. Everything else, from choosing a master to
//! steering the clock, happens inside those calls.
//!
//! # Logging
//! Logging goes through the [`log`] crate. State changes are logged at info
//! level, undecodable frames at warn level and failing device calls at error
//! level.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod bmc;
pub mod clock;
pub mod config;
pub(crate) mod datastructures;
mod error;
pub mod filters;
pub mod instance;
pub mod network;
pub mod observability;
pub mod port;
pub mod time;

pub use clock::Timer;
pub use datastructures::{
    messages::{
        AnnounceMessage, DelayReqMessage, DelayRespMessage, FollowUpMessage, Header, Message,
        MessageBody, MessageType, PDelayReqMessage, PDelayRespFollowUpMessage, PDelayRespMessage,
        SyncMessage, MAX_DATA_LEN, MAX_MESSAGE_LEN,
    },
    WireFormatError,
};
pub use error::Error;
pub use instance::{BoundaryClock, OrdinaryClock, TransparentClock};
pub use network::Transport;
pub use port::Port;
