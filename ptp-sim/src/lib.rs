//! Runs `ptp-core` clocks against each other over a simulated network.
//!
//! Every clock gets its own drifting [`SimClock`](clock::SimClock) and every
//! port a [`LoopbackPort`](network::LoopbackPort). Frames cross the
//! simulated cables with a configured delay and are timestamped exactly on
//! arrival, so the remaining offset after convergence shows what the
//! protocol and the servo achieve by themselves.

pub mod clock;
pub mod config;
pub mod network;
pub mod observer;
pub mod simulation;

use tracing::level_filters::LevelFilter;

/// Send the output of `tracing` and of the `log` crate, which `ptp-core`
/// logs through, to stderr
pub fn setup_logger(
    level: log::LevelFilter,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_log::LogTracer::init_with_filter(level)?;

    let level = match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
}
