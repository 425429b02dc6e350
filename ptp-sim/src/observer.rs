use ptp_core::{
    config::PortIdentity,
    observability::{current::CurrentDS, default::DefaultDS, parent::ParentDS, port::PortDS},
    port::{Port, PortObserver, PortState, PortStatistics, StateEvent},
    Error,
};
use serde::Serialize;

/// Reports what happens on the ports of one simulated clock to the log
#[derive(Debug, Clone)]
pub struct LogObserver {
    clock: String,
}

impl LogObserver {
    pub fn new(clock: impl Into<String>) -> Self {
        LogObserver {
            clock: clock.into(),
        }
    }
}

impl PortObserver for LogObserver {
    fn on_state_change(
        &self,
        port: PortIdentity,
        from: PortState,
        to: PortState,
        event: StateEvent,
    ) {
        tracing::info!(
            clock = %self.clock,
            port = port.port_number,
            ?event,
            "{} -> {}",
            from,
            to
        );
    }

    fn on_fault(&self, port: PortIdentity) {
        tracing::warn!(clock = %self.clock, port = port.port_number, "port is faulty");
    }
}

/// Snapshot of one simulated clock, written out as JSON
#[derive(Debug, Serialize)]
pub struct ClockStatus {
    pub name: String,
    pub kind: &'static str,
    pub synchronized: bool,
    /// Offset from the grandmaster, in nanoseconds, measured against the
    /// simulation's true time
    pub offset_from_grandmaster: Option<i64>,
    pub frequency_adjustment_ppb: f64,
    pub default_ds: Option<DefaultDS>,
    pub ports: Vec<PortStatus>,
    /// Frames sent per port of a transparent clock
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forwarded: Vec<(u16, u64)>,
}

#[derive(Debug, Serialize)]
pub struct PortStatus {
    pub port_ds: PortDS,
    pub current_ds: CurrentDS,
    pub parent_ds: ParentDS,
    pub statistics: PortStatistics,
}

impl PortStatus {
    pub fn of<T, F: ptp_core::filters::Filter, O>(port: &Port<T, F, O>) -> Result<Self, Error> {
        Ok(PortStatus {
            port_ds: port.port_ds()?,
            current_ds: port.current_ds()?,
            parent_ds: port.parent_ds()?,
            statistics: port.statistics()?,
        })
    }
}

pub fn write_json<W: std::io::Write>(
    writer: W,
    status: &[ClockStatus],
) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(writer, status)
}
