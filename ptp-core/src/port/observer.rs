use super::{PortState, StateEvent};
use crate::datastructures::common::PortIdentity;

/// Receives notifications about a port.
///
/// Called with the port lock held, so implementations must not call back
/// into the port.
pub trait PortObserver {
    /// The port moved from `from` to `to` because of `event`
    fn on_state_change(
        &self,
        _port: PortIdentity,
        _from: PortState,
        _to: PortState,
        _event: StateEvent,
    ) {
    }

    /// The port entered the Faulty state
    fn on_fault(&self, _port: PortIdentity) {}
}

/// A [`PortObserver`] that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl PortObserver for NoObserver {}

impl<O: PortObserver> PortObserver for &O {
    fn on_state_change(
        &self,
        port: PortIdentity,
        from: PortState,
        to: PortState,
        event: StateEvent,
    ) {
        (**self).on_state_change(port, from, to, event)
    }

    fn on_fault(&self, port: PortIdentity) {
        (**self).on_fault(port)
    }
}
