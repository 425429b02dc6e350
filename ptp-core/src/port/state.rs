use core::{
    fmt::{Display, Formatter},
    sync::atomic::{AtomicU8, Ordering},
};

/// The protocol state of a port.
///
/// For more details see *IEEE1588-2019 section 9.2.5*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PortState {
    Initializing = 1,
    Faulty = 2,
    Disabled = 3,
    Listening = 4,
    PreMaster = 5,
    Master = 6,
    Passive = 7,
    Uncalibrated = 8,
    Slave = 9,
}

impl PortState {
    const ALL: [PortState; 9] = [
        PortState::Initializing,
        PortState::Faulty,
        PortState::Disabled,
        PortState::Listening,
        PortState::PreMaster,
        PortState::Master,
        PortState::Passive,
        PortState::Uncalibrated,
        PortState::Slave,
    ];

    fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value).checked_sub(1)?).copied()
    }

    /// States in which the port takes part in the protocol
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            PortState::Initializing | PortState::Faulty | PortState::Disabled
        )
    }

    /// Compute the effect of `event` in this state.
    ///
    /// Returns `None` when the event is not accepted.
    pub fn transition(self, event: StateEvent) -> Option<Transition> {
        use PortState::*;
        use StateEvent::*;
        use Transition::*;

        let transition = match (self, event) {
            (_, PowerUp) => To(Initializing),
            (Faulty, FaultDetected) => Stay,
            (_, FaultDetected) => To(Faulty),
            (Disabled, DesignatedDisabled) => Stay,
            (_, DesignatedDisabled) => To(Disabled),

            (Initializing, Initialize) => To(Listening),
            (Faulty, FaultCleared) => To(Initializing),
            (Disabled, DesignatedEnabled) => To(Listening),

            (Listening | Passive | Uncalibrated | Slave, RsMaster | RsGrandMaster) => To(PreMaster),
            (PreMaster | Master, RsMaster | RsGrandMaster) => Stay,

            (Listening | PreMaster | Master | Passive, RsSlave) => To(Uncalibrated),
            (Uncalibrated | Slave, RsSlave) => Stay,

            (Passive, RsPassive) => Stay,
            (Listening | PreMaster | Master | Uncalibrated | Slave, RsPassive) => To(Passive),

            (PreMaster, QualificationTimeoutExpires) => To(Master),

            (Listening, AnnounceReceiptTimeout) => Stay,
            (Passive | Uncalibrated | Slave, AnnounceReceiptTimeout) => To(Listening),

            (Uncalibrated, SyncReceiptTimeout) => To(Listening),
            (Slave, SyncReceiptTimeout) => To(Uncalibrated),

            (Uncalibrated, MasterClockSelected) => To(Slave),

            _ => return None,
        };

        Some(transition)
    }
}

impl Display for PortState {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PortState::Initializing => "Initializing",
            PortState::Faulty => "Faulty",
            PortState::Disabled => "Disabled",
            PortState::Listening => "Listening",
            PortState::PreMaster => "PreMaster",
            PortState::Master => "Master",
            PortState::Passive => "Passive",
            PortState::Uncalibrated => "Uncalibrated",
            PortState::Slave => "Slave",
        };
        f.write_str(name)
    }
}

/// Events that drive the port state machine.
///
/// The `Rs*` events are the recommended states of the best master clock
/// algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateEvent {
    PowerUp,
    Initialize,
    FaultDetected,
    FaultCleared,
    DesignatedEnabled,
    DesignatedDisabled,
    RsMaster,
    RsGrandMaster,
    RsSlave,
    RsPassive,
    QualificationTimeoutExpires,
    AnnounceReceiptTimeout,
    SyncReceiptTimeout,
    MasterClockSelected,
}

/// An accepted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given state and run its entry actions
    To(PortState),
    /// Remain in the current state without side effects
    Stay,
}

/// A [`PortState`] that can be read without taking the port lock
#[derive(Debug)]
pub(crate) struct AtomicPortState(AtomicU8);

impl AtomicPortState {
    pub(crate) fn new(state: PortState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn load(&self) -> PortState {
        PortState::from_u8(self.0.load(Ordering::Acquire)).unwrap_or(PortState::Faulty)
    }

    pub(crate) fn store(&self, state: PortState) {
        self.0.store(state as u8, Ordering::Release);
    }
}
