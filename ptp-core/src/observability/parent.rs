use crate::{
    config::{ClockIdentity, ClockQuality, PortIdentity},
    datastructures::datasets::InternalParentDS,
};

/// Which master a port follows and which grandmaster is at the top of the
/// tree, as last learned from an Announce.
///
/// A port that is not following anyone reports its own clock here, with
/// port number 0 as parent. Parent statistics are not kept.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentDS {
    /// Port the Sync and Announce messages come from
    pub parent_port_identity: PortIdentity,
    pub grandmaster_identity: ClockIdentity,
    pub grandmaster_clock_quality: ClockQuality,
    pub grandmaster_priority_1: u8,
    pub grandmaster_priority_2: u8,
}

impl From<&InternalParentDS> for ParentDS {
    fn from(parent: &InternalParentDS) -> Self {
        let InternalParentDS {
            parent_port_identity,
            grandmaster_identity,
            grandmaster_clock_quality,
            grandmaster_priority_1,
            grandmaster_priority_2,
        } = *parent;

        Self {
            parent_port_identity,
            grandmaster_identity,
            grandmaster_clock_quality,
            grandmaster_priority_1,
            grandmaster_priority_2,
        }
    }
}
