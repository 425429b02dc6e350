/// Describes upcoming leap seconds, carried in the header flags of Announce
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeapIndicator {
    #[default]
    /// No leap seconds will be added or removed on this UTC day.
    NoLeap,
    /// The last minute of the current UTC day contains 61 seconds.
    Leap61,
    /// The last minute of the current UTC day contains 59 seconds.
    Leap59,
}

impl LeapIndicator {
    pub(crate) fn from_flags(leap61: bool, leap59: bool) -> Self {
        match (leap61, leap59) {
            (true, false) => Self::Leap61,
            (false, true) => Self::Leap59,
            _ => Self::NoLeap,
        }
    }
}
