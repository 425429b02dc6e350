use crate::time::TimeInterval;

#[derive(Default, Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct InternalCurrentDS {
    pub(crate) steps_removed: u16,
    pub(crate) offset_from_master: TimeInterval,
    pub(crate) mean_path_delay: TimeInterval,
}
