//! Best master clock algorithm

pub(crate) mod bmca;
pub(crate) mod dataset_comparison;
pub(crate) mod foreign_master;
