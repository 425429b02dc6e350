pub(crate) use current::InternalCurrentDS;
pub(crate) use default::InternalDefaultDS;
pub(crate) use parent::InternalParentDS;
pub use time_properties::TimePropertiesDS;

mod current;
mod default;
mod parent;
mod time_properties;
