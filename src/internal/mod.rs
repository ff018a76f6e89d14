//! Internal implementation details.

pub(crate) mod lock;
pub(crate) mod panic;

pub(crate) use lock::SlotCell;
pub(crate) use panic::catch_panic;
