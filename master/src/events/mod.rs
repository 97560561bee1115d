pub(crate) mod master_events;

pub use master_events::*;
