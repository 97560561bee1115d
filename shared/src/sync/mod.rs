pub mod error;
pub mod frame_number;
pub mod payload;
pub mod phase;
pub mod shutdown;
pub mod swap_group;
