pub mod frame_codec;
pub mod shared_data;
pub mod shared_value;
