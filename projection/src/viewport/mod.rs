pub mod base_viewport;
pub mod texture;
pub mod viewport;
pub mod viewport_config;

pub use base_viewport::{BaseViewport, DEFAULT_VIEW_PLANE_DISTANCE};
