use std::path::Path;

use glam::UVec2;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub size: UVec2,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load texture {path}: {message}")]
pub struct TextureError {
    pub path: String,
    pub message: String,
}

/// Image decoding and upload, provided by the windowing layer
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<Texture, TextureError>;
}

/// Masks and overlays drawn with a viewport's correction mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportTextures {
    pub overlay: Option<Texture>,
    pub blend_mask: Option<Texture>,
    pub black_level_mask: Option<Texture>,
}
