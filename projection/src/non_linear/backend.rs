//! Interface to the windowing / graphics collaborator that owns the GPU.
//!
//! Non-linear projections never touch a graphics API directly: they ask a
//! [`RenderBackend`] for offscreen targets, bind them while the application
//! draws each cube face, and finally describe a [`WarpPass`] that composes the
//! faces into the viewport.

use glam::{UVec2, Vec3, Vec4};
use thiserror::Error;

use crate::{correction::buffer::Buffer, frustum::FrustumMode, non_linear::cube_face::CubeFace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetResource {
    Color,
    Depth,
}

impl TargetResource {
    pub fn name(&self) -> &'static str {
        match self {
            TargetResource::Color => "color target",
            TargetResource::Depth => "depth target",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub resource: TargetResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Shader used to compose the faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Fisheye { cubic: bool, depth: bool },
    SphericalMirror,
    SpoutFisheye,
    SpoutEquirectangular,
    SpoutCubemap,
}

/// Offscreen targets one face renders into for one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceTarget {
    pub face: CubeFace,
    pub color: RenderTargetId,
    pub depth: Option<RenderTargetId>,
}

/// Parameters of the warp shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpUniforms {
    pub half_fov: f32,
    pub tilt: f32,
    /// left, right, bottom, top
    pub crop: [f32; 4],
    pub offset: Vec3,
    pub cubemap_resolution: u32,
    pub output_size: UVec2,
}

#[derive(Debug, Clone, Copy)]
pub struct WarpPass<'a> {
    pub shader: ShaderKind,
    pub eye: FrustumMode,
    pub sources: &'a [FaceTarget],
    /// Per-face warp meshes, in the order of `sources`. Empty when the shader
    /// draws a full-screen quad.
    pub meshes: &'a [&'a Buffer],
    pub clear_color: Vec4,
    pub uniforms: WarpUniforms,
}

pub trait RenderBackend {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId, BackendError>;

    fn release_render_target(&mut self, target: RenderTargetId);

    fn bind_render_target(&mut self, target: RenderTargetId, clear_color: Vec4);

    fn unbind_render_target(&mut self);

    /// Pending graphics error, if any, cleared by the call
    fn error_state(&mut self) -> Option<String>;

    fn draw_warp(&mut self, pass: &WarpPass<'_>);
}
