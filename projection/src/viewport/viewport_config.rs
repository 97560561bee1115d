use std::path::PathBuf;

use glam::{Quat, Vec2, Vec3};

use crate::{
    frustum::FrustumMode,
    non_linear::settings::{FisheyeSettings, SphericalMirrorSettings, SpoutSettings},
    plane::ProjectionPlane,
    viewport::base_viewport::DEFAULT_VIEW_PLANE_DISTANCE,
};

/// Signed field-of-view angles in degrees. Left and down are negative for a
/// plane centered on the view direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovSettings {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for FovSettings {
    fn default() -> Self {
        Self {
            up: 30.0,
            down: -30.0,
            left: -40.0,
            right: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanarGeometry {
    FieldOfView {
        fov: FovSettings,
        orientation: Quat,
        distance: f32,
    },
    Corners {
        lower_left: Vec3,
        upper_left: Vec3,
        upper_right: Vec3,
    },
}

impl Default for PlanarGeometry {
    fn default() -> Self {
        let plane = ProjectionPlane::default();
        PlanarGeometry::Corners {
            lower_left: plane.lower_left(),
            upper_left: plane.upper_left(),
            upper_right: plane.upper_right(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanarProjection {
    pub geometry: PlanarGeometry,
    pub offset: Option<Vec3>,
}

impl PlanarProjection {
    pub fn from_fov(fov: FovSettings) -> Self {
        Self {
            geometry: PlanarGeometry::FieldOfView {
                fov,
                orientation: Quat::IDENTITY,
                distance: DEFAULT_VIEW_PLANE_DISTANCE,
            },
            offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MpcdiMeshSource {
    File(PathBuf),
    /// PFM bytes extracted from an MPCDI container
    Inline(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MpcdiProjection {
    pub fov: FovSettings,
    pub orientation: Option<Quat>,
    pub distance: Option<f32>,
    pub offset: Option<Vec3>,
    pub mesh: MpcdiMeshSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionConfig {
    Planar(PlanarProjection),
    Fisheye(FisheyeSettings),
    SphericalMirror(SphericalMirrorSettings),
    SpoutOutput(SpoutSettings),
    SciSSMesh { path: PathBuf },
    MpcdiMesh(MpcdiProjection),
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig::Planar(PlanarProjection::default())
    }
}

/// Viewport section of a node configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub name: Option<String>,
    /// Resolved against the user registry; `None` is the default user
    pub user: Option<String>,
    pub position: Vec2,
    pub size: Vec2,
    pub eye: FrustumMode,
    pub enabled: bool,
    pub tracked: bool,
    pub overlay_texture: Option<PathBuf>,
    pub blend_mask_texture: Option<PathBuf>,
    pub black_level_mask_texture: Option<PathBuf>,
    pub correction_mesh: Option<PathBuf>,
    /// One of `sciss`, `mpcdi`, `pfm`, `bourke` or `simcad`
    pub mesh_hint: Option<String>,
    pub projection: ProjectionConfig,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            name: None,
            user: None,
            position: Vec2::ZERO,
            size: Vec2::ONE,
            eye: FrustumMode::Mono,
            enabled: true,
            tracked: false,
            overlay_texture: None,
            blend_mask_texture: None,
            black_level_mask_texture: None,
            correction_mesh: None,
            mesh_hint: None,
            projection: ProjectionConfig::default(),
        }
    }
}
