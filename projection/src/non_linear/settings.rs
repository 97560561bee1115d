use std::path::PathBuf;

use glam::{Quat, Vec3, Vec4};

use crate::{error::ConfigError, frustum::FrustumMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Cubic,
}

/// Offscreen rendering settings shared by every non-linear projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubemapSettings {
    pub resolution: u32,
    pub interpolation: Interpolation,
    pub clear_color: Vec4,
    pub use_depth_transformation: bool,
    pub stereo: bool,
    pub samples: u32,
    pub preferred_mono_frustum_mode: FrustumMode,
}

impl Default for CubemapSettings {
    fn default() -> Self {
        Self {
            resolution: 512,
            interpolation: Interpolation::Linear,
            clear_color: Vec4::new(0.3, 0.3, 0.3, 1.0),
            use_depth_transformation: false,
            stereo: false,
            samples: 1,
            preferred_mono_frustum_mode: FrustumMode::Mono,
        }
    }
}

impl CubemapSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution == 0 || self.samples == 0 {
            return Err(ConfigError::InvalidCubemap {
                resolution: self.resolution,
                samples: self.samples,
            });
        }
        Ok(())
    }
}

/// Number of cube faces a fisheye is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FisheyeMethod {
    /// Cube turned so the dome center lies on an edge. Covers at most a
    /// hemisphere.
    #[default]
    FourFace,
    FiveFace,
    SixFace,
}

impl FisheyeMethod {
    pub fn max_fov(&self) -> f32 {
        match self {
            FisheyeMethod::FourFace => 180.0,
            FisheyeMethod::FiveFace => 250.0,
            FisheyeMethod::SixFace => 360.0,
        }
    }
}

/// Fraction of the output cut from each side, in [0,1)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FisheyeCrop {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl FisheyeCrop {
    pub fn to_array(&self) -> [f32; 4] {
        [self.left, self.right, self.bottom, self.top]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FisheyeSettings {
    pub fov: f32,
    pub tilt: f32,
    pub diameter: f32,
    pub method: FisheyeMethod,
    pub crop: FisheyeCrop,
    pub offset: Vec3,
    pub cubemap: CubemapSettings,
}

impl Default for FisheyeSettings {
    fn default() -> Self {
        Self {
            fov: 180.0,
            tilt: 0.0,
            diameter: 14.8,
            method: FisheyeMethod::FourFace,
            crop: FisheyeCrop::default(),
            offset: Vec3::ZERO,
            cubemap: CubemapSettings::default(),
        }
    }
}

impl FisheyeSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov > 0.0) {
            return Err(ConfigError::InvalidFieldOfView { degrees: self.fov });
        }
        let max = self.method.max_fov();
        if self.fov > max {
            return Err(ConfigError::FisheyeFovTooWide { fov: self.fov, max });
        }
        validate_diameter(self.diameter)?;

        let crop = self.crop.to_array();
        let in_range = crop.iter().all(|value| (0.0..1.0).contains(value));
        if !in_range || self.crop.left + self.crop.right >= 1.0 || self.crop.bottom + self.crop.top >= 1.0 {
            return Err(ConfigError::InvalidCrop { crop });
        }
        self.cubemap.validate()
    }
}

/// Files holding the four spherical mirror warp meshes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MirrorMeshPaths {
    pub bottom: PathBuf,
    pub left: PathBuf,
    pub right: PathBuf,
    pub top: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphericalMirrorSettings {
    pub tilt: f32,
    pub diameter: f32,
    pub meshes: MirrorMeshPaths,
    pub cubemap: CubemapSettings,
}

impl Default for SphericalMirrorSettings {
    fn default() -> Self {
        Self {
            tilt: 0.0,
            diameter: 2.4,
            meshes: MirrorMeshPaths::default(),
            cubemap: CubemapSettings::default(),
        }
    }
}

impl SphericalMirrorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_diameter(self.diameter)?;
        self.cubemap.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpoutMapping {
    #[default]
    Fisheye,
    Equirectangular,
    Cubemap,
}

/// Which cube faces are rendered and shared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpoutChannels {
    pub right: bool,
    pub left: bool,
    pub bottom: bool,
    pub top: bool,
    pub front: bool,
    pub back: bool,
}

impl Default for SpoutChannels {
    fn default() -> Self {
        Self {
            right: true,
            left: true,
            bottom: true,
            top: true,
            front: true,
            back: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpoutSettings {
    pub mapping: SpoutMapping,
    pub mapping_name: String,
    pub channels: SpoutChannels,
    pub orientation: Quat,
    pub cubemap: CubemapSettings,
}

impl Default for SpoutSettings {
    fn default() -> Self {
        Self {
            mapping: SpoutMapping::Fisheye,
            mapping_name: "concord".to_string(),
            channels: SpoutChannels::default(),
            orientation: Quat::IDENTITY,
            cubemap: CubemapSettings::default(),
        }
    }
}

impl SpoutSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let channels = self.channels;
        let any = channels.right
            || channels.left
            || channels.bottom
            || channels.top
            || channels.front
            || channels.back;
        if !any {
            return Err(ConfigError::NoEnabledFaces);
        }
        self.cubemap.validate()
    }
}

fn validate_diameter(diameter: f32) -> Result<(), ConfigError> {
    if !(diameter > 0.0 && diameter.is_finite()) {
        return Err(ConfigError::InvalidDiameter { diameter });
    }
    Ok(())
}
