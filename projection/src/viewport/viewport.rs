use std::path::{Path, PathBuf};

use glam::Quat;
use log::{info, warn};

use crate::{
    correction::{
        buffer::Buffer,
        correction_mesh::{CorrectionMesh, MeshFormat},
    },
    error::{ConfigError, ProjectionError, ResourceError},
    frustum::{FrustumMode, Projection},
    non_linear::{
        backend::RenderBackend,
        non_linear_projection::{MirrorMeshes, NonLinearKind, NonLinearProjection},
    },
    plane::ProjectionPlane,
    user::{User, UserKey, UserRegistry},
    viewport::{
        base_viewport::{BaseViewport, DEFAULT_VIEW_PLANE_DISTANCE},
        texture::{Texture, TextureLoader, ViewportTextures},
        viewport_config::{MpcdiMeshSource, PlanarGeometry, ProjectionConfig, ViewportConfig},
    },
};

/// Where a viewport's correction mesh comes from
#[derive(Debug, Clone, PartialEq)]
enum MeshSource {
    Quad,
    File(PathBuf),
    SciSS(PathBuf),
    Mpcdi(MpcdiMeshSource),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct TexturePaths {
    overlay: Option<PathBuf>,
    blend_mask: Option<PathBuf>,
    black_level_mask: Option<PathBuf>,
}

/// A configured viewport: its rectangle and plane, the mesh that warps it onto
/// the display and an optional non-linear projection
#[derive(Debug, Clone)]
pub struct Viewport {
    base: BaseViewport,
    name: Option<String>,
    tracked: bool,
    mesh_hint: Option<MeshFormat>,
    mesh_source: MeshSource,
    mesh: Buffer,
    mesh_format: Option<MeshFormat>,
    non_linear: Option<NonLinearProjection>,
    texture_paths: TexturePaths,
    textures: ViewportTextures,
}

impl Viewport {
    pub fn from_config(config: &ViewportConfig, users: &UserRegistry) -> Result<Self, ProjectionError> {
        let user = users.resolve(config.user.as_deref())?;
        let mut base = BaseViewport::new(config.position, config.size, user)?;
        base.set_eye(config.eye);
        base.set_enabled(config.enabled);

        let mesh_hint = config
            .mesh_hint
            .as_deref()
            .map(str::parse::<MeshFormat>)
            .transpose()?;

        let mut mesh_source = match &config.correction_mesh {
            Some(path) => MeshSource::File(path.clone()),
            None => MeshSource::Quad,
        };
        let mut non_linear = None;

        match &config.projection {
            ProjectionConfig::Planar(planar) => {
                match planar.geometry {
                    PlanarGeometry::FieldOfView {
                        fov,
                        orientation,
                        distance,
                    } => base.set_view_plane_coords_using_fovs(
                        fov.up,
                        fov.down,
                        fov.left,
                        fov.right,
                        orientation,
                        distance,
                    )?,
                    PlanarGeometry::Corners {
                        lower_left,
                        upper_left,
                        upper_right,
                    } => base.set_plane(ProjectionPlane::new(lower_left, upper_left, upper_right)?),
                }
                if let Some(offset) = planar.offset {
                    base.set_plane_offset(offset)?;
                }
            }
            ProjectionConfig::Fisheye(settings) => {
                non_linear = Some(NonLinearProjection::new(
                    NonLinearKind::Fisheye(settings.clone()),
                    user,
                )?);
            }
            ProjectionConfig::SphericalMirror(settings) => {
                non_linear = Some(NonLinearProjection::new(
                    NonLinearKind::SphericalMirror {
                        settings: settings.clone(),
                        meshes: MirrorMeshes::default(),
                    },
                    user,
                )?);
            }
            ProjectionConfig::SpoutOutput(settings) => {
                non_linear = Some(NonLinearProjection::new(
                    NonLinearKind::Spout(settings.clone()),
                    user,
                )?);
            }
            ProjectionConfig::SciSSMesh { path } => {
                mesh_source = MeshSource::SciSS(path.clone());
            }
            ProjectionConfig::MpcdiMesh(mpcdi) => {
                base.set_view_plane_coords_using_fovs(
                    mpcdi.fov.up,
                    mpcdi.fov.down,
                    mpcdi.fov.left,
                    mpcdi.fov.right,
                    mpcdi.orientation.unwrap_or(Quat::IDENTITY),
                    mpcdi.distance.unwrap_or(DEFAULT_VIEW_PLANE_DISTANCE),
                )?;
                if let Some(offset) = mpcdi.offset {
                    base.set_plane_offset(offset)?;
                }
                mesh_source = MeshSource::Mpcdi(mpcdi.mesh.clone());
            }
        }

        let mesh = Buffer::quad(base.position(), base.size());
        Ok(Self {
            base,
            name: config.name.clone(),
            tracked: config.tracked,
            mesh_hint,
            mesh_source,
            mesh,
            mesh_format: None,
            non_linear,
            texture_paths: TexturePaths {
                overlay: config.overlay_texture.clone(),
                blend_mask: config.blend_mask_texture.clone(),
                black_level_mask: config.black_level_mask_texture.clone(),
            },
            textures: ViewportTextures::default(),
        })
    }

    /// Loads textures and meshes. A texture that fails to load is skipped
    /// with a warning; a mesh that fails to load is an error.
    pub fn load_resources(
        &mut self,
        users: &mut UserRegistry,
        textures: &mut dyn TextureLoader,
    ) -> Result<(), ProjectionError> {
        self.textures = ViewportTextures {
            overlay: load_texture(textures, self.texture_paths.overlay.as_deref()),
            blend_mask: load_texture(textures, self.texture_paths.blend_mask.as_deref()),
            black_level_mask: load_texture(textures, self.texture_paths.black_level_mask.as_deref()),
        };

        let position = self.base.position();
        let size = self.base.size();
        let loaded = match &self.mesh_source {
            MeshSource::Quad => None,
            MeshSource::File(path) => Some(CorrectionMesh::load(path, self.mesh_hint, position, size)?),
            MeshSource::SciSS(path) => Some(CorrectionMesh::load(
                path,
                Some(MeshFormat::SciSS),
                position,
                size,
            )?),
            MeshSource::Mpcdi(MpcdiMeshSource::File(path)) => Some(CorrectionMesh::load(
                path,
                Some(MeshFormat::Mpcdi),
                position,
                size,
            )?),
            MeshSource::Mpcdi(MpcdiMeshSource::Inline(bytes)) => Some(CorrectionMesh::from_bytes(
                MeshFormat::Mpcdi,
                bytes,
                position,
                size,
            )?),
        };

        if let Some(mesh) = loaded {
            if let Some(view) = mesh.view {
                let user = user_mut(users, self.base.user())?;
                view.apply(&mut self.base, user)?;
            }
            info!(
                "Viewport {} uses {:?} mesh with {} vertices",
                self.name.as_deref().unwrap_or("<unnamed>"),
                mesh.format,
                mesh.buffer.vertex_count()
            );
            self.mesh_format = Some(mesh.format);
            self.mesh = mesh.buffer;
        }

        if let Some(non_linear) = &mut self.non_linear {
            if let NonLinearKind::SphericalMirror { settings, .. } = non_linear.kind() {
                let meshes = MirrorMeshes::load(&settings.meshes, position, size)?;
                non_linear.set_mirror_meshes(meshes);
            }
        }
        Ok(())
    }

    pub fn initialize_non_linear(&mut self, backend: &mut dyn RenderBackend) -> Result<(), ResourceError> {
        match &mut self.non_linear {
            Some(non_linear) => non_linear.initialize(backend),
            None => Ok(()),
        }
    }

    pub fn calculate_frustum(
        &mut self,
        mode: FrustumMode,
        users: &UserRegistry,
        near: f32,
        far: f32,
    ) -> Result<Projection, ConfigError> {
        let user = user_ref(users, self.base.user())?;
        self.base.calculate_frustum(mode, user, near, far)
    }

    pub fn base(&self) -> &BaseViewport {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut BaseViewport {
        &mut self.base
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    /// Correction mesh, or the viewport quad when none is configured
    pub fn mesh(&self) -> &Buffer {
        &self.mesh
    }

    pub fn mesh_format(&self) -> Option<MeshFormat> {
        self.mesh_format
    }

    pub fn non_linear(&self) -> Option<&NonLinearProjection> {
        self.non_linear.as_ref()
    }

    pub fn non_linear_mut(&mut self) -> Option<&mut NonLinearProjection> {
        self.non_linear.as_mut()
    }

    pub fn textures(&self) -> &ViewportTextures {
        &self.textures
    }
}

fn load_texture(loader: &mut dyn TextureLoader, path: Option<&Path>) -> Option<Texture> {
    let path = path?;
    match loader.load_texture(path) {
        Ok(texture) => Some(texture),
        Err(error) => {
            warn!("{}", error);
            None
        }
    }
}

fn user_ref(users: &UserRegistry, key: UserKey) -> Result<&User, ConfigError> {
    users.get(key).ok_or_else(|| unknown_key(key))
}

fn user_mut(users: &mut UserRegistry, key: UserKey) -> Result<&mut User, ConfigError> {
    users.get_mut(key).ok_or_else(|| unknown_key(key))
}

fn unknown_key(key: UserKey) -> ConfigError {
    ConfigError::UnknownUser {
        name: format!("{:?}", key),
    }
}
