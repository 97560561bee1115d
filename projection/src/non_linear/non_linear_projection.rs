use glam::{Quat, UVec2, Vec2, Vec3};
use log::{debug, error, info, warn};

use crate::{
    correction::{
        buffer::Buffer,
        correction_mesh::{CorrectionMesh, MeshFormat},
    },
    error::{ConfigError, ParseError, ProjectionError, ResourceError},
    frustum::{FrustumMode, Projection},
    non_linear::{
        backend::{
            FaceTarget, RenderBackend, RenderTargetDesc, RenderTargetId, ShaderKind, TargetResource,
            WarpPass, WarpUniforms,
        },
        cube_face::CubeFace,
        settings::{
            CubemapSettings, FisheyeMethod, FisheyeSettings, Interpolation, MirrorMeshPaths,
            SphericalMirrorSettings, SpoutMapping, SpoutSettings,
        },
    },
    user::{User, UserKey},
    viewport::BaseViewport,
};

const SPOUT_CUBE_RADIUS: f32 = 1.0;

/// Warp meshes of the four spherical mirror faces
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MirrorMeshes {
    pub bottom: Buffer,
    pub left: Buffer,
    pub right: Buffer,
    pub top: Buffer,
}

impl MirrorMeshes {
    /// Loads each face mesh, assuming Paul Bourke files when the extension
    /// is not recognized
    pub fn load(paths: &MirrorMeshPaths, position: Vec2, size: Vec2) -> Result<Self, ParseError> {
        let load = |path: &std::path::Path| -> Result<Buffer, ParseError> {
            let format = MeshFormat::detect(path, None).unwrap_or(MeshFormat::PaulBourke);
            Ok(CorrectionMesh::load(path, Some(format), position, size)?.buffer)
        };
        Ok(Self {
            bottom: load(&paths.bottom)?,
            left: load(&paths.left)?,
            right: load(&paths.right)?,
            top: load(&paths.top)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NonLinearKind {
    Fisheye(FisheyeSettings),
    SphericalMirror {
        settings: SphericalMirrorSettings,
        meshes: MirrorMeshes,
    },
    Spout(SpoutSettings),
}

impl NonLinearKind {
    pub fn cubemap(&self) -> &CubemapSettings {
        match self {
            NonLinearKind::Fisheye(settings) => &settings.cubemap,
            NonLinearKind::SphericalMirror { settings, .. } => &settings.cubemap,
            NonLinearKind::Spout(settings) => &settings.cubemap,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            NonLinearKind::Fisheye(settings) => settings.validate(),
            NonLinearKind::SphericalMirror { settings, .. } => settings.validate(),
            NonLinearKind::Spout(settings) => settings.validate(),
        }
    }

    /// Named faces, cube orientation, half-size and offset of the cube
    fn layout(&self) -> (Vec<(&'static str, CubeFace)>, Quat, f32, Vec3) {
        let named = |faces: &[CubeFace]| -> Vec<(&'static str, CubeFace)> {
            faces.iter().map(|face| (face.name(), *face)).collect()
        };
        match self {
            NonLinearKind::Fisheye(settings) => {
                let (faces, base_angle): (Vec<_>, f32) = match settings.method {
                    FisheyeMethod::FourFace => (
                        named(&[CubeFace::Front, CubeFace::Top, CubeFace::Left, CubeFace::Right]),
                        45.0,
                    ),
                    FisheyeMethod::FiveFace => (
                        named(&[
                            CubeFace::Front,
                            CubeFace::Top,
                            CubeFace::Bottom,
                            CubeFace::Left,
                            CubeFace::Right,
                        ]),
                        90.0,
                    ),
                    FisheyeMethod::SixFace => (named(&CubeFace::ALL), 90.0),
                };
                let orientation = Quat::from_rotation_x((base_angle - settings.tilt).to_radians());
                (faces, orientation, settings.diameter * 0.5, settings.offset)
            }
            NonLinearKind::SphericalMirror { settings, .. } => {
                // the mirror's lower image comes from the cube face nearest the horizon
                let faces = vec![
                    ("bottom", CubeFace::Front),
                    ("left", CubeFace::Left),
                    ("right", CubeFace::Right),
                    ("top", CubeFace::Top),
                ];
                let orientation = Quat::from_rotation_x((45.0 - settings.tilt).to_radians());
                (faces, orientation, settings.diameter * 0.5, Vec3::ZERO)
            }
            NonLinearKind::Spout(settings) => {
                let channels = settings.channels;
                let enabled = [
                    (CubeFace::Right, channels.right),
                    (CubeFace::Left, channels.left),
                    (CubeFace::Bottom, channels.bottom),
                    (CubeFace::Top, channels.top),
                    (CubeFace::Front, channels.front),
                    (CubeFace::Back, channels.back),
                ];
                let faces = enabled
                    .iter()
                    .filter(|(_, enabled)| *enabled)
                    .map(|(face, _)| (face.name(), *face))
                    .collect();
                (faces, settings.orientation, SPOUT_CUBE_RADIUS, Vec3::ZERO)
            }
        }
    }

    fn shader(&self) -> ShaderKind {
        match self {
            NonLinearKind::Fisheye(settings) => ShaderKind::Fisheye {
                cubic: settings.cubemap.interpolation == Interpolation::Cubic,
                depth: settings.cubemap.use_depth_transformation,
            },
            NonLinearKind::SphericalMirror { .. } => ShaderKind::SphericalMirror,
            NonLinearKind::Spout(settings) => match settings.mapping {
                SpoutMapping::Fisheye => ShaderKind::SpoutFisheye,
                SpoutMapping::Equirectangular => ShaderKind::SpoutEquirectangular,
                SpoutMapping::Cubemap => ShaderKind::SpoutCubemap,
            },
        }
    }
}

/// What the application needs to draw one face
#[derive(Debug, Clone, Copy)]
pub struct FaceView {
    pub name: &'static str,
    pub face: CubeFace,
    pub eye: FrustumMode,
    pub target: FaceTarget,
    pub projection: Projection,
}

#[derive(Debug, Clone)]
struct FaceSlot {
    name: &'static str,
    face: CubeFace,
    viewport: BaseViewport,
    targets: [Option<FaceTarget>; 2],
}

/// Renders the scene into several cube faces and warps them into one viewport
#[derive(Debug, Clone)]
pub struct NonLinearProjection {
    kind: NonLinearKind,
    faces: Vec<FaceSlot>,
    output_size: UVec2,
    initialized: bool,
}

impl NonLinearProjection {
    pub fn new(kind: NonLinearKind, user: UserKey) -> Result<Self, ConfigError> {
        kind.validate()?;

        let (named_faces, orientation, radius, offset) = kind.layout();
        let mut faces = Vec::with_capacity(named_faces.len());
        for (name, face) in named_faces {
            let mut viewport = BaseViewport::new(Vec2::ZERO, Vec2::ONE, user)?;
            viewport.set_plane(face.plane(radius, orientation, offset)?);
            faces.push(FaceSlot {
                name,
                face,
                viewport,
                targets: [None; 2],
            });
        }
        debug!("Non-linear projection with {} faces", faces.len());

        Ok(Self {
            kind,
            faces,
            output_size: UVec2::ZERO,
            initialized: false,
        })
    }

    pub fn kind(&self) -> &NonLinearKind {
        &self.kind
    }

    pub fn cubemap(&self) -> &CubemapSettings {
        self.kind.cubemap()
    }

    /// Replaces the warp meshes of a spherical mirror. Returns false for
    /// other kinds.
    pub fn set_mirror_meshes(&mut self, loaded: MirrorMeshes) -> bool {
        match &mut self.kind {
            NonLinearKind::SphericalMirror { meshes, .. } => {
                *meshes = loaded;
                true
            }
            _ => false,
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn faces(&self) -> impl Iterator<Item = (&'static str, CubeFace)> + '_ {
        self.faces.iter().map(|slot| (slot.name, slot.face))
    }

    pub fn output_size(&self) -> UVec2 {
        self.output_size
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Eyes rendered every frame
    pub fn eyes(&self) -> &'static [FrustumMode] {
        let cubemap = self.cubemap();
        if cubemap.stereo {
            return &[FrustumMode::StereoLeft, FrustumMode::StereoRight];
        }
        match cubemap.preferred_mono_frustum_mode {
            FrustumMode::Mono => &[FrustumMode::Mono],
            FrustumMode::StereoLeft => &[FrustumMode::StereoLeft],
            FrustumMode::StereoRight => &[FrustumMode::StereoRight],
        }
    }

    /// Allocates one color target per face and eye, plus depth targets when
    /// depth transformation is enabled. Nothing stays allocated on failure.
    pub fn initialize(&mut self, backend: &mut dyn RenderBackend) -> Result<(), ResourceError> {
        if self.initialized {
            return Ok(());
        }

        let mut created = Vec::new();
        if let Err(error) = self.allocate_targets(backend, &mut created) {
            error!("{}", error);
            for target in created {
                backend.release_render_target(target);
            }
            for slot in &mut self.faces {
                slot.targets = [None; 2];
            }
            return Err(error);
        }

        self.initialized = true;
        info!(
            "Allocated {} render targets for {} faces at {}x{}",
            created.len(),
            self.faces.len(),
            self.cubemap().resolution,
            self.cubemap().resolution
        );
        Ok(())
    }

    fn allocate_targets(
        &mut self,
        backend: &mut dyn RenderBackend,
        created: &mut Vec<RenderTargetId>,
    ) -> Result<(), ResourceError> {
        let cubemap = *self.kind.cubemap();
        let eye_slots = if cubemap.stereo { 2 } else { 1 };

        for slot in &mut self.faces {
            for eye_slot in 0..eye_slots {
                let mut allocate = |resource: TargetResource| {
                    let desc = RenderTargetDesc {
                        width: cubemap.resolution,
                        height: cubemap.resolution,
                        samples: cubemap.samples,
                        resource,
                    };
                    let target = backend
                        .create_render_target(&desc)
                        .map_err(|error| ResourceError {
                            face: slot.name,
                            resource: resource.name(),
                            reason: error.message,
                        })?;
                    created.push(target);
                    Ok::<_, ResourceError>(target)
                };

                let color = allocate(TargetResource::Color)?;
                let depth = if cubemap.use_depth_transformation {
                    Some(allocate(TargetResource::Depth)?)
                } else {
                    None
                };
                slot.targets[eye_slot] = Some(FaceTarget {
                    face: slot.face,
                    color,
                    depth,
                });
            }
        }
        Ok(())
    }

    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        for slot in &mut self.faces {
            for target in slot.targets.iter_mut().filter_map(Option::take) {
                backend.release_render_target(target.color);
                if let Some(depth) = target.depth {
                    backend.release_render_target(depth);
                }
            }
        }
        self.initialized = false;
    }

    /// Records the viewport's pixel size. A change drops every face frustum
    /// so the next frame recomputes them.
    pub fn update(&mut self, size: UVec2) -> bool {
        if size == self.output_size {
            return false;
        }
        debug!("Non-linear projection resized to {}x{}", size.x, size.y);
        self.output_size = size;
        for slot in &mut self.faces {
            slot.viewport.invalidate();
        }
        true
    }

    pub fn update_frustums(
        &mut self,
        mode: FrustumMode,
        user: &User,
        near: f32,
        far: f32,
    ) -> Result<(), ConfigError> {
        for slot in &mut self.faces {
            slot.viewport.calculate_non_linear_frustum(mode, user, near, far)?;
        }
        Ok(())
    }

    pub fn face_projection(&self, face: CubeFace, mode: FrustumMode) -> Option<&Projection> {
        self.faces
            .iter()
            .find(|slot| slot.face == face)
            .and_then(|slot| slot.viewport.cached_projection(mode))
    }

    /// Draws every face for one eye into its offscreen target
    pub fn render_cubemap(
        &mut self,
        backend: &mut dyn RenderBackend,
        mode: FrustumMode,
        user: &User,
        near: f32,
        far: f32,
        scene: &mut dyn FnMut(&FaceView),
    ) -> Result<usize, ProjectionError> {
        let cubemap = *self.kind.cubemap();
        let eye_slot = self.eye_slot(mode);

        let mut rendered = 0;
        for slot in &mut self.faces {
            let target = slot.targets[eye_slot].ok_or_else(|| not_allocated(slot.name))?;
            let projection = slot.viewport.calculate_non_linear_frustum(mode, user, near, far)?;

            backend.bind_render_target(target.color, cubemap.clear_color);
            scene(&FaceView {
                name: slot.name,
                face: slot.face,
                eye: mode,
                target,
                projection,
            });
            if let Some(message) = backend.error_state() {
                warn!("Graphics error while rendering {} face: {}", slot.name, message);
            }
            backend.unbind_render_target();
            rendered += 1;
        }
        Ok(rendered)
    }

    /// Composes the faces of one eye into the viewport
    pub fn render(&self, backend: &mut dyn RenderBackend, mode: FrustumMode) -> Result<(), ResourceError> {
        let eye_slot = self.eye_slot(mode);
        let sources = self
            .faces
            .iter()
            .map(|slot| slot.targets[eye_slot].ok_or_else(|| not_allocated(slot.name)))
            .collect::<Result<Vec<_>, _>>()?;

        let meshes: Vec<&Buffer> = match &self.kind {
            NonLinearKind::SphericalMirror { meshes, .. } => {
                vec![&meshes.bottom, &meshes.left, &meshes.right, &meshes.top]
            }
            _ => Vec::new(),
        };

        let cubemap = self.kind.cubemap();
        let uniforms = match &self.kind {
            NonLinearKind::Fisheye(settings) => WarpUniforms {
                half_fov: (settings.fov * 0.5).to_radians(),
                tilt: settings.tilt.to_radians(),
                crop: settings.crop.to_array(),
                offset: settings.offset,
                cubemap_resolution: cubemap.resolution,
                output_size: self.output_size,
            },
            NonLinearKind::SphericalMirror { settings, .. } => WarpUniforms {
                half_fov: 90f32.to_radians(),
                tilt: settings.tilt.to_radians(),
                crop: [0.0; 4],
                offset: Vec3::ZERO,
                cubemap_resolution: cubemap.resolution,
                output_size: self.output_size,
            },
            NonLinearKind::Spout(_) => WarpUniforms {
                half_fov: 90f32.to_radians(),
                tilt: 0.0,
                crop: [0.0; 4],
                offset: Vec3::ZERO,
                cubemap_resolution: cubemap.resolution,
                output_size: self.output_size,
            },
        };

        backend.draw_warp(&WarpPass {
            shader: self.kind.shader(),
            eye: mode,
            sources: &sources,
            meshes: &meshes,
            clear_color: cubemap.clear_color,
            uniforms,
        });
        if let Some(message) = backend.error_state() {
            warn!("Graphics error during warp pass: {}", message);
        }
        Ok(())
    }

    /// Renders and composes every eye. Returns the number of face renders.
    pub fn render_frame(
        &mut self,
        backend: &mut dyn RenderBackend,
        user: &User,
        near: f32,
        far: f32,
        scene: &mut dyn FnMut(&FaceView),
    ) -> Result<usize, ProjectionError> {
        let mut rendered = 0;
        for mode in self.eyes() {
            rendered += self.render_cubemap(backend, *mode, user, near, far, scene)?;
            self.render(backend, *mode)?;
        }
        Ok(rendered)
    }

    fn eye_slot(&self, mode: FrustumMode) -> usize {
        if self.cubemap().stereo && mode == FrustumMode::StereoRight {
            1
        } else {
            0
        }
    }
}

fn not_allocated(face: &'static str) -> ResourceError {
    ResourceError {
        face,
        resource: TargetResource::Color.name(),
        reason: "render target not allocated".to_string(),
    }
}
