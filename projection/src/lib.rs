//! # Concord Projection
//! Projection planes and per-eye frustums, correction-mesh loaders and the
//! non-linear projections (fisheye, spherical mirror, spout output) a render
//! node draws its viewports through.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod correction;
mod error;
mod frustum;
mod non_linear;
mod plane;
mod user;
mod viewport;

pub use correction::{
    buffer::{Buffer, GeometryType, Vertex},
    correction_mesh::{CorrectionMesh, MeshFormat},
    mpcdi::{PfmEntry, PfmGrid, PFM_FORMAT_TAG},
    paul_bourke::{BourkeVertex, PaulBourkeMesh},
    sciss::{SciSSFile, SciSSMapping, SciSSVertex, SciSSViewData, SCISS_FILE_ID},
    simcad::SimCadWarp,
};
pub use error::{ConfigError, MeshSection, ParseError, ProjectionError, ResourceError};
pub use frustum::{Frustum, FrustumMode, Projection};
pub use non_linear::{
    backend::{
        BackendError, FaceTarget, RenderBackend, RenderTargetDesc, RenderTargetId, ShaderKind,
        TargetResource, WarpPass, WarpUniforms,
    },
    cube_face::CubeFace,
    non_linear_projection::{FaceView, MirrorMeshes, NonLinearKind, NonLinearProjection},
    settings::{
        CubemapSettings, FisheyeCrop, FisheyeMethod, FisheyeSettings, Interpolation,
        MirrorMeshPaths, SphericalMirrorSettings, SpoutChannels, SpoutMapping, SpoutSettings,
    },
};
pub use plane::ProjectionPlane;
pub use user::{User, UserKey, UserRegistry, DEFAULT_EYE_SEPARATION, DEFAULT_USER_NAME};
pub use viewport::{
    base_viewport::{BaseViewport, DEFAULT_VIEW_PLANE_DISTANCE},
    texture::{Texture, TextureError, TextureHandle, TextureLoader, ViewportTextures},
    viewport::Viewport,
    viewport_config::{
        FovSettings, MpcdiMeshSource, MpcdiProjection, PlanarGeometry, PlanarProjection,
        ProjectionConfig, ViewportConfig,
    },
};
