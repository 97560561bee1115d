use glam::{Mat4, Vec3, Vec4};

use crate::{error::ConfigError, plane::ProjectionPlane};

const EYE_ON_PLANE_EPSILON: f32 = 1e-6;

/// Which eye a frustum is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrustumMode {
    #[default]
    Mono,
    StereoLeft,
    StereoRight,
}

impl FrustumMode {
    pub const ALL: [FrustumMode; 3] = [
        FrustumMode::Mono,
        FrustumMode::StereoLeft,
        FrustumMode::StereoRight,
    ];

    pub fn index(&self) -> usize {
        match self {
            FrustumMode::Mono => 0,
            FrustumMode::StereoLeft => 1,
            FrustumMode::StereoRight => 2,
        }
    }

    pub fn is_stereo(&self) -> bool {
        !matches!(self, FrustumMode::Mono)
    }
}

/// Off-axis frustum bounds at the near plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// OpenGL-style off-axis projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        let Frustum {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;

        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new(
                (r + l) / (r - l),
                (t + b) / (t - b),
                -(f + n) / (f - n),
                -1.0,
            ),
            Vec4::new(0.0, 0.0, -2.0 * f * n / (f - n), 0.0),
        )
    }
}

/// Frustum plus the matrices derived from it for one eye and one plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    frustum: Frustum,
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
}

impl Projection {
    /// Computes the frustum through `plane` as seen from `eye`. When `offset` is
    /// set the eye is shifted by it first, which is how non-linear faces place
    /// stereo eyes around a shared mono base.
    pub fn calculate(
        plane: &ProjectionPlane,
        eye: Vec3,
        offset: Option<Vec3>,
        near: f32,
        far: f32,
    ) -> Result<Self, ConfigError> {
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(ConfigError::InvalidClipPlanes { near, far });
        }

        let basis = plane.basis()?;
        let eye = eye + offset.unwrap_or(Vec3::ZERO);

        let lower_left = basis * plane.lower_left();
        let upper_right = basis * plane.upper_right();
        let local_eye = basis * eye;

        // positive when the eye sits on the side the plane faces
        let distance = local_eye.z - lower_left.z;
        if distance.abs() < EYE_ON_PLANE_EPSILON {
            return Err(ConfigError::EyeOnPlane { distance });
        }
        if distance < 0.0 {
            return Err(ConfigError::EyeBehindPlane { distance });
        }
        let near_factor = near / distance;

        let frustum = Frustum {
            left: (lower_left.x - local_eye.x) * near_factor,
            right: (upper_right.x - local_eye.x) * near_factor,
            bottom: (lower_left.y - local_eye.y) * near_factor,
            top: (upper_right.y - local_eye.y) * near_factor,
            near,
            far,
        };

        let view = Mat4::from_mat3(basis) * Mat4::from_translation(-eye);
        let projection = frustum.projection_matrix();

        Ok(Self {
            frustum,
            view,
            projection,
            view_projection: projection * view,
        })
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection
    }
}
