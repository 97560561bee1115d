use glam::{Quat, Vec2, Vec3};

use crate::{
    error::ConfigError,
    frustum::{FrustumMode, Projection},
    plane::ProjectionPlane,
    user::{User, UserKey},
};

pub const DEFAULT_VIEW_PLANE_DISTANCE: f32 = 10.0;
const RECT_EPSILON: f32 = 1e-5;

/// Inputs a cached projection was computed from
#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedProjection {
    eye: Vec3,
    offset: Option<Vec3>,
    near: f32,
    far: f32,
    projection: Projection,
}

/// Corners of the view plane before rotation and offset are applied
#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewPlaneCorners {
    lower_left: Vec3,
    upper_left: Vec3,
    upper_right: Vec3,
}

/// Rectangle of a window plus the projection plane it renders through.
/// Shared by top-level viewports and the faces of non-linear projections.
#[derive(Debug, Clone)]
pub struct BaseViewport {
    position: Vec2,
    size: Vec2,
    eye: FrustumMode,
    user: UserKey,
    enabled: bool,
    plane: ProjectionPlane,
    corners: ViewPlaneCorners,
    rotation: Quat,
    plane_offset: Vec3,
    projections: [Option<CachedProjection>; 3],
}

impl BaseViewport {
    pub fn new(position: Vec2, size: Vec2, user: UserKey) -> Result<Self, ConfigError> {
        validate_rect(position, size)?;
        let plane = ProjectionPlane::default();
        Ok(Self {
            position,
            size,
            eye: FrustumMode::Mono,
            user,
            enabled: true,
            plane,
            corners: ViewPlaneCorners {
                lower_left: plane.lower_left(),
                upper_left: plane.upper_left(),
                upper_right: plane.upper_right(),
            },
            rotation: Quat::IDENTITY,
            plane_offset: Vec3::ZERO,
            projections: [None; 3],
        })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_rect(&mut self, position: Vec2, size: Vec2) -> Result<(), ConfigError> {
        validate_rect(position, size)?;
        self.position = position;
        self.size = size;
        Ok(())
    }

    pub fn eye(&self) -> FrustumMode {
        self.eye
    }

    pub fn set_eye(&mut self, eye: FrustumMode) {
        self.eye = eye;
    }

    pub fn user(&self) -> UserKey {
        self.user
    }

    pub fn set_user(&mut self, user: UserKey) {
        self.user = user;
        self.invalidate();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn plane(&self) -> &ProjectionPlane {
        &self.plane
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Uses explicit corners. Rotation and offset are reset.
    pub fn set_plane(&mut self, plane: ProjectionPlane) {
        self.corners = ViewPlaneCorners {
            lower_left: plane.lower_left(),
            upper_left: plane.upper_left(),
            upper_right: plane.upper_right(),
        };
        self.rotation = Quat::IDENTITY;
        self.plane_offset = Vec3::ZERO;
        self.plane = plane;
        self.invalidate();
    }

    /// Translates the projection plane. Survives later FOV changes.
    pub fn set_plane_offset(&mut self, offset: Vec3) -> Result<(), ConfigError> {
        self.plane_offset = offset;
        self.rebuild_plane()
    }

    /// Builds the plane from signed field-of-view angles in degrees. Left and
    /// down are negative for a plane centered on the view direction.
    pub fn set_view_plane_coords_using_fovs(
        &mut self,
        up: f32,
        down: f32,
        left: f32,
        right: f32,
        rotation: Quat,
        distance: f32,
    ) -> Result<(), ConfigError> {
        for degrees in [up, down, left, right] {
            if !(degrees.abs() < 90.0) {
                return Err(ConfigError::InvalidFieldOfView { degrees });
            }
        }
        if up <= down {
            return Err(ConfigError::InvalidFieldOfView { degrees: up - down });
        }
        if right <= left {
            return Err(ConfigError::InvalidFieldOfView {
                degrees: right - left,
            });
        }
        if !(distance > 0.0 && distance.is_finite()) {
            return Err(ConfigError::InvalidDistance { distance });
        }

        let tan = |degrees: f32| distance * degrees.to_radians().tan();
        self.corners = ViewPlaneCorners {
            lower_left: Vec3::new(tan(left), tan(down), -distance),
            upper_left: Vec3::new(tan(left), tan(up), -distance),
            upper_right: Vec3::new(tan(right), tan(up), -distance),
        };
        self.rotation = rotation.normalize();
        self.rebuild_plane()
    }

    pub fn horizontal_fov_degrees(&self) -> f32 {
        let half_width = (self.corners.upper_right.x - self.corners.upper_left.x) * 0.5;
        2.0 * (half_width / self.corners.upper_right.z).abs().atan().to_degrees()
    }

    /// Replaces the plane by a symmetric one with horizontal FOV `degrees`,
    /// keeping the current distance and rotation.
    pub fn set_horizontal_fov(&mut self, degrees: f32, aspect: f32) -> Result<(), ConfigError> {
        if !(degrees > 0.0 && degrees < 180.0) {
            return Err(ConfigError::InvalidFieldOfView { degrees });
        }
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(ConfigError::InvalidAspectRatio { aspect });
        }

        let distance = self.corners.upper_right.z.abs();
        let half_width = distance * (degrees.to_radians() * 0.5).tan();
        let half_height = half_width / aspect;
        let vertical = (half_height / distance).atan().to_degrees();

        self.set_view_plane_coords_using_fovs(
            vertical,
            -vertical,
            -degrees * 0.5,
            degrees * 0.5,
            self.rotation,
            distance,
        )
    }

    /// Widens or narrows the plane horizontally when the window aspect changes
    pub fn update_fov_to_match_aspect_ratio(
        &mut self,
        old_ratio: f32,
        new_ratio: f32,
    ) -> Result<(), ConfigError> {
        for aspect in [old_ratio, new_ratio] {
            if !(aspect > 0.0 && aspect.is_finite()) {
                return Err(ConfigError::InvalidAspectRatio { aspect });
            }
        }
        let scale = new_ratio / old_ratio;
        self.corners.lower_left.x *= scale;
        self.corners.upper_left.x *= scale;
        self.corners.upper_right.x *= scale;
        self.rebuild_plane()
    }

    /// Projection for `mode`, recomputed only when the eye, offset or clip
    /// planes differ from the cached inputs
    pub fn projection(
        &mut self,
        mode: FrustumMode,
        eye: Vec3,
        offset: Option<Vec3>,
        near: f32,
        far: f32,
    ) -> Result<Projection, ConfigError> {
        let index = mode.index();
        if let Some(cached) = &self.projections[index] {
            if cached.eye == eye && cached.offset == offset && cached.near == near && cached.far == far {
                return Ok(cached.projection);
            }
        }

        let projection = Projection::calculate(&self.plane, eye, offset, near, far)?;
        self.projections[index] = Some(CachedProjection {
            eye,
            offset,
            near,
            far,
            projection,
        });
        Ok(projection)
    }

    pub fn calculate_frustum(
        &mut self,
        mode: FrustumMode,
        user: &User,
        near: f32,
        far: f32,
    ) -> Result<Projection, ConfigError> {
        self.projection(mode, user.eye_position(mode), None, near, far)
    }

    /// Frustum from the mono eye shifted by the stereo offset, so every face of
    /// a non-linear projection shares one center
    pub fn calculate_non_linear_frustum(
        &mut self,
        mode: FrustumMode,
        user: &User,
        near: f32,
        far: f32,
    ) -> Result<Projection, ConfigError> {
        let base = user.eye_position(FrustumMode::Mono);
        let offset = user.eye_position(mode) - base;
        self.projection(mode, base, Some(offset), near, far)
    }

    pub fn cached_projection(&self, mode: FrustumMode) -> Option<&Projection> {
        self.projections[mode.index()]
            .as_ref()
            .map(|cached| &cached.projection)
    }

    /// Drops every cached projection
    pub fn invalidate(&mut self) {
        self.projections = [None; 3];
    }

    fn rebuild_plane(&mut self) -> Result<(), ConfigError> {
        let mut plane = ProjectionPlane::new(
            self.rotation * self.corners.lower_left,
            self.rotation * self.corners.upper_left,
            self.rotation * self.corners.upper_right,
        )?;
        plane.offset(self.plane_offset);
        self.plane = plane;
        self.invalidate();
        Ok(())
    }
}

fn validate_rect(position: Vec2, size: Vec2) -> Result<(), ConfigError> {
    let end = position + size;
    let valid = position.cmpge(Vec2::ZERO).all()
        && size.cmpgt(Vec2::ZERO).all()
        && end.cmple(Vec2::splat(1.0 + RECT_EPSILON)).all();
    if !valid {
        return Err(ConfigError::InvalidViewportRect { position, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserRegistry;

    fn viewport() -> BaseViewport {
        let users = UserRegistry::new();
        BaseViewport::new(Vec2::ZERO, Vec2::ONE, users.default_key()).unwrap()
    }

    #[test]
    fn rect_outside_unit_square_is_rejected() {
        let users = UserRegistry::new();
        let result = BaseViewport::new(Vec2::new(0.5, 0.0), Vec2::new(0.6, 1.0), users.default_key());
        assert!(matches!(result, Err(ConfigError::InvalidViewportRect { .. })));

        let result = BaseViewport::new(Vec2::new(-0.1, 0.0), Vec2::new(0.5, 0.5), users.default_key());
        assert!(result.is_err());
    }

    #[test]
    fn fovs_build_signed_plane() {
        let mut viewport = viewport();
        viewport
            .set_view_plane_coords_using_fovs(45.0, -45.0, -45.0, 45.0, Quat::IDENTITY, 1.0)
            .unwrap();

        let plane = viewport.plane();
        assert!((plane.lower_left() - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-5);
        assert!((plane.upper_right() - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-5);
        assert!((viewport.horizontal_fov_degrees() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_is_applied_after_fovs() {
        let mut viewport = viewport();
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        viewport
            .set_view_plane_coords_using_fovs(30.0, -30.0, -30.0, 30.0, rotation, 2.0)
            .unwrap();

        let center = viewport.plane().center();
        assert!((center - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((viewport.horizontal_fov_degrees() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn aspect_update_scales_horizontal_extent() {
        let mut viewport = viewport();
        viewport.set_horizontal_fov(90.0, 1.0).unwrap();
        viewport.update_fov_to_match_aspect_ratio(1.0, 2.0).unwrap();

        let width = viewport.plane().width();
        let height = viewport.plane().height();
        assert!((width / height - 2.0).abs() < 1e-4);
    }

    #[test]
    fn plane_changes_drop_cached_projections() {
        let mut viewport = viewport();
        let users = UserRegistry::new();
        viewport
            .calculate_frustum(FrustumMode::Mono, users.default_user(), 0.1, 100.0)
            .unwrap();
        assert!(viewport.cached_projection(FrustumMode::Mono).is_some());

        viewport.set_plane_offset(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(viewport.cached_projection(FrustumMode::Mono).is_none());
    }

    #[test]
    fn offset_survives_fov_changes() {
        let mut viewport = viewport();
        viewport.set_plane_offset(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        viewport.set_horizontal_fov(60.0, 1.5).unwrap();
        assert!((viewport.plane().center().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn extreme_fov_is_rejected() {
        let mut viewport = viewport();
        assert!(viewport.set_horizontal_fov(180.0, 1.0).is_err());
        assert!(viewport
            .set_view_plane_coords_using_fovs(95.0, -10.0, -10.0, 10.0, Quat::IDENTITY, 1.0)
            .is_err());
    }
}
