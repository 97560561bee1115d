use glam::{Mat3, Quat, Vec3};

use crate::error::ConfigError;

const DEGENERATE_EPSILON: f32 = 1e-6;

/// Rectangle in space that a viewport projects onto, described by three of its
/// corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionPlane {
    lower_left: Vec3,
    upper_left: Vec3,
    upper_right: Vec3,
}

impl Default for ProjectionPlane {
    fn default() -> Self {
        Self {
            lower_left: Vec3::new(-1.0, -1.0, -2.0),
            upper_left: Vec3::new(-1.0, 1.0, -2.0),
            upper_right: Vec3::new(1.0, 1.0, -2.0),
        }
    }
}

impl ProjectionPlane {
    pub fn new(lower_left: Vec3, upper_left: Vec3, upper_right: Vec3) -> Result<Self, ConfigError> {
        let plane = Self {
            lower_left,
            upper_left,
            upper_right,
        };
        plane.basis()?;
        Ok(plane)
    }

    pub fn lower_left(&self) -> Vec3 {
        self.lower_left
    }

    pub fn upper_left(&self) -> Vec3 {
        self.upper_left
    }

    pub fn upper_right(&self) -> Vec3 {
        self.upper_right
    }

    pub fn lower_right(&self) -> Vec3 {
        self.lower_left + (self.upper_right - self.upper_left)
    }

    pub fn center(&self) -> Vec3 {
        (self.lower_left + self.upper_right) * 0.5
    }

    pub fn width(&self) -> f32 {
        (self.upper_right - self.upper_left).length()
    }

    pub fn height(&self) -> f32 {
        (self.upper_left - self.lower_left).length()
    }

    /// Replaces all three corners. The plane is left untouched if the new
    /// corners are degenerate.
    pub fn set_coordinates(
        &mut self,
        lower_left: Vec3,
        upper_left: Vec3,
        upper_right: Vec3,
    ) -> Result<(), ConfigError> {
        *self = Self::new(lower_left, upper_left, upper_right)?;
        Ok(())
    }

    /// Translates every corner by `offset`
    pub fn offset(&mut self, offset: Vec3) {
        self.lower_left += offset;
        self.upper_left += offset;
        self.upper_right += offset;
    }

    pub fn rotated(&self, rotation: Quat) -> Self {
        Self {
            lower_left: rotation * self.lower_left,
            upper_left: rotation * self.upper_left,
            upper_right: rotation * self.upper_right,
        }
    }

    /// Rotation taking world coordinates into the plane's local frame, where x
    /// runs along the top edge, y up the left edge and z out of the plane.
    pub fn basis(&self) -> Result<Mat3, ConfigError> {
        let horizontal = self.upper_right - self.upper_left;
        let vertical = self.upper_left - self.lower_left;
        if horizontal.length() < DEGENERATE_EPSILON || vertical.length() < DEGENERATE_EPSILON {
            return Err(ConfigError::DegeneratePlane);
        }

        let x = horizontal.normalize();
        let normal = x.cross(vertical.normalize());
        if normal.length() < DEGENERATE_EPSILON {
            return Err(ConfigError::DegeneratePlane);
        }
        let z = normal.normalize();
        // re-derived so the basis stays orthonormal for skewed corners
        let y = z.cross(x);

        Ok(Mat3::from_cols(x, y, z).transpose())
    }

    pub fn normal(&self) -> Result<Vec3, ConfigError> {
        Ok(self.basis()?.row(2))
    }
}
