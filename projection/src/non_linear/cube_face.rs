use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use crate::{error::ConfigError, plane::ProjectionPlane};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Right,
    Left,
    Bottom,
    Top,
    Front,
    Back,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Bottom,
        CubeFace::Top,
        CubeFace::Front,
        CubeFace::Back,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CubeFace::Right => "right",
            CubeFace::Left => "left",
            CubeFace::Bottom => "bottom",
            CubeFace::Top => "top",
            CubeFace::Front => "front",
            CubeFace::Back => "back",
        }
    }

    /// Turns the front face (looking down -z) onto this face
    pub fn rotation(&self) -> Quat {
        match self {
            CubeFace::Right => Quat::from_rotation_y(-FRAC_PI_2),
            CubeFace::Left => Quat::from_rotation_y(FRAC_PI_2),
            CubeFace::Bottom => Quat::from_rotation_x(-FRAC_PI_2),
            CubeFace::Top => Quat::from_rotation_x(FRAC_PI_2),
            CubeFace::Front => Quat::IDENTITY,
            CubeFace::Back => Quat::from_rotation_y(PI),
        }
    }

    /// Plane of this face on a cube of half-size `radius` turned by
    /// `orientation` and moved by `offset`
    pub fn plane(&self, radius: f32, orientation: Quat, offset: Vec3) -> Result<ProjectionPlane, ConfigError> {
        let rotation = orientation * self.rotation();
        let mut plane = ProjectionPlane::new(
            rotation * Vec3::new(-radius, -radius, -radius),
            rotation * Vec3::new(-radius, radius, -radius),
            rotation * Vec3::new(radius, radius, -radius),
        )?;
        plane.offset(offset);
        Ok(plane)
    }
}
