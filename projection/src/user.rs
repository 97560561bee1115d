use glam::{Quat, Vec3};
use log::debug;

use crate::{error::ConfigError, frustum::FrustumMode};

pub const DEFAULT_USER_NAME: &str = "default";
pub const DEFAULT_EYE_SEPARATION: f32 = 0.06;

/// A viewer whose eyes the frustums are computed from
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    name: String,
    position: Vec3,
    orientation: Quat,
    eye_separation: f32,
    left_eye: Vec3,
    right_eye: Vec3,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        let mut user = Self {
            name: name.into(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            eye_separation: DEFAULT_EYE_SEPARATION,
            left_eye: Vec3::ZERO,
            right_eye: Vec3::ZERO,
        };
        user.update_eye_positions();
        user
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn eye_separation(&self) -> f32 {
        self.eye_separation
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_eye_positions();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.update_eye_positions();
    }

    pub fn set_eye_separation(&mut self, eye_separation: f32) {
        self.eye_separation = eye_separation;
        self.update_eye_positions();
    }

    /// Sets position and orientation together, as a tracker does every frame
    pub fn set_transform(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation.normalize();
        self.update_eye_positions();
    }

    pub fn eye_position(&self, mode: FrustumMode) -> Vec3 {
        match mode {
            FrustumMode::Mono => self.position,
            FrustumMode::StereoLeft => self.left_eye,
            FrustumMode::StereoRight => self.right_eye,
        }
    }

    fn update_eye_positions(&mut self) {
        let half_separation = self.orientation * Vec3::new(self.eye_separation * 0.5, 0.0, 0.0);
        self.left_eye = self.position - half_separation;
        self.right_eye = self.position + half_separation;
    }
}

/// Handle to a user stored in a [`UserRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserKey(usize);

/// Owns every user of a node. Always holds the default user; at most one user
/// is tracked.
#[derive(Debug, Clone)]
pub struct UserRegistry {
    users: Vec<User>,
    tracked: Option<UserKey>,
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRegistry {
    pub fn new() -> Self {
        Self {
            users: vec![User::new(DEFAULT_USER_NAME)],
            tracked: None,
        }
    }

    pub fn default_key(&self) -> UserKey {
        UserKey(0)
    }

    pub fn default_user(&self) -> &User {
        &self.users[0]
    }

    pub fn default_user_mut(&mut self) -> &mut User {
        &mut self.users[0]
    }

    pub fn add(&mut self, user: User) -> Result<UserKey, ConfigError> {
        if self.users.iter().any(|existing| existing.name == user.name) {
            return Err(ConfigError::DuplicateUser { name: user.name });
        }
        debug!("Adding user '{}'", user.name);
        self.users.push(user);
        Ok(UserKey(self.users.len() - 1))
    }

    /// Resolves a configured user name. `None` resolves to the default user.
    pub fn resolve(&self, name: Option<&str>) -> Result<UserKey, ConfigError> {
        match name {
            None => Ok(self.default_key()),
            Some(name) => self
                .users
                .iter()
                .position(|user| user.name == name)
                .map(UserKey)
                .ok_or_else(|| ConfigError::UnknownUser {
                    name: name.to_string(),
                }),
        }
    }

    pub fn get(&self, key: UserKey) -> Option<&User> {
        self.users.get(key.0)
    }

    pub fn get_mut(&mut self, key: UserKey) -> Option<&mut User> {
        self.users.get_mut(key.0)
    }

    pub fn set_tracked(&mut self, key: UserKey) -> Result<(), ConfigError> {
        let user = self.get(key).ok_or_else(|| ConfigError::UnknownUser {
            name: format!("#{}", key.0),
        })?;
        debug!("User '{}' is tracked", user.name);
        self.tracked = Some(key);
        Ok(())
    }

    pub fn tracked_key(&self) -> Option<UserKey> {
        self.tracked
    }

    pub fn tracked_user_mut(&mut self) -> Option<&mut User> {
        let key = self.tracked?;
        self.users.get_mut(key.0)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserKey, &User)> {
        self.users
            .iter()
            .enumerate()
            .map(|(index, user)| (UserKey(index), user))
    }
}
