pub mod backend;
pub mod cube_face;
pub mod non_linear_projection;
pub mod settings;
