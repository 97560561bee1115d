pub mod cluster_config;
pub mod cluster_context;
