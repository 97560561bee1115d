mod master;
pub use master::Master;

mod master_config;
pub use master_config::MasterConfig;
