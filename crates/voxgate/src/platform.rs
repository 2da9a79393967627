pub mod adapters;
pub mod factory;

pub use adapters::{Platform, SharedPlatform};
pub use factory::default_platform;
