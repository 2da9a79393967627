use std::sync::Arc;

use super::adapters::SharedPlatform;

pub fn default_platform() -> SharedPlatform {
    #[cfg(target_os = "windows")]
    {
        Arc::new(super::adapters::windows::WindowsPlatform::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(super::adapters::portable::PortablePlatform::new())
    }
}
