//! Audio store middleware

mod device_module;
mod permission;

pub use device_module::AudioDeviceModuleMiddleware;
pub use permission::{PermissionMiddleware, PermissionProvider};
