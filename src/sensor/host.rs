//! Host platform binding.
//!
//! When a status value changes, the host has to be told right away so its
//! displays update without polling. The host platform implements
//! [`HostBinding`] and receives every update pushed by the
//! [`StatusStore`](super::StatusStore).

use super::status::StatusValue;
use crate::config::AccessoryConfig;
use log::info;

/// Capabilities the smoke sensor needs from the smart-home host.
pub trait HostBinding: Send + Sync {
    /// Called once at start with the accessory's identifying information.
    fn register_accessory(&self, _accessory: &AccessoryConfig) {}

    /// Refresh the host characteristic for `value`'s dimension.
    ///
    /// Must not block; it is called from the MQTT message loop.
    fn update_characteristic(&self, value: StatusValue);
}

/// Host binding that only logs what it is asked to display.
///
/// Used by the standalone binary, where no smart-home host is attached.
#[derive(Debug, Default)]
pub struct LogHostBinding;

impl HostBinding for LogHostBinding {
    fn register_accessory(&self, accessory: &AccessoryConfig) {
        info!(
            "[Sensor] Registered accessory '{}' ({} {}, serial {})",
            accessory.name, accessory.manufacturer, accessory.model, accessory.serial
        );
    }

    fn update_characteristic(&self, value: StatusValue) {
        info!(
            "[Sensor] {} -> {} ({})",
            value.dimension(),
            value,
            value.code()
        );
    }
}
