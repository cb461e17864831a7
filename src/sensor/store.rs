//! Current status of the smoke sensor.
//!
//! Provides thread-safe shared state that is updated from the MQTT message
//! loop and read by the host through the status accessor. Every update is
//! pushed to the host binding immediately.

use super::host::HostBinding;
use super::status::{
    Dimension, Fault, LowBattery, SensorState, SmokeDetected, StatusValue, Tampered,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe store for the four status dimensions.
///
/// The version is incremented each time a stored value actually changes,
/// which lets callers detect changes without diffing the state.
pub struct StatusStore {
    state: RwLock<SensorState>,
    version: AtomicU32,
    binding: Arc<dyn HostBinding>,
}

impl StatusStore {
    /// Create a store in the default (normal/safe) state.
    pub fn new(binding: Arc<dyn HostBinding>) -> Self {
        Self {
            state: RwLock::new(SensorState::default()),
            version: AtomicU32::new(0),
            binding,
        }
    }

    pub fn get(&self, dimension: Dimension) -> StatusValue {
        self.state.read().get(dimension)
    }

    /// Store `value` for its dimension and push it to the host.
    ///
    /// The host is notified even when the value is unchanged.
    pub fn set(&self, value: StatusValue) {
        let old = self.state.write().set(value);
        if old != value {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
        self.binding.update_characteristic(value);
    }

    pub fn snapshot(&self) -> SensorState {
        *self.state.read()
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn smoke_detected(&self) -> SmokeDetected {
        self.state.read().smoke_detected
    }

    pub fn low_battery(&self) -> LowBattery {
        self.state.read().low_battery
    }

    pub fn tampered(&self) -> Tampered {
        self.state.read().tampered
    }

    pub fn fault(&self) -> Fault {
        self.state.read().fault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBinding;

    #[test]
    fn test_initial_state() {
        let store = StatusStore::new(Arc::new(RecordingBinding::default()));
        assert_eq!(store.snapshot(), SensorState::default());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_set_notifies_host() {
        let binding = Arc::new(RecordingBinding::default());
        let store = StatusStore::new(binding.clone());

        store.set(StatusValue::Tampered(Tampered::Tampered));
        assert_eq!(store.tampered(), Tampered::Tampered);
        assert_eq!(
            store.get(Dimension::Tampered),
            StatusValue::Tampered(Tampered::Tampered)
        );
        assert_eq!(
            binding.updates(),
            vec![StatusValue::Tampered(Tampered::Tampered)]
        );
    }

    #[test]
    fn test_set_increments_version_only_on_change() {
        let binding = Arc::new(RecordingBinding::default());
        let store = StatusStore::new(binding.clone());

        store.set(StatusValue::LowBattery(LowBattery::Low));
        assert_eq!(store.version(), 1);

        // Same value: no version bump, but the host is still refreshed
        store.set(StatusValue::LowBattery(LowBattery::Low));
        assert_eq!(store.version(), 1);
        assert_eq!(binding.updates().len(), 2);

        store.set(StatusValue::LowBattery(LowBattery::Normal));
        assert_eq!(store.version(), 2);
        assert_eq!(store.low_battery(), LowBattery::Normal);
    }

    #[test]
    fn test_dimensions_are_independent() {
        let store = StatusStore::new(Arc::new(RecordingBinding::default()));
        store.set(StatusValue::Fault(Fault::GeneralFault));
        store.set(StatusValue::SmokeDetected(SmokeDetected::Detected));

        let state = store.snapshot();
        assert_eq!(state.fault, Fault::GeneralFault);
        assert_eq!(state.smoke_detected, SmokeDetected::Detected);
        assert_eq!(state.low_battery, LowBattery::Normal);
        assert_eq!(state.tampered, Tampered::NotTampered);
    }
}
