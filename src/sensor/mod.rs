//! Smoke sensor state and the rules that drive it.
//!
//! Inbound MQTT messages are turned into [`StatusValue`]s by the
//! [`matcher`], stored in the [`StatusStore`] and pushed to the
//! [`HostBinding`]. The host reads values back through the
//! [`StatusAccessor`].

pub mod accessor;
pub mod host;
pub mod matcher;
pub mod status;
pub mod store;
pub mod topics;

pub use accessor::StatusAccessor;
pub use host::{HostBinding, LogHostBinding};
pub use matcher::match_message;
pub use status::{Dimension, Fault, LowBattery, SensorState, SmokeDetected, StatusValue, Tampered};
pub use store::StatusStore;
pub use topics::{DimensionTopics, SensorTopics};
