//! MQTT input source for the smoke sensor.
//!
//! This module provides the MQTT client, the broker session that feeds the
//! sensor state, and the bridge that runs both.

mod client;
mod integration;
mod session;

pub use client::{BrokerAddress, BusClient, BusEvent, MqttClient, MqttMessage, normalize_broker_url};
pub use integration::SmokeSensorBridge;
pub use session::{BusSession, ConnectionAttempts, MAX_CONNECTION_ATTEMPTS, SessionState};
