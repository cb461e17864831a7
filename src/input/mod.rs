//! Input sources for the smoke sensor.
//!
//! Current input sources:
//! - `mqtt`: a smoke detector publishing its state to an MQTT broker

pub mod mqtt;
