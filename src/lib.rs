//! MQTT Smoke Sensor library.
//!
//! This library exposes a smoke detector that reports over MQTT as four
//! smart-home status characteristics: smoke detected, low battery, tampered
//! and fault.

pub mod config;
pub mod error;
pub mod input;
pub mod sensor;

#[cfg(test)]
pub(crate) mod testing;
