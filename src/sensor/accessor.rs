//! Read side of the smoke sensor, as consumed by the host platform.

use super::status::{Dimension, Fault, LowBattery, SmokeDetected, StatusValue, Tampered};
use super::store::StatusStore;
use super::topics::SensorTopics;
use crate::input::mqtt::{BusClient, BusSession};
use log::debug;
use std::sync::Arc;

/// Answers host reads from the cached state.
///
/// Reads never wait on the bus. Each read also publishes an empty payload to
/// the dimension's get-topic so the device pushes a fresh reading, which
/// lands in the store asynchronously.
pub struct StatusAccessor<C: BusClient> {
    store: Arc<StatusStore>,
    topics: Arc<SensorTopics>,
    session: Arc<BusSession<C>>,
}

impl<C: BusClient> Clone for StatusAccessor<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            topics: self.topics.clone(),
            session: self.session.clone(),
        }
    }
}

impl<C: BusClient> StatusAccessor<C> {
    pub fn new(
        store: Arc<StatusStore>,
        topics: Arc<SensorTopics>,
        session: Arc<BusSession<C>>,
    ) -> Self {
        Self {
            store,
            topics,
            session,
        }
    }

    /// Return the cached value for `dimension` and request a refresh.
    pub fn get(&self, dimension: Dimension) -> StatusValue {
        let value = self.store.get(dimension);
        debug!("[Sensor] {} -> {}", dimension, value);
        self.request_refresh(dimension);
        value
    }

    pub fn get_smoke_detected(&self) -> SmokeDetected {
        let value = self.store.smoke_detected();
        debug!("[Sensor] Smoke Detected -> {}", value);
        self.request_refresh(Dimension::SmokeDetected);
        value
    }

    pub fn get_low_battery(&self) -> LowBattery {
        let value = self.store.low_battery();
        debug!("[Sensor] Low Battery -> {}", value);
        self.request_refresh(Dimension::LowBattery);
        value
    }

    pub fn get_tampered(&self) -> Tampered {
        let value = self.store.tampered();
        debug!("[Sensor] Tampered -> {}", value);
        self.request_refresh(Dimension::Tampered);
        value
    }

    pub fn get_fault(&self) -> Fault {
        let value = self.store.fault();
        debug!("[Sensor] Fault -> {}", value);
        self.request_refresh(Dimension::Fault);
        value
    }

    // Fire-and-forget: the session drops the request when the topic is
    // empty or the broker is not connected.
    fn request_refresh(&self, dimension: Dimension) {
        self.session.publish(&self.topics.get(dimension).get_topic, b"");
    }
}
