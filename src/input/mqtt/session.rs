//! Broker session lifecycle for the smoke sensor.
//!
//! The session consumes [`BusEvent`]s one at a time, subscribes to the
//! sensor topics whenever the broker (re)connects, applies matched messages to
//! the [`StatusStore`] and throttles connection error reports.

use super::client::{BusClient, BusEvent, MqttMessage};
use crate::sensor::{SensorTopics, StatusStore, match_message};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Number of connection errors after which the next error is reported again.
pub const MAX_CONNECTION_ATTEMPTS: u32 = 30;

/// Lifecycle of the broker session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    /// Connected, with at least one subscription accepted.
    Subscribed,
    /// Shut down. Terminal.
    Ended,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected | Self::Subscribed)
    }
}

/// Connection error counter used to keep reconnect noise out of the log.
///
/// The first error is reported; the following ones are suppressed until the
/// counter passes [`MAX_CONNECTION_ATTEMPTS`], at which point it starts over
/// and the next error is reported again.
#[derive(Debug)]
pub struct ConnectionAttempts {
    count: u32,
}

impl Default for ConnectionAttempts {
    fn default() -> Self {
        Self { count: 1 }
    }
}

impl ConnectionAttempts {
    /// Record an error. Returns true if it should be shown to the user.
    pub fn record(&mut self) -> bool {
        let report = self.count == 1;
        if !report && self.count > MAX_CONNECTION_ATTEMPTS {
            self.count = 0;
        }
        self.count += 1;
        report
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Owns the broker session on behalf of one smoke sensor.
pub struct BusSession<C: BusClient> {
    client: C,
    topics: Arc<SensorTopics>,
    store: Arc<StatusStore>,
    state: Mutex<SessionState>,
    attempts: Mutex<ConnectionAttempts>,
}

impl<C: BusClient> BusSession<C> {
    /// Create a session for a client whose connection is being opened.
    pub fn new(client: C, topics: Arc<SensorTopics>, store: Arc<StatusStore>) -> Self {
        Self {
            client,
            topics,
            store,
            state: Mutex::new(SessionState::Connecting),
            attempts: Mutex::new(ConnectionAttempts::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Process events until the channel closes or the session ends.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<BusEvent>) {
        while let Some(event) = events.recv().await {
            if self.state() == SessionState::Ended {
                debug!("[MQTT] Session ended, dropping {:?}", event);
                break;
            }
            self.handle_event(event);
        }
        debug!("[MQTT] Session loop stopped");
    }

    /// Apply a single bus event.
    pub fn handle_event(&self, event: BusEvent) {
        if self.state() == SessionState::Ended {
            return;
        }
        match event {
            BusEvent::Connected => self.on_connect(),
            BusEvent::Message(message) => self.on_message(message),
            BusEvent::Disconnected => {
                warn!("[MQTT] Disconnected from MQTT broker");
                self.set_state(SessionState::Disconnected);
            }
            BusEvent::Error(message) => self.on_error(&message),
        }
    }

    fn on_connect(&self) {
        info!("[MQTT] Connected to MQTT broker");
        self.set_state(SessionState::Connected);

        // Failures are not fatal: the session keeps whatever was accepted
        let mut subscribed = 0;
        for topic in self.topics.subscription_topics() {
            debug!("[MQTT] Subscribing to topic {}", topic);
            match self.client.subscribe(topic) {
                Ok(()) => subscribed += 1,
                Err(e) => error!("[MQTT] Unable to subscribe to {}: {}", topic, e),
            }
        }

        if subscribed > 0 {
            info!("[MQTT] Subscribed to {} topic(s)", subscribed);
            self.set_state(SessionState::Subscribed);
        }
    }

    fn on_message(&self, message: MqttMessage) {
        debug!("[MQTT] Topic: {}", message.topic);
        debug!(
            "[MQTT] Message received: {}",
            String::from_utf8_lossy(&message.payload)
        );

        if let Some(value) = match_message(&message.topic, &message.payload, &self.topics) {
            self.store.set(value);
        }
    }

    fn on_error(&self, message: &str) {
        self.set_state(SessionState::Disconnected);
        if self.attempts.lock().record() {
            error!("[MQTT] Problem with MQTT broker: {}", message);
        } else {
            debug!("[MQTT] Problem with MQTT broker (suppressed): {}", message);
        }
    }

    /// Send a message without waiting for delivery.
    ///
    /// Does nothing when `topic` is empty or the broker is not connected.
    pub fn publish(&self, topic: &str, payload: &[u8]) {
        if topic.is_empty() {
            return;
        }
        if !self.state().is_connected() {
            debug!("[MQTT] Not connected, skipping publish to {}", topic);
            return;
        }
        if let Err(e) = self.client.publish(topic, payload) {
            debug!("[MQTT] Failed to publish to {}: {}", topic, e);
        }
    }

    /// Unsubscribe from every dimension topic and close the connection.
    ///
    /// Later calls are no-ops.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock();
            if *state == SessionState::Ended {
                debug!("[MQTT] Shutdown already done");
                return;
            }
            *state = SessionState::Ended;
        }

        debug!("[MQTT] Shutdown called. Unsubscribing from MQTT broker.");
        for topic in self.topics.dimension_topics() {
            if topic.is_empty() {
                continue;
            }
            if let Err(e) = self.client.unsubscribe(topic) {
                debug!("[MQTT] Failed to unsubscribe from {}: {}", topic, e);
            }
        }
        if let Err(e) = self.client.disconnect() {
            debug!("[MQTT] Failed to disconnect: {}", e);
        }
    }

    fn set_state(&self, state: SessionState) {
        let mut current = self.state.lock();
        if *current != SessionState::Ended {
            *current = state;
        }
    }
}
