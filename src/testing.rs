//! Test doubles for the MQTT client and the host platform.

use crate::error::{Result, SensorError};
use crate::input::mqtt::BusClient;
use crate::sensor::{HostBinding, StatusValue};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct ClientLog {
    subscribed: Vec<String>,
    unsubscribed: Vec<String>,
    published: Vec<(String, Vec<u8>)>,
    disconnects: usize,
}

/// Records every request instead of talking to a broker.
#[derive(Clone, Default)]
pub struct RecordingClient {
    log: Arc<Mutex<ClientLog>>,
    reject_subscribe: Arc<Vec<String>>,
    reject_publish: bool,
}

impl RecordingClient {
    pub fn failing_subscribe(topics: &[&str]) -> Self {
        Self {
            reject_subscribe: Arc::new(topics.iter().map(|t| t.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn failing_publish() -> Self {
        Self {
            reject_publish: true,
            ..Self::default()
        }
    }

    pub fn subscribed(&self) -> Vec<String> {
        self.log.lock().subscribed.clone()
    }

    pub fn unsubscribed(&self) -> Vec<String> {
        self.log.lock().unsubscribed.clone()
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.log.lock().published.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.log.lock().disconnects
    }
}

fn rejected() -> SensorError {
    SensorError::IoError(std::io::Error::other("request rejected"))
}

impl BusClient for RecordingClient {
    fn subscribe(&self, topic: &str) -> Result<()> {
        if self.reject_subscribe.iter().any(|t| t == topic) {
            return Err(rejected());
        }
        self.log.lock().subscribed.push(topic.to_string());
        Ok(())
    }

    fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.log.lock().unsubscribed.push(topic.to_string());
        Ok(())
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        if self.reject_publish {
            return Err(rejected());
        }
        self.log
            .lock()
            .published
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.log.lock().disconnects += 1;
        Ok(())
    }
}

/// Host binding that remembers every pushed update.
#[derive(Default)]
pub struct RecordingBinding {
    updates: Mutex<Vec<StatusValue>>,
}

impl RecordingBinding {
    pub fn updates(&self) -> Vec<StatusValue> {
        self.updates.lock().clone()
    }
}

impl HostBinding for RecordingBinding {
    fn update_characteristic(&self, value: StatusValue) {
        self.updates.lock().push(value);
    }
}
