//! Smoke sensor bridge orchestrator.
//!
//! Wires the MQTT client, the broker session and the status store together,
//! keeping MQTT internals out of main.rs.

use super::client::{BusEvent, MqttClient};
use super::session::{BusSession, SessionState};
use crate::config::Config;
use crate::error::Result;
use crate::sensor::{HostBinding, SensorState, StatusAccessor, StatusStore};
use log::{info, warn};
use rumqttc::AsyncClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long shutdown waits for the disconnect to reach the broker.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A running smoke sensor connected to its MQTT broker.
pub struct SmokeSensorBridge {
    store: Arc<StatusStore>,
    session: Arc<BusSession<AsyncClient>>,
    accessor: StatusAccessor<AsyncClient>,
    cancel: CancellationToken,
    client_task: JoinHandle<()>,
    session_task: JoinHandle<()>,
}

impl SmokeSensorBridge {
    /// Start the bridge.
    ///
    /// Spawns the MQTT event loop and the session loop on the current Tokio
    /// runtime. Only configuration errors are returned; connection problems
    /// are logged and retried in the background.
    pub fn start(config: &Config, binding: Arc<dyn HostBinding>) -> Result<Self> {
        binding.register_accessory(&config.accessory);

        info!("[MQTT] Connecting to MQTT broker {}...", config.mqtt.broker);
        let mqtt_client = MqttClient::new(&config.mqtt)?;

        let topics = Arc::new(config.topics.clone());
        let store = Arc::new(StatusStore::new(binding));
        let session = Arc::new(BusSession::new(
            mqtt_client.client(),
            topics.clone(),
            store.clone(),
        ));
        let accessor = StatusAccessor::new(store.clone(), topics, session.clone());

        let (event_tx, event_rx) = mpsc::channel::<BusEvent>(64);
        let cancel = CancellationToken::new();

        let client_task = tokio::spawn(mqtt_client.run(event_tx, cancel.clone()));
        let session_task = tokio::spawn(session.clone().run(event_rx));

        Ok(Self {
            store,
            session,
            accessor,
            cancel,
            client_task,
            session_task,
        })
    }

    /// Read side for the host platform.
    pub fn accessor(&self) -> &StatusAccessor<AsyncClient> {
        &self.accessor
    }

    pub fn state(&self) -> SensorState {
        self.store.snapshot()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Unsubscribe, disconnect and stop the background tasks.
    pub async fn shutdown(self) {
        self.session.shutdown();

        // Give the event loop a chance to flush the disconnect
        let mut client_task = self.client_task;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut client_task)
            .await
            .is_err()
        {
            warn!("[MQTT] Event loop did not stop in time, cancelling");
            self.cancel.cancel();
            let _ = client_task.await;
        }

        self.cancel.cancel();
        let _ = self.session_task.await;
        info!("[MQTT] Smoke sensor bridge stopped");
    }
}
