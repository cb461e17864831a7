//! MQTT client wrapper for the smoke sensor.

use crate::config::MqttConfig;
use crate::error::{Result, SensorError};
use log::{debug, error, info};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const DEFAULT_SCHEME: &str = "mqtt";
const DEFAULT_PORT: u16 = 1883;
const DEFAULT_TLS_PORT: u16 = 8883;

/// Message received from MQTT broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Connection and message events, delivered to the session in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Connected,
    Message(MqttMessage),
    Disconnected,
    Error(String),
}

impl BusEvent {
    pub fn message(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        BusEvent::Message(MqttMessage {
            topic: topic.into(),
            payload: payload.into(),
        })
    }
}

/// Outbound operations the session needs from an MQTT client.
///
/// Every call only enqueues the request and returns immediately.
pub trait BusClient: Send + Sync + 'static {
    fn subscribe(&self, topic: &str) -> Result<()>;
    fn unsubscribe(&self, topic: &str) -> Result<()>;
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;
    fn disconnect(&self) -> Result<()>;
}

impl BusClient for AsyncClient {
    fn subscribe(&self, topic: &str) -> Result<()> {
        Ok(self.try_subscribe(topic, QoS::AtMostOnce)?)
    }

    fn unsubscribe(&self, topic: &str) -> Result<()> {
        Ok(self.try_unsubscribe(topic)?)
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        Ok(self.try_publish(topic, QoS::AtMostOnce, false, payload.to_vec())?)
    }

    fn disconnect(&self) -> Result<()> {
        Ok(self.try_disconnect()?)
    }
}

/// Prefix the default `mqtt://` scheme when `address` has none.
pub fn normalize_broker_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, address)
    }
}

/// Broker location parsed from a configured address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl BrokerAddress {
    /// Parse an address such as `10.0.0.2`, `broker:1884` or
    /// `mqtts://broker.example`.
    pub fn parse(address: &str) -> Result<Self> {
        let url = normalize_broker_url(address.trim());
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| SensorError::InvalidBrokerAddress(address.to_string()))?;

        let tls = match scheme.to_ascii_lowercase().as_str() {
            "mqtt" | "tcp" => false,
            "mqtts" | "ssl" => true,
            other => return Err(SensorError::UnsupportedScheme(other.to_string())),
        };
        let default_port = if tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT };

        // Drop any path or query, then any user info
        let authority = rest.split(['/', '?']).next().unwrap_or_default();
        let authority = authority.rsplit('@').next().unwrap_or_default();

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            // IPv6 literal, e.g. [::1]:1883
            let (host, tail) = bracketed
                .split_once(']')
                .ok_or_else(|| SensorError::InvalidBrokerAddress(address.to_string()))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port, address)?,
                None => default_port,
            };
            (host, port)
        } else {
            match authority.split_once(':') {
                Some((host, port)) => (host, parse_port(port, address)?),
                None => (authority, default_port),
            }
        };

        if host.is_empty() {
            return Err(SensorError::InvalidBrokerAddress(address.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            tls,
        })
    }
}

fn parse_port(port: &str, address: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| SensorError::InvalidBrokerAddress(address.to_string()))
}

/// MQTT client for the smoke sensor broker connection.
pub struct MqttClient {
    client: AsyncClient,
    event_loop: EventLoop,
    reconnect_delay: Duration,
}

impl MqttClient {
    /// Create a new MQTT client from configuration.
    ///
    /// No network traffic happens until [`run`](Self::run) polls the event loop.
    pub fn new(config: &MqttConfig) -> Result<Self> {
        let broker = BrokerAddress::parse(&config.broker)?;
        let mut options = MqttOptions::new(&config.client_id, &broker.host, broker.port);
        options.set_keep_alive(Duration::from_secs(30));

        if broker.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        // Set credentials if provided
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.as_deref().unwrap_or_default());
        }

        let (client, event_loop) = AsyncClient::new(options, 100);

        Ok(Self {
            client,
            event_loop,
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
        })
    }

    /// Run the MQTT event loop and forward events to the provided channel.
    ///
    /// Runs until `cancel` fires, the channel closes, or a requested
    /// disconnect has been sent. Failed polls are reported as
    /// [`BusEvent::Error`]; the next poll reconnects.
    pub async fn run(mut self, tx: mpsc::Sender<BusEvent>, cancel: CancellationToken) {
        info!("[MQTT] Starting event loop");

        loop {
            let polled = tokio::select! {
                _ = cancel.cancelled() => break,
                polled = self.event_loop.poll() => polled,
            };

            let event = match polled {
                Ok(Event::Incoming(Packet::ConnAck(_))) => BusEvent::Connected,
                Ok(Event::Incoming(Packet::Publish(publish))) => BusEvent::Message(MqttMessage {
                    topic: publish.topic.clone(),
                    payload: publish.payload.to_vec(),
                }),
                Ok(Event::Incoming(Packet::Disconnect)) => BusEvent::Disconnected,
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    info!("[MQTT] Disconnect sent, stopping event loop");
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    if tx.send(BusEvent::Error(e.to_string())).await.is_err() {
                        break;
                    }
                    // Wait before reconnecting
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.reconnect_delay) => {}
                    }
                    continue;
                }
            };

            debug!("[MQTT] Event: {:?}", event);
            if tx.send(event).await.is_err() {
                error!("[MQTT] Event channel closed");
                break;
            }
        }

        debug!("[MQTT] Event loop stopped");
    }

    /// Get a clone of the async client for publishing from other tasks.
    pub fn client(&self) -> AsyncClient {
        self.client.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_scheme() {
        assert_eq!(normalize_broker_url("10.0.0.2"), "mqtt://10.0.0.2");
        assert_eq!(normalize_broker_url("broker:1884"), "mqtt://broker:1884");
        assert_eq!(normalize_broker_url("mqtts://broker"), "mqtts://broker");
        assert_eq!(normalize_broker_url("tcp://broker:1883"), "tcp://broker:1883");
    }

    #[test]
    fn test_parse_plain_host() {
        let broker = BrokerAddress::parse("10.0.0.2").unwrap();
        assert_eq!(
            broker,
            BrokerAddress {
                host: "10.0.0.2".to_string(),
                port: 1883,
                tls: false
            }
        );
    }

    #[test]
    fn test_parse_host_and_port() {
        let broker = BrokerAddress::parse("mqtt://broker.local:1884/").unwrap();
        assert_eq!(broker.host, "broker.local");
        assert_eq!(broker.port, 1884);
        assert!(!broker.tls);
    }

    #[test]
    fn test_parse_tls_default_port() {
        let broker = BrokerAddress::parse("mqtts://broker.example").unwrap();
        assert_eq!(broker.port, 8883);
        assert!(broker.tls);
    }

    #[test]
    fn test_parse_ipv6_and_user_info() {
        let broker = BrokerAddress::parse("mqtt://user:pw@[::1]:1885").unwrap();
        assert_eq!(broker.host, "::1");
        assert_eq!(broker.port, 1885);
    }

    #[test]
    fn test_parse_rejects_bad_addresses() {
        assert!(matches!(
            BrokerAddress::parse("ws://broker"),
            Err(SensorError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            BrokerAddress::parse("broker:notaport"),
            Err(SensorError::InvalidBrokerAddress(_))
        ));
        assert!(matches!(
            BrokerAddress::parse(""),
            Err(SensorError::InvalidBrokerAddress(_))
        ));
    }

    #[test]
    fn test_bus_event_message_helper() {
        assert_eq!(
            BusEvent::message("sensor/smoke", "ON"),
            BusEvent::Message(MqttMessage {
                topic: "sensor/smoke".to_string(),
                payload: b"ON".to_vec(),
            })
        );
    }
}
