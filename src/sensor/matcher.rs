//! Maps inbound MQTT messages onto sensor status updates.
//!
//! Every dimension contributes two rules, the "true" pair and the "false"
//! pair. Rules are evaluated in a fixed order (smoke, battery, tamper, fault,
//! true before false) and the first match wins, so a message never updates
//! more than one dimension. Deployments that route several dimensions over a
//! shared topic rely on this ordering.

use super::status::StatusValue;
use super::topics::SensorTopics;

/// Find the status update an inbound message represents.
///
/// A rule matches when its topic is non-empty and equal to `topic`, and its
/// payload is either empty (wildcard) or byte-for-byte equal to `payload`.
/// Returns `None` when no rule matches.
pub fn match_message(topic: &str, payload: &[u8], topics: &SensorTopics) -> Option<StatusValue> {
    for (dimension, record) in topics.iter() {
        for (rule_topic, rule_payload, active) in record.pairs() {
            if rule_topic.is_empty() || rule_topic != topic {
                continue;
            }
            if rule_payload.is_empty() || rule_payload.as_bytes() == payload {
                return Some(StatusValue::from_polarity(dimension, active));
            }
        }
    }
    None
}
