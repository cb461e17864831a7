//! Per-dimension topic configuration.

use super::status::Dimension;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Topics and payloads for a single dimension.
///
/// An empty payload matches any payload on its topic. An empty topic
/// disables that half of the dimension, and an empty `get_topic` disables
/// refresh requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimensionTopics {
    pub true_topic: String,
    pub true_payload: String,
    pub false_topic: String,
    pub false_payload: String,
    pub get_topic: String,
}

impl DimensionTopics {
    pub fn new(
        true_topic: impl Into<String>,
        true_payload: impl Into<String>,
        false_topic: impl Into<String>,
        false_payload: impl Into<String>,
    ) -> Self {
        Self {
            true_topic: true_topic.into(),
            true_payload: true_payload.into(),
            false_topic: false_topic.into(),
            false_payload: false_payload.into(),
            get_topic: String::new(),
        }
    }

    pub fn with_get_topic(mut self, topic: impl Into<String>) -> Self {
        self.get_topic = topic.into();
        self
    }

    /// The true pair followed by the false pair, as `(topic, payload, active)`.
    pub fn pairs(&self) -> [(&str, &str, bool); 2] {
        [
            (self.true_topic.as_str(), self.true_payload.as_str(), true),
            (self.false_topic.as_str(), self.false_payload.as_str(), false),
        ]
    }
}

/// Topic records for all four dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensorTopics {
    pub smoke_detected: DimensionTopics,
    pub low_battery: DimensionTopics,
    pub tampered: DimensionTopics,
    pub fault: DimensionTopics,
}

impl SensorTopics {
    pub fn get(&self, dimension: Dimension) -> &DimensionTopics {
        match dimension {
            Dimension::SmokeDetected => &self.smoke_detected,
            Dimension::LowBattery => &self.low_battery,
            Dimension::Tampered => &self.tampered,
            Dimension::Fault => &self.fault,
        }
    }

    pub fn with(mut self, dimension: Dimension, topics: DimensionTopics) -> Self {
        match dimension {
            Dimension::SmokeDetected => self.smoke_detected = topics,
            Dimension::LowBattery => self.low_battery = topics,
            Dimension::Tampered => self.tampered = topics,
            Dimension::Fault => self.fault = topics,
        }
        self
    }

    /// Records in matching priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &DimensionTopics)> {
        Dimension::iter().map(move |dimension| (dimension, self.get(dimension)))
    }

    /// The eight dimension topics in priority order, empty ones included.
    pub fn dimension_topics(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .flat_map(|(_, topics)| [topics.true_topic.as_str(), topics.false_topic.as_str()])
    }

    /// Distinct non-empty dimension topics, in priority order.
    ///
    /// Get-topics are outbound only and never appear here.
    pub fn subscription_topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::new();
        for topic in self.dimension_topics() {
            if !topic.is_empty() && !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SensorTopics {
        SensorTopics::default()
            .with(
                Dimension::SmokeDetected,
                DimensionTopics::new("sensor/smoke", "ON", "sensor/smoke", "OFF")
                    .with_get_topic("sensor/smoke/get"),
            )
            .with(
                Dimension::LowBattery,
                DimensionTopics::new("sensor/battery", "LOW", "sensor/battery", "OK"),
            )
            .with(
                Dimension::Fault,
                DimensionTopics::new("sensor/fault", "", "sensor/fault/clear", ""),
            )
    }

    #[test]
    fn test_subscription_topics_dedup_and_skip_empty() {
        let topics = sample();
        assert_eq!(
            topics.subscription_topics(),
            vec![
                "sensor/smoke",
                "sensor/battery",
                "sensor/fault",
                "sensor/fault/clear"
            ]
        );
    }

    #[test]
    fn test_get_topics_are_not_subscribed() {
        let topics = sample();
        assert!(!topics.subscription_topics().contains(&"sensor/smoke/get"));
    }

    #[test]
    fn test_dimension_topics_has_eight_entries() {
        assert_eq!(sample().dimension_topics().count(), 8);
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let json = r#"{
            "smokeDetected": {
                "trueTopic": "sensor/smoke",
                "truePayload": "ON",
                "getTopic": "sensor/smoke/get"
            }
        }"#;
        let topics: SensorTopics = serde_json::from_str(json).unwrap();
        assert_eq!(topics.smoke_detected.true_topic, "sensor/smoke");
        assert_eq!(topics.smoke_detected.true_payload, "ON");
        assert_eq!(topics.smoke_detected.false_topic, "");
        assert_eq!(topics.smoke_detected.get_topic, "sensor/smoke/get");
        assert_eq!(topics.tampered, DimensionTopics::default());
    }
}
