//! Telemetry producers. A sensor periodically emits a small JSON state
//! document; the forwarder core only requires "produce a record on demand",
//! so everything here is replaceable by any other producer.

use crate::domain::Record;
use rand::Rng;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

const EVENT_TYPES: [(&str, u32); 5] = [
    ("nominal", 60),
    ("info", 24),
    ("warning", 10),
    ("error", 5),
    ("critical", 1),
];

#[derive(Debug, Clone)]
pub struct Sensor {
    id: String,
}

impl Default for Sensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor {
    /// Create a sensor with a random 32-hex-character identity.
    pub fn new() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        info!(sensor = %id, "created sensor");
        Self { id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dummy work interval: 100ms to 1500ms.
    pub async fn work(&self) {
        let pause = rand::rng().random_range(100..=1500);
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }

    /// Snapshot the current sensor state as one telemetry record.
    pub fn state(&self) -> Record {
        let mut rng = rand::rng();
        let readings: Vec<u32> = (0..3).map(|_| rng.random_range(0..=100)).collect();

        let state = serde_json::json!({
            "id": self.id,
            "event": {
                "type": Self::weighted_event_type(rng.random_range(0..100)),
                "readings": readings,
            },
            "timestamp": chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        Record::from(state.to_string())
    }

    fn weighted_event_type(roll: u32) -> &'static str {
        let mut cumulative = 0;
        for (event, weight) in EVENT_TYPES {
            cumulative += weight;
            if roll < cumulative {
                return event;
            }
        }
        EVENT_TYPES[0].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_ids_are_32_hex_chars_and_unique() {
        let a = Sensor::new();
        let b = Sensor::new();
        assert_eq!(a.id().len(), 32);
        assert!(a.id().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn state_is_valid_json_with_expected_shape() {
        let sensor = Sensor::new();
        let record = sensor.state();

        let value: serde_json::Value = serde_json::from_str(record.as_str()).unwrap();
        assert_eq!(value["id"], sensor.id());
        assert_eq!(value["event"]["readings"].as_array().unwrap().len(), 3);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn weighted_event_type_covers_the_whole_range() {
        assert_eq!(Sensor::weighted_event_type(0), "nominal");
        assert_eq!(Sensor::weighted_event_type(59), "nominal");
        assert_eq!(Sensor::weighted_event_type(60), "info");
        assert_eq!(Sensor::weighted_event_type(94), "error");
        assert_eq!(Sensor::weighted_event_type(99), "critical");
    }
}
