//! Data packets: one delivered legacy export bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record-kind under which packets are stored.
pub const PACKET_KIND: &str = "data_packet";

/// Serde format for packet timestamps.
///
/// RFC 3339 with a fixed six-digit fraction, so the stored strings compare
/// lexicographically in the same order as the instants they encode. Retention
/// cutoffs rely on this when filtering stored packets.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Render an instant in the stored format.
    pub fn to_string(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_string(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

/// One delivered legacy export archive.
///
/// The `name` is the stable file identifier assigned on arrival; the
/// extraction directory and the backing archive file are both derived from
/// it. `is_processed` flips once the intake pipeline has imported every
/// table, and doubles as the idempotence guard under at-least-once job
/// dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPacket {
    pub name: String,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl DataPacket {
    /// Create an unprocessed packet.
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            is_processed: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_serializes_with_flag() {
        let created_at = "2025-03-01T08:30:00.000000Z".parse().unwrap();
        let packet = DataPacket::new("packet-2025-03-01", created_at);
        let json = serde_json::to_value(&packet).unwrap();
        assert_eq!(json["name"], "packet-2025-03-01");
        assert_eq!(json["is_processed"], false);
        assert_eq!(json["created_at"], "2025-03-01T08:30:00.000000Z");

        let back: DataPacket = serde_json::from_value(json).unwrap();
        assert_eq!(back, packet);
    }

    #[test]
    fn stored_timestamps_order_like_instants() {
        use chrono::Duration;

        // Fixed-width fractions keep lexicographic and chronological order
        // aligned even across sub-second differences.
        let base = Utc::now();
        let earlier = timestamp::to_string(&(base - Duration::milliseconds(500)));
        let later = timestamp::to_string(&(base + Duration::milliseconds(500)));
        let at_base = timestamp::to_string(&base);
        assert!(earlier < at_base);
        assert!(at_base < later);
        assert_eq!(at_base.len(), earlier.len());
    }
}
