//! Impression and click event records.
//!
//! Both records are transient: they are created once per generation cycle,
//! serialized, handed to the delivery channel, and discarded. Field names are
//! the wire contract consumed by the downstream pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record of an ad being shown to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impression {
    pub impression_id: Uuid,
    pub user_id: String,
    pub campaign_id: String,
    pub timestamp: DateTime<Utc>,
    pub geo_location: String,
    pub device_type: String,
    /// In [0.01, 1.00], rounded to 2 decimals.
    pub bid_price: f64,
}

/// Record of a user clicking a previously shown ad.
///
/// A click always references the impression generated in the same cycle;
/// `user_id` and `timestamp` are copied verbatim from it (clicks are modeled
/// as instantaneous).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub click_id: Uuid,
    pub impression_id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    /// `bid_price` times a uniform multiplier in [1.2, 5.0], rounded to
    /// 2 decimals.
    pub click_cost: f64,
}

/// One synthesizer cycle: an impression and, with probability p, a click
/// derived from it.
#[derive(Debug, Clone)]
pub struct AdCycle {
    pub impression: Impression,
    pub click: Option<Click>,
}

/// Round a monetary amount to 2 decimal places.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(0.014), 0.01);
        assert_eq!(round_to_cents(0.016), 0.02);
        assert_eq!(round_to_cents(0.125), 0.13);
        assert_eq!(round_to_cents(1.0), 1.0);
        assert_eq!(round_to_cents(0.999), 1.0);
        assert_eq!(round_to_cents(3.14159), 3.14);
    }

    #[test]
    fn test_impression_wire_field_names() {
        let impression = Impression {
            impression_id: Uuid::nil(),
            user_id: "u-1".to_string(),
            campaign_id: "camp-100".to_string(),
            timestamp: chrono::DateTime::from_timestamp(1234567890, 0).unwrap(),
            geo_location: "US-NY".to_string(),
            device_type: "mobile".to_string(),
            bid_price: 0.42,
        };

        let value = serde_json::to_value(&impression).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "impression_id",
            "user_id",
            "campaign_id",
            "timestamp",
            "geo_location",
            "device_type",
            "bid_price",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(object.len(), 7);
    }

    #[test]
    fn test_click_wire_field_names() {
        let click = Click {
            click_id: Uuid::nil(),
            impression_id: Uuid::nil(),
            user_id: "u-1".to_string(),
            timestamp: chrono::DateTime::from_timestamp(1234567890, 0).unwrap(),
            click_cost: 1.05,
        };

        let value = serde_json::to_value(&click).unwrap();
        let object = value.as_object().unwrap();
        for key in ["click_id", "impression_id", "user_id", "timestamp", "click_cost"] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(object.len(), 5);
    }

    #[test]
    fn test_timestamp_serializes_as_rfc3339() {
        let impression = Impression {
            impression_id: Uuid::nil(),
            user_id: "u-1".to_string(),
            campaign_id: "camp-100".to_string(),
            timestamp: chrono::DateTime::from_timestamp(0, 0).unwrap(),
            geo_location: "US-NY".to_string(),
            device_type: "mobile".to_string(),
            bid_price: 0.42,
        };

        let value = serde_json::to_value(&impression).unwrap();
        let ts = value["timestamp"].as_str().unwrap();
        assert!(ts.starts_with("1970-01-01T00:00:00"));
    }
}
