use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::pii::Masked;

/// Lifecycle events emitted whenever a spot changes status.
///
/// Timestamps are unix seconds, matching the rest of the event payloads.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpotEvent {
    HoldStarted {
        spot_id: String,
        desk_number: String,
        hold_id: Uuid,
        reserved_by: Masked<String>,
        expires_at: i64,
    },
    HoldCancelled {
        spot_id: String,
        desk_number: String,
        hold_id: Uuid,
        timestamp: i64,
    },
    HoldExpired {
        spot_id: String,
        desk_number: String,
        hold_id: Uuid,
        timestamp: i64,
    },
    CheckedIn {
        spot_id: String,
        desk_number: String,
        timestamp: i64,
    },
    CheckedOut {
        spot_id: String,
        desk_number: String,
        timestamp: i64,
    },
}

impl SpotEvent {
    pub fn spot_id(&self) -> &str {
        match self {
            SpotEvent::HoldStarted { spot_id, .. }
            | SpotEvent::HoldCancelled { spot_id, .. }
            | SpotEvent::HoldExpired { spot_id, .. }
            | SpotEvent::CheckedIn { spot_id, .. }
            | SpotEvent::CheckedOut { spot_id, .. } => spot_id,
        }
    }

    pub fn desk_number(&self) -> &str {
        match self {
            SpotEvent::HoldStarted { desk_number, .. }
            | SpotEvent::HoldCancelled { desk_number, .. }
            | SpotEvent::HoldExpired { desk_number, .. }
            | SpotEvent::CheckedIn { desk_number, .. }
            | SpotEvent::CheckedOut { desk_number, .. } => desk_number,
        }
    }

    /// Unix timestamp helper for building events from a clock reading.
    pub fn stamp(at: DateTime<Utc>) -> i64 {
        at.timestamp()
    }
}
