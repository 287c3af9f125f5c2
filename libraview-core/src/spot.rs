use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

/// Stable spot identifier, assigned once by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(String);

impl SpotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpotId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Fixed area classification of a desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Silent,
    Group,
    Collaborative,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Silent, Zone::Group, Zone::Collaborative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Silent => "silent",
            Zone::Group => "group",
            Zone::Collaborative => "collaborative",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Silent => "Silent Zone",
            Zone::Group => "Group Study",
            Zone::Collaborative => "Collaborative",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| CoreError::UnknownFilter(s.to_string()))
    }
}

/// Capability tag attached to a desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    PowerOutlet,
    Window,
    Whiteboard,
    Projector,
    Lamp,
    Lockable,
    Privacy,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::PowerOutlet,
        Feature::Window,
        Feature::Whiteboard,
        Feature::Projector,
        Feature::Lamp,
        Feature::Lockable,
        Feature::Privacy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::PowerOutlet => "power_outlet",
            Feature::Window => "window",
            Feature::Whiteboard => "whiteboard",
            Feature::Projector => "projector",
            Feature::Lamp => "lamp",
            Feature::Lockable => "lockable",
            Feature::Privacy => "privacy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feature::PowerOutlet => "Power Outlet",
            Feature::Window => "Window Seat",
            Feature::Whiteboard => "Whiteboard",
            Feature::Projector => "Projector",
            Feature::Lamp => "Desk Lamp",
            Feature::Lockable => "Lockable",
            Feature::Privacy => "Privacy",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| CoreError::UnknownFilter(s.to_string()))
    }
}

/// Position in the floor's logical coordinate space. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A temporary, time-limited reservation of a desk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub id: Uuid,
    pub reserved_by: String,
    pub placed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    pub fn new(reserved_by: impl Into<String>, placed_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reserved_by: reserved_by.into(),
            placed_at,
            expires_at,
        }
    }

    /// Whole seconds left at `now`, rounded up. Zero or negative once due.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let left = self.expires_at - now;
        let whole = left.num_seconds();
        if left > chrono::Duration::seconds(whole) {
            whole + 1
        } else {
            whole
        }
    }

    /// The deadline has been reached.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Spot status. Hold data only exists while the spot is on hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SpotStatus {
    #[default]
    Available,
    Occupied,
    OnHold(Hold),
}

impl SpotStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            SpotStatus::Available => StatusKind::Available,
            SpotStatus::Occupied => StatusKind::Occupied,
            SpotStatus::OnHold(_) => StatusKind::OnHold,
        }
    }
}

/// Payload-free discriminant of [`SpotStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Available,
    Occupied,
    OnHold,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusKind::Available => "available",
            StatusKind::Occupied => "occupied",
            StatusKind::OnHold => "on hold",
        };
        f.write_str(s)
    }
}

/// A bookable desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: SpotId,
    pub desk_number: String,
    pub position: Position,
    pub zone: Zone,
    pub features: BTreeSet<Feature>,
    status: SpotStatus,
}

impl Spot {
    pub fn new(
        id: impl Into<String>,
        desk_number: impl Into<String>,
        position: Position,
        zone: Zone,
        features: impl IntoIterator<Item = Feature>,
    ) -> Self {
        Self {
            id: SpotId::new(id),
            desk_number: desk_number.into(),
            position,
            zone,
            features: features.into_iter().collect(),
            status: SpotStatus::Available,
        }
    }

    /// Builder-style initial status, used when seeding the catalog.
    pub fn with_status(mut self, status: SpotStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> &SpotStatus {
        &self.status
    }

    pub fn kind(&self) -> StatusKind {
        self.status.kind()
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status, SpotStatus::Available)
    }

    pub fn hold(&self) -> Option<&Hold> {
        match &self.status {
            SpotStatus::OnHold(hold) => Some(hold),
            _ => None,
        }
    }

    pub fn hold_expires_at(&self) -> Option<DateTime<Utc>> {
        self.hold().map(|h| h.expires_at)
    }

    pub fn reserved_by(&self) -> Option<&str> {
        self.hold().map(|h| h.reserved_by.as_str())
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Short status line for the spot sheet, e.g. `On Hold (12m remaining)`.
    pub fn status_label(&self, now: DateTime<Utc>) -> String {
        match &self.status {
            SpotStatus::Available => "Available".to_string(),
            SpotStatus::Occupied => "Occupied".to_string(),
            SpotStatus::OnHold(hold) => {
                let minutes = (hold.remaining_seconds(now).max(0) + 59) / 60;
                format!("On Hold ({}m remaining)", minutes)
            }
        }
    }

    /// Writers: the reservation timer and the check-in resolver only.
    pub fn place_hold(&mut self, hold: Hold) {
        self.status = SpotStatus::OnHold(hold);
    }

    /// Back to available, returning the hold that was released, if any.
    pub fn release(&mut self) -> Option<Hold> {
        match std::mem::take(&mut self.status) {
            SpotStatus::OnHold(hold) => Some(hold),
            _ => None,
        }
    }

    /// Mark occupied, returning the hold that was converted, if any.
    pub fn occupy(&mut self) -> Option<Hold> {
        match std::mem::replace(&mut self.status, SpotStatus::Occupied) {
            SpotStatus::OnHold(hold) => Some(hold),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn desk() -> Spot {
        Spot::new("1A", "1A", Position { x: 50.0, y: 100.0 }, Zone::Silent, [Feature::PowerOutlet])
    }

    #[test]
    fn test_new_spot_defaults_to_available() {
        let spot = desk();
        assert!(spot.is_available());
        assert!(spot.hold_expires_at().is_none());
        assert!(spot.reserved_by().is_none());
    }

    #[test]
    fn test_hold_fields_follow_status() {
        let now = Utc::now();
        let mut spot = desk();
        spot.place_hold(Hold::new("student", now, now + Duration::minutes(15)));
        assert_eq!(spot.kind(), StatusKind::OnHold);
        assert_eq!(spot.reserved_by(), Some("student"));
        assert_eq!(spot.hold_expires_at(), Some(now + Duration::minutes(15)));

        let released = spot.release().unwrap();
        assert_eq!(released.reserved_by, "student");
        assert!(spot.is_available());
        assert!(spot.hold().is_none());
    }

    #[test]
    fn test_occupy_clears_hold() {
        let now = Utc::now();
        let mut spot = desk();
        spot.place_hold(Hold::new("student", now, now + Duration::minutes(15)));
        assert!(spot.occupy().is_some());
        assert_eq!(spot.kind(), StatusKind::Occupied);
        assert!(spot.hold_expires_at().is_none());
    }

    #[test]
    fn test_tags_parse_from_ids() {
        assert_eq!("power_outlet".parse::<Feature>().unwrap(), Feature::PowerOutlet);
        assert_eq!("collaborative".parse::<Zone>().unwrap(), Zone::Collaborative);
        assert!("sofa".parse::<Feature>().is_err());
    }

    #[test]
    fn test_partial_second_is_not_due() {
        let now = Utc::now();
        let hold = Hold::new("student", now, now + Duration::minutes(15));

        let almost = now + Duration::milliseconds(899_500);
        assert_eq!(hold.remaining_seconds(almost), 1);
        assert!(!hold.is_due(almost));

        let late_start = now + Duration::milliseconds(1_005);
        assert_eq!(hold.remaining_seconds(late_start), 899);

        assert_eq!(hold.remaining_seconds(hold.expires_at), 0);
        assert!(hold.is_due(hold.expires_at));
        assert_eq!(hold.remaining_seconds(hold.expires_at + Duration::milliseconds(1_500)), -1);
    }

    #[test]
    fn test_status_label_rounds_minutes_up() {
        let now = Utc::now();
        let mut spot = desk();
        spot.place_hold(Hold::new("student", now, now + Duration::seconds(11 * 60 + 5)));
        assert_eq!(spot.status_label(now), "On Hold (12m remaining)");
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let now = Utc::now();
        let mut spot = desk();
        spot.place_hold(Hold::new("student", now, now + Duration::minutes(15)));
        let json = serde_json::to_value(&spot).unwrap();
        assert_eq!(json["status"]["state"], "on_hold");
        assert_eq!(json["status"]["reserved_by"], "student");
        assert_eq!(json["features"][0], "power_outlet");

        let back: Spot = serde_json::from_value(json).unwrap();
        assert_eq!(back, spot);
    }
}
