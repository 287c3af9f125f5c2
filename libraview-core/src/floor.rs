use serde::{Deserialize, Serialize};

use crate::filter::{apply_filter, FilterSet};
use crate::spot::{Spot, SpotId, StatusKind};

/// A floor and its desks. Aggregate counts are always derived from `spots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub spots: Vec<Spot>,
}

impl Floor {
    pub fn new(id: impl Into<String>, number: u32, name: impl Into<String>, spots: Vec<Spot>) -> Self {
        Self {
            id: id.into(),
            number,
            name: name.into(),
            spots,
        }
    }

    pub fn total_spots(&self) -> usize {
        self.spots.len()
    }

    pub fn available_spots(&self) -> usize {
        self.count(StatusKind::Available)
    }

    pub fn occupied_spots(&self) -> usize {
        self.count(StatusKind::Occupied)
    }

    pub fn on_hold_spots(&self) -> usize {
        self.count(StatusKind::OnHold)
    }

    /// Share of desks not free to take, 0.0 for an empty floor.
    pub fn occupancy_rate(&self) -> f64 {
        if self.spots.is_empty() {
            0.0
        } else {
            1.0 - (self.available_spots() as f64 / self.total_spots() as f64)
        }
    }

    /// Available desks among those the filters leave visible.
    pub fn available_visible(&self, filters: &FilterSet) -> usize {
        apply_filter(&self.spots, filters)
            .into_iter()
            .filter(|spot| spot.is_available())
            .count()
    }

    pub fn spot(&self, id: &SpotId) -> Option<&Spot> {
        self.spots.iter().find(|s| &s.id == id)
    }

    pub fn spot_mut(&mut self, id: &SpotId) -> Option<&mut Spot> {
        self.spots.iter_mut().find(|s| &s.id == id)
    }

    pub fn summary(&self) -> FloorSummary {
        FloorSummary {
            id: self.id.clone(),
            number: self.number,
            name: self.name.clone(),
            total_spots: self.total_spots(),
            available_spots: self.available_spots(),
            occupied_spots: self.occupied_spots(),
            on_hold_spots: self.on_hold_spots(),
        }
    }

    fn count(&self, kind: StatusKind) -> usize {
        self.spots.iter().filter(|s| s.kind() == kind).count()
    }
}

/// Snapshot of a floor's counts for the floor selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSummary {
    pub id: String,
    pub number: u32,
    pub name: String,
    pub total_spots: usize,
    pub available_spots: usize,
    pub occupied_spots: usize,
    pub on_hold_spots: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterId;
    use crate::spot::{Feature, Hold, Position, SpotStatus, Zone};
    use chrono::{Duration, Utc};

    fn floor() -> Floor {
        let origin = Position { x: 0.0, y: 0.0 };
        Floor::new(
            "floor-1",
            1,
            "Ground Floor",
            vec![
                Spot::new("1A", "1A", origin, Zone::Silent, [Feature::Window]),
                Spot::new("1B", "1B", origin, Zone::Group, [Feature::Whiteboard])
                    .with_status(SpotStatus::Occupied),
                Spot::new("1C", "1C", origin, Zone::Silent, []),
                Spot::new("1D", "1D", origin, Zone::Collaborative, []),
            ],
        )
    }

    #[test]
    fn test_counts_track_mutations() {
        let mut floor = floor();
        assert_eq!(floor.total_spots(), 4);
        assert_eq!(floor.available_spots(), 3);

        let now = Utc::now();
        floor
            .spot_mut(&SpotId::from("1A"))
            .unwrap()
            .place_hold(Hold::new("student", now, now + Duration::minutes(15)));

        let summary = floor.summary();
        assert_eq!(summary.available_spots, 2);
        assert_eq!(summary.on_hold_spots, 1);
        assert_eq!(summary.occupied_spots, 1);
        assert!((floor.occupancy_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_available_visible_respects_filters() {
        let floor = floor();
        let silent: FilterSet = [FilterId::Zone(Zone::Silent)].into_iter().collect();
        assert_eq!(floor.available_visible(&silent), 2);
        assert_eq!(floor.available_visible(&FilterSet::default()), 3);
    }
}
