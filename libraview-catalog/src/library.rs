use libraview_core::{CoreError, CoreResult, Floor, FloorSummary, Spot, SpotId};
use std::collections::HashSet;

/// The in-memory seat map: every floor and its desks.
///
/// Spots are created once at load and never removed; only their status changes.
#[derive(Debug, Clone)]
pub struct Library {
    floors: Vec<Floor>,
}

impl Library {
    /// Validate and wrap a floor list.
    ///
    /// Spot ids must be unique, and so must desk numbers, since a scanned code names
    /// a desk without its floor.
    pub fn new(floors: Vec<Floor>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        let mut desks = HashSet::new();

        for spot in floors.iter().flat_map(|f| f.spots.iter()) {
            if !ids.insert(spot.id.clone()) {
                return Err(CatalogError::DuplicateSpotId(spot.id.to_string()));
            }
            if !desks.insert(spot.desk_number.clone()) {
                return Err(CatalogError::DuplicateDeskNumber(spot.desk_number.clone()));
            }
        }

        Ok(Self { floors })
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor(&self, number: u32) -> Option<&Floor> {
        self.floors.iter().find(|f| f.number == number)
    }

    pub fn summaries(&self) -> Vec<FloorSummary> {
        self.floors.iter().map(Floor::summary).collect()
    }

    pub fn spot(&self, id: &SpotId) -> Option<&Spot> {
        self.floors.iter().find_map(|f| f.spot(id))
    }

    pub fn spot_mut(&mut self, id: &SpotId) -> Option<&mut Spot> {
        self.floors.iter_mut().find_map(|f| f.spot_mut(id))
    }

    /// Like [`Library::spot_mut`] but reports a miss as [`CoreError::NotFound`].
    pub fn get_mut(&mut self, id: &SpotId) -> CoreResult<&mut Spot> {
        self.spot_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    pub fn find_by_desk(&self, desk_number: &str) -> Option<&Spot> {
        self.spots().find(|s| s.desk_number == desk_number)
    }

    pub fn find_by_desk_mut(&mut self, desk_number: &str) -> Option<&mut Spot> {
        self.floors
            .iter_mut()
            .flat_map(|f| f.spots.iter_mut())
            .find(|s| s.desk_number == desk_number)
    }

    /// Floor number a spot lives on.
    pub fn floor_of(&self, id: &SpotId) -> Option<u32> {
        self.floors
            .iter()
            .find(|f| f.spot(id).is_some())
            .map(|f| f.number)
    }

    pub fn spots(&self) -> impl Iterator<Item = &Spot> {
        self.floors.iter().flat_map(|f| f.spots.iter())
    }

    pub fn held_spots(&self) -> impl Iterator<Item = &Spot> {
        self.spots().filter(|s| s.hold().is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid catalog data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate spot id: {0}")]
    DuplicateSpotId(String),

    #[error("Duplicate desk number: {0}")]
    DuplicateDeskNumber(String),

    #[error("Spot {0} is on hold but has no hold duration")]
    MissingHoldMinutes(String),
}
