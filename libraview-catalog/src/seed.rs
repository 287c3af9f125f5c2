//! Static seed catalog.
//!
//! The fixture in `data/floors.json` is compiled into the crate. Desks seeded as
//! `on_hold` carry `hold_minutes`, which becomes a real hold expiring that long
//! after load.

use chrono::{DateTime, Duration, Utc};
use libraview_core::{Feature, Floor, Hold, Position, Spot, SpotStatus, StatusKind, Zone};
use serde::Deserialize;
use tracing::debug;

use crate::library::{CatalogError, Library};

const DEFAULT_CATALOG: &str = include_str!("../data/floors.json");

/// `reserved_by` of holds that come from the fixture rather than this client.
pub const SEED_HOLDER: &str = "another-student";

#[derive(Debug, Deserialize)]
struct SeedCatalog {
    floors: Vec<SeedFloor>,
}

#[derive(Debug, Deserialize)]
struct SeedFloor {
    id: String,
    number: u32,
    name: String,
    spots: Vec<SeedSpot>,
}

#[derive(Debug, Deserialize)]
struct SeedSpot {
    id: String,
    desk_number: String,
    position: Position,
    #[serde(default = "default_status")]
    status: StatusKind,
    #[serde(default)]
    features: Vec<Feature>,
    zone: Zone,
    hold_minutes: Option<i64>,
}

fn default_status() -> StatusKind {
    StatusKind::Available
}

/// Load the bundled catalog, anchoring seeded holds at `now`.
pub fn load_default(now: DateTime<Utc>) -> Result<Library, CatalogError> {
    load_json(DEFAULT_CATALOG, now)
}

pub fn load_json(json: &str, now: DateTime<Utc>) -> Result<Library, CatalogError> {
    let seed: SeedCatalog = serde_json::from_str(json)?;

    let floors = seed
        .floors
        .into_iter()
        .map(|floor| -> Result<Floor, CatalogError> {
            let spots = floor
                .spots
                .into_iter()
                .map(|spot| build_spot(spot, now))
                .collect::<Result<Vec<Spot>, CatalogError>>()?;
            Ok(Floor::new(floor.id, floor.number, floor.name, spots))
        })
        .collect::<Result<Vec<Floor>, CatalogError>>()?;

    let library = Library::new(floors)?;
    debug!(
        "Loaded catalog: {} floors, {} spots",
        library.floors().len(),
        library.spots().count()
    );
    Ok(library)
}

fn build_spot(seed: SeedSpot, now: DateTime<Utc>) -> Result<Spot, CatalogError> {
    let status = match seed.status {
        StatusKind::Available => SpotStatus::Available,
        StatusKind::Occupied => SpotStatus::Occupied,
        StatusKind::OnHold => {
            let minutes = seed
                .hold_minutes
                .ok_or_else(|| CatalogError::MissingHoldMinutes(seed.id.clone()))?;
            SpotStatus::OnHold(Hold::new(SEED_HOLDER, now, now + Duration::minutes(minutes)))
        }
    };

    Ok(Spot::new(seed.id, seed.desk_number, seed.position, seed.zone, seed.features).with_status(status))
}
