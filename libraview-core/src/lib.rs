pub mod clock;
pub mod filter;
pub mod floor;
pub mod scan;
pub mod spot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use filter::{apply_filter, toggle_filter, FilterId, FilterSet};
pub use floor::{Floor, FloorSummary};
pub use scan::{ScanAction, ScanCode};
pub use spot::{Feature, Hold, Position, Spot, SpotId, SpotStatus, StatusKind, Zone};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Spot {spot} is {actual}, expected {expected}")]
    InvalidState {
        spot: String,
        expected: StatusKind,
        actual: StatusKind,
    },
    #[error("Unrecognized code: {0}")]
    UnrecognizedCode(String),
    #[error("Spot not found: {0}")]
    NotFound(String),
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
