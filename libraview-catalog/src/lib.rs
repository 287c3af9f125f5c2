pub mod library;
pub mod options;
pub mod seed;

pub use library::{CatalogError, Library};
pub use options::{filter_options, FilterOption};
pub use seed::{load_default, load_json, SEED_HOLDER};
