pub mod app_config;
pub mod history;

pub use app_config::Config;
pub use history::{HistoryEntry, SessionHistory, SessionOutcome};
