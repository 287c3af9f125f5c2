pub mod error;
pub mod messages;
pub mod scanner;
pub mod state;

pub use error::{AppError, AppResult};
pub use messages::UserMessage;
pub use scanner::mock_scan_code;
pub use state::SeatFinder;
