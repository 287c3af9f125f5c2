pub mod clock;
pub mod countdown;
pub mod ticker;
pub mod timer;

pub use clock::TokioClock;
pub use countdown::{format_remaining, TimeBand};
pub use ticker::{spawn_countdown, Countdown, CountdownUpdate, HoldTarget};
pub use timer::{HoldManager, HoldOutcome, TickOutcome, DEFAULT_HOLD_MINUTES};
