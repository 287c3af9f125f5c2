use chrono::{DateTime, Utc};
use libraview_core::Clock;
use tokio::time::Instant;

/// Wall clock that advances with tokio's timer.
///
/// Reads are `anchor + elapsed`, so a paused tokio runtime freezes it and
/// `tokio::time::advance` moves it.
#[derive(Debug, Clone)]
pub struct TokioClock {
    anchor_utc: DateTime<Utc>,
    anchor: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(anchor_utc: DateTime<Utc>) -> Self {
        Self {
            anchor_utc,
            anchor: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.anchor.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor_utc + elapsed
    }
}
