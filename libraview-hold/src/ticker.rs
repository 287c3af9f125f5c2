//! Cancellable once-per-period countdown task for a single hold.

use libraview_core::SpotId;
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;
use uuid::Uuid;

use crate::countdown::{format_remaining, TimeBand};
use crate::timer::TickOutcome;

/// Owner of held spots that the countdown task ticks.
pub trait HoldTarget: Send + Sync + 'static {
    /// Advance the countdown of `hold_id` on `spot_id`. Must return
    /// [`TickOutcome::Inactive`] when that hold is no longer on the spot.
    fn tick_hold(&self, spot_id: &SpotId, hold_id: Uuid) -> TickOutcome;
}

/// Remaining time pushed to subscribers after every tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownUpdate {
    pub spot_id: SpotId,
    pub hold_id: Uuid,
    pub remaining_seconds: i64,
    pub band: TimeBand,
    pub expired: bool,
}

impl CountdownUpdate {
    fn new(spot_id: &SpotId, hold_id: Uuid, remaining_seconds: i64) -> Self {
        Self {
            spot_id: spot_id.clone(),
            hold_id,
            remaining_seconds: remaining_seconds.max(0),
            band: TimeBand::classify(remaining_seconds),
            expired: remaining_seconds <= 0,
        }
    }

    /// `MM:SS` text for the countdown display.
    pub fn display(&self) -> String {
        format_remaining(self.remaining_seconds)
    }
}

/// Handle to a running countdown. Dropping it stops the task.
#[derive(Debug)]
pub struct Countdown {
    spot_id: SpotId,
    hold_id: Uuid,
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn spot_id(&self) -> &SpotId {
        &self.spot_id
    }

    pub fn hold_id(&self) -> Uuid {
        self.hold_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        // Drop aborts the task
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Stopping countdown for hold {} on spot {}", self.hold_id, self.spot_id);
        }
        self.handle.abort();
    }
}

/// Start ticking `hold_id` every `period` on the current tokio runtime.
///
/// The task holds `target` weakly and ends on expiry, when the hold is gone, or
/// when the target has been dropped.
pub fn spawn_countdown<T: HoldTarget>(
    target: &Arc<T>,
    spot_id: SpotId,
    hold_id: Uuid,
    period: Duration,
    updates: broadcast::Sender<CountdownUpdate>,
) -> Countdown {
    let target: Weak<T> = Arc::downgrade(target);
    let task_spot = spot_id.clone();

    let handle = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("Countdown started for hold {} on spot {}", hold_id, task_spot);

        loop {
            interval.tick().await;

            let Some(owner) = target.upgrade() else {
                break;
            };
            let outcome = owner.tick_hold(&task_spot, hold_id);
            drop(owner);

            match outcome {
                TickOutcome::Running { remaining_seconds } => {
                    let _ = updates.send(CountdownUpdate::new(&task_spot, hold_id, remaining_seconds));
                }
                TickOutcome::Expired(_) => {
                    let _ = updates.send(CountdownUpdate::new(&task_spot, hold_id, 0));
                    break;
                }
                TickOutcome::Inactive => break,
            }
        }

        debug!("Countdown finished for hold {} on spot {}", hold_id, task_spot);
    });

    Countdown {
        spot_id,
        hold_id,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use crate::timer::HoldManager;
    use libraview_core::{Position, Spot, Zone};
    use std::sync::Mutex;
    use tokio::sync::broadcast::error::TryRecvError;

    struct SingleDesk {
        spot: Mutex<Spot>,
        holds: HoldManager,
    }

    impl HoldTarget for SingleDesk {
        fn tick_hold(&self, spot_id: &SpotId, hold_id: Uuid) -> TickOutcome {
            let mut spot = self.spot.lock().unwrap();
            if &spot.id != spot_id || spot.hold().map(|h| h.id) != Some(hold_id) {
                return TickOutcome::Inactive;
            }
            self.holds.tick(&mut spot)
        }
    }

    fn desk(seconds: i64) -> (Arc<SingleDesk>, Uuid) {
        let holds = HoldManager::with_duration(Arc::new(TokioClock::new()), chrono::Duration::seconds(seconds));
        let mut spot = Spot::new("1A", "1A", Position { x: 0.0, y: 0.0 }, Zone::Silent, []);
        let hold = holds.start_hold(&mut spot, "student").unwrap();
        (Arc::new(SingleDesk { spot: Mutex::new(spot), holds }), hold.id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_expiry() {
        let (target, hold_id) = desk(3);
        let (tx, mut rx) = broadcast::channel(16);
        let countdown = spawn_countdown(&target, SpotId::from("1A"), hold_id, Duration::from_secs(1), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.remaining_seconds, 2);
        assert_eq!(first.display(), "00:02");
        assert_eq!(rx.recv().await.unwrap().remaining_seconds, 1);

        let last = rx.recv().await.unwrap();
        assert!(last.expired);
        assert_eq!(last.band, TimeBand::Critical);

        assert!(target.spot.lock().unwrap().is_available());
        for _ in 0..10 {
            if countdown.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_ticks() {
        let (target, hold_id) = desk(900);
        let (tx, mut rx) = broadcast::channel(16);
        let countdown = spawn_countdown(&target, SpotId::from("1A"), hold_id, Duration::from_secs(1), tx);

        assert_eq!(rx.recv().await.unwrap().remaining_seconds, 899);
        countdown.cancel();

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty) | Err(TryRecvError::Closed)));
        assert!(target.spot.lock().unwrap().hold().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_hold_id_stops_task() {
        let (target, _hold_id) = desk(900);
        let (tx, mut rx) = broadcast::channel(16);
        let countdown = spawn_countdown(&target, SpotId::from("1A"), Uuid::new_v4(), Duration::from_secs(1), tx);

        tokio::time::advance(Duration::from_secs(1)).await;
        for _ in 0..10 {
            if countdown.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(countdown.is_finished());
        assert!(rx.try_recv().is_err());
        assert!(target.spot.lock().unwrap().hold().is_some());
    }
}
