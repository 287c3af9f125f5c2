use chrono::Duration;
use libraview_core::{Clock, CoreError, CoreResult, Hold, Spot, StatusKind};
use libraview_shared::Masked;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_HOLD_MINUTES: i64 = 15;

/// How a hold ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldOutcome {
    Cancelled(Hold),
    Expired(Hold),
}

impl HoldOutcome {
    pub fn hold(&self) -> &Hold {
        match self {
            HoldOutcome::Cancelled(hold) | HoldOutcome::Expired(hold) => hold,
        }
    }
}

/// Result of one countdown step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining_seconds: i64 },
    Expired(HoldOutcome),
    /// The spot holds nothing to count down
    Inactive,
}

/// Drives the available → on hold → available lifecycle of individual spots.
///
/// The manager keeps no per-spot state of its own: the hold lives on the spot,
/// so a spot can never carry a stale deadline after leaving `on_hold`.
#[derive(Debug, Clone)]
pub struct HoldManager {
    hold_duration: Duration,
    clock: Arc<dyn Clock>,
}

impl HoldManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_duration(clock, Duration::minutes(DEFAULT_HOLD_MINUTES))
    }

    pub fn with_duration(clock: Arc<dyn Clock>, hold_duration: Duration) -> Self {
        Self { hold_duration, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// Transition: Available → OnHold
    pub fn start_hold(&self, spot: &mut Spot, user_id: &str) -> CoreResult<Hold> {
        ensure(spot, StatusKind::Available)?;

        let now = self.clock.now();
        let hold = Hold::new(user_id, now, now + self.hold_duration);
        spot.place_hold(hold.clone());

        info!(
            "Hold {} placed on desk {} for {:?} until {}",
            hold.id,
            spot.desk_number,
            Masked(user_id),
            hold.expires_at
        );
        Ok(hold)
    }

    /// Transition: OnHold → Available, on user request
    pub fn cancel_hold(&self, spot: &mut Spot) -> CoreResult<HoldOutcome> {
        ensure(spot, StatusKind::OnHold)?;
        let hold = self.release(spot)?;
        info!("Hold {} on desk {} cancelled", hold.id, spot.desk_number);
        Ok(HoldOutcome::Cancelled(hold))
    }

    /// Transition: OnHold → Available, when the deadline passes
    pub fn expire(&self, spot: &mut Spot) -> CoreResult<HoldOutcome> {
        ensure(spot, StatusKind::OnHold)?;
        let hold = self.release(spot)?;
        info!("Hold {} on desk {} expired", hold.id, spot.desk_number);
        Ok(HoldOutcome::Expired(hold))
    }

    /// One countdown step. Expires the hold once its deadline is reached.
    pub fn tick(&self, spot: &mut Spot) -> TickOutcome {
        let now = self.clock.now();
        let Some(hold) = spot.hold() else {
            return TickOutcome::Inactive;
        };

        if !hold.is_due(now) {
            let remaining_seconds = hold.remaining_seconds(now);
            debug!("Desk {}: {}s left on hold", spot.desk_number, remaining_seconds);
            return TickOutcome::Running { remaining_seconds };
        }

        match self.expire(spot) {
            Ok(outcome) => TickOutcome::Expired(outcome),
            Err(_) => TickOutcome::Inactive,
        }
    }

    /// Whole seconds until the spot's hold expires, rounded up, if it has one.
    pub fn remaining(&self, spot: &Spot) -> Option<i64> {
        spot.hold()
            .map(|hold| hold.remaining_seconds(self.clock.now()))
    }

    /// The spot is on hold and its deadline has passed.
    pub fn is_due(&self, spot: &Spot) -> bool {
        spot.hold().is_some_and(|hold| hold.is_due(self.clock.now()))
    }

    fn release(&self, spot: &mut Spot) -> CoreResult<Hold> {
        spot.release().ok_or_else(|| invalid(spot, StatusKind::OnHold))
    }
}

fn ensure(spot: &Spot, expected: StatusKind) -> CoreResult<()> {
    if spot.kind() == expected {
        Ok(())
    } else {
        Err(invalid(spot, expected))
    }
}

fn invalid(spot: &Spot, expected: StatusKind) -> CoreError {
    CoreError::InvalidState {
        spot: spot.id.to_string(),
        expected,
        actual: spot.kind(),
    }
}
