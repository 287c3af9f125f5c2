use futures_util::{Stream, StreamExt};
use libraview_catalog::Library;
use libraview_checkin::{CheckInResolver, ScanResult};
use libraview_core::{apply_filter, Clock, CoreError, FilterSet, Floor, FloorSummary, Hold, Spot, SpotId};
use libraview_hold::{spawn_countdown, Countdown, CountdownUpdate, HoldManager, HoldOutcome, HoldTarget, TickOutcome, TokioClock};
use libraview_shared::{Masked, SpotEvent};
use libraview_store::{Config, HistoryEntry, SessionHistory, SessionOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppResult;

const CHANNEL_CAPACITY: usize = 100;

/// The seat-finder engine behind the screens.
///
/// All operations are synchronous. Holds started inside a tokio runtime get a
/// countdown task that ticks once per `tick_period`, and a sweeper task expires
/// the remaining holds (seeded ones, or ours after [`SeatFinder::leave`]).
/// Outside a runtime the view drives expiry through [`SeatFinder::tick`] or
/// [`SeatFinder::sweep_expired`].
#[derive(Clone)]
pub struct SeatFinder {
    inner: Arc<Inner>,
}

struct Inner {
    library: Mutex<Library>,
    holds: HoldManager,
    countdowns: Mutex<HashMap<SpotId, Countdown>>,
    resolver: Mutex<CheckInResolver>,
    history: Mutex<SessionHistory>,
    events: broadcast::Sender<SpotEvent>,
    updates: broadcast::Sender<CountdownUpdate>,
    user_id: String,
    tick_period: Duration,
}

impl SeatFinder {
    pub fn new(library: Library, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (updates, _) = broadcast::channel(CHANNEL_CAPACITY);

        let finder = Self {
            inner: Arc::new(Inner {
                library: Mutex::new(library),
                holds: HoldManager::with_duration(clock, config.hold.hold_duration()),
                countdowns: Mutex::new(HashMap::new()),
                resolver: Mutex::new(CheckInResolver::new(config.checkin.policy)),
                history: Mutex::new(SessionHistory::new()),
                events,
                updates,
                user_id: config.user.id.clone(),
                tick_period: config.hold.tick_period(),
            }),
        };

        if tokio::runtime::Handle::try_current().is_ok() {
            spawn_sweeper(&finder.inner);
        }
        finder
    }

    /// Bundled catalog on a tokio-driven clock.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let clock = Arc::new(TokioClock::new());
        let library = libraview_catalog::load_default(clock.now())?;
        Ok(Self::new(library, config, clock))
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    pub fn floors(&self) -> Vec<FloorSummary> {
        lock(&self.inner.library).summaries()
    }

    pub fn floor(&self, number: u32) -> AppResult<Floor> {
        lock(&self.inner.library)
            .floor(number)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("floor {}", number)).into())
    }

    pub fn spot(&self, spot_id: &SpotId) -> Option<Spot> {
        lock(&self.inner.library).spot(spot_id).cloned()
    }

    /// Spots on `floor_number` left visible by `filters`, in floor order.
    pub fn visible_spots(&self, floor_number: u32, filters: &FilterSet) -> AppResult<Vec<Spot>> {
        let library = lock(&self.inner.library);
        let floor = library
            .floor(floor_number)
            .ok_or_else(|| CoreError::NotFound(format!("floor {}", floor_number)))?;
        Ok(apply_filter(&floor.spots, filters).into_iter().cloned().collect())
    }

    pub fn start_hold(&self, spot_id: &SpotId) -> AppResult<Hold> {
        let inner = &self.inner;
        let mut library = lock(&inner.library);
        let spot = library.get_mut(spot_id)?;
        let hold = inner.holds.start_hold(spot, &inner.user_id)?;

        let _ = inner.events.send(SpotEvent::HoldStarted {
            spot_id: spot_id.to_string(),
            desk_number: spot.desk_number.clone(),
            hold_id: hold.id,
            reserved_by: Masked(hold.reserved_by.clone()),
            expires_at: SpotEvent::stamp(hold.expires_at),
        });

        self.start_countdown(spot_id, hold.id);
        Ok(hold)
    }

    pub fn cancel_hold(&self, spot_id: &SpotId) -> AppResult<HoldOutcome> {
        let inner = &self.inner;
        let mut library = lock(&inner.library);
        let spot = library.get_mut(spot_id)?;
        let outcome = inner.holds.cancel_hold(spot)?;
        let desk_number = spot.desk_number.clone();
        let floor_number = library.floor_of(spot_id).unwrap_or_default();

        inner.finish_hold(spot_id, &desk_number, floor_number, &outcome);
        Ok(outcome)
    }

    /// One countdown step driven by the caller instead of the countdown task.
    pub fn tick(&self, spot_id: &SpotId) -> AppResult<TickOutcome> {
        if lock(&self.inner.library).spot(spot_id).is_none() {
            return Err(CoreError::NotFound(spot_id.to_string()).into());
        }
        Ok(self.inner.tick_spot(spot_id, None))
    }

    /// Seconds left on the spot's hold, if it is on hold.
    pub fn remaining(&self, spot_id: &SpotId) -> Option<i64> {
        let library = lock(&self.inner.library);
        library.spot(spot_id).and_then(|spot| self.inner.holds.remaining(spot))
    }

    /// Expire every hold whose deadline has passed, seeded ones included.
    /// Holds with a running countdown are left to it.
    pub fn sweep_expired(&self) -> Vec<HoldOutcome> {
        self.inner.sweep_expired()
    }

    pub fn resolve_scan(&self, code: &str) -> AppResult<ScanResult> {
        let inner = &self.inner;
        let mut library = lock(&inner.library);
        let result = lock(&inner.resolver).resolve_scan(code, &mut library)?;
        let now = inner.holds.clock().now();

        match &result {
            ScanResult::CheckedIn { spot_id, desk_number, released_hold } => {
                if let Some(hold) = released_hold {
                    inner.stop_countdown(spot_id, hold.id);
                }
                let floor_number = library.floor_of(spot_id).unwrap_or_default();
                lock(&inner.history).open_stay(spot_id.clone(), desk_number, floor_number, now);
                let _ = inner.events.send(SpotEvent::CheckedIn {
                    spot_id: spot_id.to_string(),
                    desk_number: desk_number.clone(),
                    timestamp: SpotEvent::stamp(now),
                });
            }
            ScanResult::CheckedOut { spot_id, desk_number } => {
                lock(&inner.history).close_stay(spot_id, now);
                let _ = inner.events.send(SpotEvent::CheckedOut {
                    spot_id: spot_id.to_string(),
                    desk_number: desk_number.clone(),
                    timestamp: SpotEvent::stamp(now),
                });
            }
            ScanResult::Ignored => {}
        }

        Ok(result)
    }

    /// Accept scans again once the result has been dismissed.
    pub fn rearm_scanner(&self) {
        lock(&self.inner.resolver).rearm();
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SpotEvent> {
        self.inner.events.subscribe()
    }

    pub fn subscribe_countdowns(&self) -> broadcast::Receiver<CountdownUpdate> {
        self.inner.updates.subscribe()
    }

    /// Countdown updates for one spot only.
    pub fn countdown_stream(&self, spot_id: &SpotId) -> impl Stream<Item = CountdownUpdate> + Send + 'static {
        let spot_id = spot_id.clone();
        BroadcastStream::new(self.inner.updates.subscribe()).filter_map(move |result| {
            let spot_id = spot_id.clone();
            async move {
                match result {
                    Ok(update) if update.spot_id == spot_id => Some(update),
                    Ok(_) => None,
                    Err(e) => {
                        warn!("Countdown subscriber lagging: {}", e);
                        None
                    }
                }
            }
        })
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.inner.history).entries().cloned().collect()
    }

    /// Navigating away: stop every countdown task. Holds stay on their spots.
    pub fn leave(&self) {
        let stopped: Vec<Countdown> = lock(&self.inner.countdowns).drain().map(|(_, c)| c).collect();
        debug!("Leaving seat map, stopping {} countdowns", stopped.len());
    }

    /// Coming back: restart countdowns for this user's holds.
    pub fn resume(&self) {
        let holds: Vec<(SpotId, Uuid)> = {
            let library = lock(&self.inner.library);
            library
                .held_spots()
                .filter(|spot| spot.reserved_by() == Some(self.inner.user_id.as_str()))
                .filter_map(|spot| spot.hold().map(|hold| (spot.id.clone(), hold.id)))
                .collect()
        };

        for (spot_id, hold_id) in holds {
            self.start_countdown(&spot_id, hold_id);
        }
    }

    pub fn active_countdowns(&self) -> usize {
        lock(&self.inner.countdowns)
            .values()
            .filter(|c| !c.is_finished())
            .count()
    }

    fn start_countdown(&self, spot_id: &SpotId, hold_id: Uuid) {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No tokio runtime; hold {} on spot {} will not tick on its own", hold_id, spot_id);
            return;
        }

        let countdown = spawn_countdown(
            &self.inner,
            spot_id.clone(),
            hold_id,
            self.inner.tick_period,
            self.inner.updates.clone(),
        );
        lock(&self.inner.countdowns).insert(spot_id.clone(), countdown);
    }
}

impl Inner {
    fn sweep_expired(&self) -> Vec<HoldOutcome> {
        let due: Vec<SpotId> = {
            let library = lock(&self.library);
            let countdowns = lock(&self.countdowns);
            library
                .held_spots()
                .filter(|spot| self.holds.is_due(spot))
                .filter(|spot| countdowns.get(&spot.id).map_or(true, |c| c.is_finished()))
                .map(|spot| spot.id.clone())
                .collect()
        };

        due.iter()
            .filter_map(|spot_id| match self.tick_spot(spot_id, None) {
                TickOutcome::Expired(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    fn tick_spot(&self, spot_id: &SpotId, expected_hold: Option<Uuid>) -> TickOutcome {
        let mut library = lock(&self.library);
        let Some(spot) = library.spot_mut(spot_id) else {
            return TickOutcome::Inactive;
        };
        if expected_hold.is_some() && spot.hold().map(|h| h.id) != expected_hold {
            return TickOutcome::Inactive;
        }

        let outcome = self.holds.tick(spot);
        if let TickOutcome::Expired(ended) = &outcome {
            let desk_number = spot.desk_number.clone();
            let floor_number = library.floor_of(spot_id).unwrap_or_default();
            self.finish_hold(spot_id, &desk_number, floor_number, ended);
        }
        outcome
    }

    /// Bookkeeping shared by cancel and expiry. Caller holds the library lock.
    fn finish_hold(&self, spot_id: &SpotId, desk_number: &str, floor_number: u32, outcome: &HoldOutcome) {
        let hold = outcome.hold();
        let now = self.holds.clock().now();

        let (event, session) = match outcome {
            HoldOutcome::Cancelled(_) => (
                SpotEvent::HoldCancelled {
                    spot_id: spot_id.to_string(),
                    desk_number: desk_number.to_string(),
                    hold_id: hold.id,
                    timestamp: SpotEvent::stamp(now),
                },
                SessionOutcome::Cancelled,
            ),
            HoldOutcome::Expired(_) => (
                SpotEvent::HoldExpired {
                    spot_id: spot_id.to_string(),
                    desk_number: desk_number.to_string(),
                    hold_id: hold.id,
                    timestamp: SpotEvent::stamp(now),
                },
                SessionOutcome::Expired,
            ),
        };

        if hold.reserved_by == self.user_id {
            lock(&self.history).record_hold(desk_number, floor_number, hold.placed_at, now, session);
        }
        let _ = self.events.send(event);
        self.stop_countdown(spot_id, hold.id);
        info!("Desk {} released ({:?})", desk_number, session);
    }

    fn stop_countdown(&self, spot_id: &SpotId, hold_id: Uuid) {
        let mut countdowns = lock(&self.countdowns);
        if countdowns.get(spot_id).is_some_and(|c| c.hold_id() == hold_id) {
            countdowns.remove(spot_id);
        }
    }
}

impl HoldTarget for Inner {
    fn tick_hold(&self, spot_id: &SpotId, hold_id: Uuid) -> TickOutcome {
        self.tick_spot(spot_id, Some(hold_id))
    }
}

/// Periodic [`Inner::sweep_expired`] until the engine is dropped.
fn spawn_sweeper(inner: &Arc<Inner>) {
    let owner = Arc::downgrade(inner);
    let period = inner.tick_period;

    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let Some(inner) = owner.upgrade() else {
                break;
            };
            let expired = inner.sweep_expired();
            if !expired.is_empty() {
                debug!("Sweeper released {} expired holds", expired.len());
            }
        }
    });
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

