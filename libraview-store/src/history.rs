use chrono::{DateTime, Duration, Utc};
use libraview_core::SpotId;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionOutcome {
    Completed,
    Cancelled,
    Expired,
}

/// One finished hold or desk stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub desk_number: String,
    pub floor_number: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub outcome: SessionOutcome,
}

impl HistoryEntry {
    pub fn duration(&self) -> Duration {
        self.ended_at - self.started_at
    }

    /// e.g. `2h 05m`, or `12m` under an hour
    pub fn duration_label(&self) -> String {
        let minutes = self.duration().num_minutes().max(0);
        if minutes >= 60 {
            format!("{}h {:02}m", minutes / 60, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

#[derive(Debug, Clone)]
struct OpenStay {
    desk_number: String,
    floor_number: u32,
    started_at: DateTime<Utc>,
}

/// In-memory record of this session's desk usage, newest first.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    open_stays: HashMap<SpotId, OpenStay>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hold ended without a check-in.
    pub fn record_hold(
        &mut self,
        desk_number: &str,
        floor_number: u32,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        outcome: SessionOutcome,
    ) {
        self.push(HistoryEntry {
            desk_number: desk_number.to_string(),
            floor_number,
            started_at,
            ended_at,
            outcome,
        });
    }

    /// Check-in: the stay stays open until checkout.
    pub fn open_stay(&mut self, spot_id: SpotId, desk_number: &str, floor_number: u32, at: DateTime<Utc>) {
        self.open_stays.insert(
            spot_id,
            OpenStay {
                desk_number: desk_number.to_string(),
                floor_number,
                started_at: at,
            },
        );
    }

    /// Checkout. Desks occupied before this session have no open stay.
    pub fn close_stay(&mut self, spot_id: &SpotId, at: DateTime<Utc>) -> Option<HistoryEntry> {
        let stay = self.open_stays.remove(spot_id)?;
        let entry = HistoryEntry {
            desk_number: stay.desk_number,
            floor_number: stay.floor_number,
            started_at: stay.started_at,
            ended_at: at,
            outcome: SessionOutcome::Completed,
        };
        self.push(entry.clone());
        Some(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: HistoryEntry) {
        debug!("History: desk {} {:?} after {}", entry.desk_number, entry.outcome, entry.duration_label());
        self.entries.push_front(entry);
    }
}
