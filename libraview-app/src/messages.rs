use libraview_checkin::ScanResult;
use libraview_core::Hold;
use libraview_hold::HoldOutcome;
use serde::Serialize;

/// Title and body of an alert shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub title: String,
    pub body: String,
}

impl UserMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn hold_started(desk_number: &str, hold: &Hold) -> Self {
        let minutes = (hold.expires_at - hold.placed_at).num_minutes();
        Self::new(
            "Spot Reserved!",
            format!("Desk {} is held for you for {} minutes.", desk_number, minutes),
        )
    }

    pub fn hold_ended(desk_number: &str, outcome: &HoldOutcome) -> Self {
        match outcome {
            HoldOutcome::Expired(_) => Self::new(
                "Reservation Expired",
                format!("Desk {} is now available to others.", desk_number),
            ),
            HoldOutcome::Cancelled(_) => Self::new(
                "Reservation Cancelled",
                format!("Desk {} has been released.", desk_number),
            ),
        }
    }

    /// `None` for ignored scans, which show nothing.
    pub fn scan(result: &ScanResult) -> Option<Self> {
        match result {
            ScanResult::CheckedIn { desk_number, .. } => Some(Self::new(
                "Scan Successful!",
                format!(
                    "You have successfully checked into Desk {}. Enjoy your study session!",
                    desk_number
                ),
            )),
            ScanResult::CheckedOut { desk_number, .. } => Some(Self::new(
                "Check-out Complete!",
                format!(
                    "You have successfully checked out from Desk {}. Thank you for using Libraview!",
                    desk_number
                ),
            )),
            ScanResult::Ignored => None,
        }
    }
}
