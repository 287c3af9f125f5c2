use serde::Serialize;

/// Render whole seconds as `MM:SS`. Negative input shows `00:00`.
pub fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Urgency band of a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBand {
    /// More than ten minutes left
    Comfortable,
    /// Five to ten minutes left
    Warning,
    /// Under five minutes left
    Critical,
}

impl TimeBand {
    pub fn classify(remaining_seconds: i64) -> Self {
        if remaining_seconds > 10 * 60 {
            TimeBand::Comfortable
        } else if remaining_seconds >= 5 * 60 {
            TimeBand::Warning
        } else {
            TimeBand::Critical
        }
    }
}
