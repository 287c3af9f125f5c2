use std::fmt;
use std::str::FromStr;

use crate::CoreError;

const CHECK_IN_MARKER: &str = "LIBRAVIEW_DESK_";
const CHECK_OUT_MARKER: &str = "LIBRAVIEW_CHECKOUT_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    CheckIn,
    CheckOut,
}

impl ScanAction {
    fn marker(&self) -> &'static str {
        match self {
            ScanAction::CheckIn => CHECK_IN_MARKER,
            ScanAction::CheckOut => CHECK_OUT_MARKER,
        }
    }
}

/// A desk QR payload: `LIBRAVIEW_DESK_<desk>` or `LIBRAVIEW_CHECKOUT_<desk>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCode {
    pub action: ScanAction,
    pub desk_number: String,
}

impl ScanCode {
    pub fn check_in(desk_number: impl Into<String>) -> Self {
        Self {
            action: ScanAction::CheckIn,
            desk_number: desk_number.into(),
        }
    }

    pub fn check_out(desk_number: impl Into<String>) -> Self {
        Self {
            action: ScanAction::CheckOut,
            desk_number: desk_number.into(),
        }
    }
}

impl FromStr for ScanCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, desk) = if let Some(desk) = s.strip_prefix(CHECK_IN_MARKER) {
            (ScanAction::CheckIn, desk)
        } else if let Some(desk) = s.strip_prefix(CHECK_OUT_MARKER) {
            (ScanAction::CheckOut, desk)
        } else {
            return Err(CoreError::UnrecognizedCode(s.to_string()));
        };

        if desk.is_empty() || !desk.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(CoreError::UnrecognizedCode(s.to_string()));
        }

        Ok(Self {
            action,
            desk_number: desk.to_string(),
        })
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.action.marker(), self.desk_number)
    }
}
