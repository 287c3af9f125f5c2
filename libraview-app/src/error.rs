use libraview_catalog::CatalogError;
use libraview_core::{CoreError, StatusKind};

use crate::messages::UserMessage;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Dismissable message for the view layer
    pub fn user_message(&self) -> UserMessage {
        match self {
            AppError::Core(CoreError::UnrecognizedCode(_)) => UserMessage::new(
                "Invalid QR Code",
                "This QR code is not recognized by Libraview. Please scan a valid desk QR code.",
            ),
            AppError::Core(CoreError::NotFound(desk)) => UserMessage::new(
                "Desk Not Found",
                format!("Desk {} does not exist in this library.", desk),
            ),
            AppError::Core(CoreError::InvalidState { spot, expected, actual }) => match expected {
                StatusKind::Available => UserMessage::new(
                    "Spot Unavailable",
                    format!("Desk {} is {} right now. Please choose another spot.", spot, actual),
                ),
                StatusKind::OnHold => UserMessage::new(
                    "No Active Reservation",
                    format!("Desk {} is {}. Reserve it before checking in.", spot, actual),
                ),
                StatusKind::Occupied => UserMessage::new(
                    "Not Checked In",
                    format!("Desk {} is {}, so there is nothing to check out.", spot, actual),
                ),
            },
            AppError::Core(CoreError::UnknownFilter(id)) => UserMessage::new(
                "Unknown Filter",
                format!("\"{}\" is not a filter Libraview knows about.", id),
            ),
            AppError::Catalog(err) => {
                tracing::error!("Catalog error: {}", err);
                UserMessage::new("Something Went Wrong", "The seat map could not be loaded.")
            }
            AppError::Config(err) => {
                tracing::error!("Configuration error: {}", err);
                UserMessage::new("Something Went Wrong", "Libraview is not configured correctly.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_code_message() {
        let err = AppError::from(CoreError::UnrecognizedCode("garbage".to_string()));
        assert_eq!(err.user_message().title, "Invalid QR Code");
    }

    #[test]
    fn test_invalid_state_message_names_desk() {
        let err = AppError::from(CoreError::InvalidState {
            spot: "1B".to_string(),
            expected: StatusKind::Available,
            actual: StatusKind::Occupied,
        });
        let message = err.user_message();
        assert_eq!(message.title, "Spot Unavailable");
        assert!(message.body.contains("Desk 1B is occupied"));
    }
}
