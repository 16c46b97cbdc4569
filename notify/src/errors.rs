// Error handling framework

use thiserror::Error;

/// Trigger computation errors
#[derive(Error, Debug, PartialEq)]
pub enum TriggerError {
    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Invalid time '{value}': {reason}")]
    InvalidTime { value: String, reason: String },

    #[error("Target moment is in the past or within the current second ({seconds_until}s away)")]
    PastOrImminent { seconds_until: i64 },
}

/// Host notification service errors
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Host rejected the scheduling request: {0}")]
    SubmissionRejected(String),

    #[error("Channel configuration failed: {0}")]
    ChannelSetupFailed(String),

    #[error("Host notification service unavailable: {0}")]
    Unavailable(String),
}

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document write failed: {0}")]
    WriteFailed(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

/// Form validation errors
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field value for {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

/// Errors surfaced by the record save flows
#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to schedule reminder notifications")]
    Scheduling,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_error_display() {
        let err = TriggerError::InvalidDate {
            value: "2024-13-01".to_string(),
            reason: "month out of range".to_string(),
        };
        assert!(err.to_string().contains("Invalid date '2024-13-01'"));
    }

    #[test]
    fn test_past_or_imminent_display() {
        let err = TriggerError::PastOrImminent { seconds_until: -61 };
        assert!(err.to_string().contains("-61s"));
    }

    #[test]
    fn test_validation_error_to_save_error() {
        let err = ValidationError::MissingField("name".to_string());
        let save_err: SaveError = err.into();
        assert!(matches!(save_err, SaveError::Validation(_)));
    }
}
