use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriScoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The request never completed (DNS, connect, TLS, reset...).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request completed with a status outside 2xx. `reason` is empty
    /// for codes without a canonical reason phrase.
    #[error("Request failed: {status}{}", reason_suffix(.reason))]
    Protocol { status: u16, reason: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl AgriScoreError {
    pub fn protocol(status: u16, reason: impl Into<String>) -> Self {
        AgriScoreError::Protocol {
            status,
            reason: reason.into(),
        }
    }

    /// True for failures raised by the remote backend rather than local I/O.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AgriScoreError::Transport(_) | AgriScoreError::Protocol { .. } | AgriScoreError::Decode(_)
        )
    }
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(" {}", reason)
    }
}

pub type Result<T> = std::result::Result<T, AgriScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_message_folds_status_and_reason() {
        let err = AgriScoreError::protocol(500, "Internal Server Error");
        assert_eq!(err.to_string(), "Request failed: 500 Internal Server Error");
        assert!(err.is_remote());
    }

    #[test]
    fn protocol_message_without_reason_has_no_trailing_space() {
        let err = AgriScoreError::protocol(599, "");
        assert_eq!(err.to_string(), "Request failed: 599");
    }

    #[test]
    fn transport_message_carries_detail() {
        let err = AgriScoreError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "Request failed: connection refused");
        assert!(err.is_remote());
    }

    #[test]
    fn local_errors_are_not_remote() {
        let err = AgriScoreError::Config("missing base_url".into());
        assert!(!err.is_remote());
    }
}
