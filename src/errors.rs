//! Error type shared by the store, the grammar checker and the editor.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong inside the diary.
///
/// The UI turns each of these into a transient notice; none of them leave the
/// entry collection half-mutated.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// The user tried to save something that cannot be saved (e.g. empty content).
    #[error("{0}")]
    Validation(String),

    /// The grammar service is not configured (missing API key, bad timeout value).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The grammar service answered with a failure or could not be reached.
    #[error("Grammar check failed: {0}")]
    RemoteService(String),

    /// The grammar service did not answer in time.
    #[error("Grammar check timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Reading or writing the snapshot failed.
    #[error("Failed to access diary storage '{key}': {source}")]
    Persistence {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode diary snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("No diary entry with id {0}")]
    NotFound(String),
}

impl DiaryError {
    pub fn persistence(key: impl Into<String>, source: io::Error) -> Self {
        DiaryError::Persistence {
            key: key.into(),
            source,
        }
    }
}

pub type DiaryResult<T> = Result<T, DiaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = DiaryError::Validation("Please write your diary entry".to_string());
        assert_eq!(err.to_string(), "Please write your diary entry");
    }

    #[test]
    fn persistence_error_names_the_key() {
        let err = DiaryError::persistence(
            "diaryEntries",
            io::Error::new(io::ErrorKind::Other, "quota exceeded"),
        );
        let message = err.to_string();
        assert!(message.contains("diaryEntries"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = DiaryError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Grammar check timed out after 30s");
    }
}
