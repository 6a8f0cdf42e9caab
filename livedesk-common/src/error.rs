// ================================================================
// File: livedesk-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Visitor or message-context lookup missed. Callers render the menu.
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Outbound send/edit failed. Logged and swallowed by the dispatcher.
    #[error("Transport delivery error: {0}")]
    TransportDelivery(String),

    /// Entities could not be decoded into a navigation command.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The version-checked write kept losing the race.
    #[error("Concurrent update conflict for visitor '{visitor_id}' after {attempts} attempts")]
    ConcurrentUpdateConflict { visitor_id: String, attempts: u32 },

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),
}

impl Error {
    /// True for lookups that should degrade to a default view.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_chrono_errors_become_parse() {
        assert!(matches!(Error::from("bad id"), Error::Parse(s) if s == "bad id"));
        assert!(matches!(Error::from(String::from("x")), Error::Parse(_)));

        let chrono_err = chrono::NaiveDate::parse_from_str("not a date", "%Y-%m-%d").unwrap_err();
        assert!(matches!(Error::from(chrono_err), Error::Parse(_)));
        assert!(!Error::Parse("x".into()).is_not_found());
        assert!(Error::NotFound("x".into()).is_not_found());
    }
}
