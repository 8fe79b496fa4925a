//! Error types for configuration and spreadsheet access.

use thiserror::Error;

/// Errors raised while loading `BotConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set or empty.
    #[error("{0} not set. Add it to the environment or the .env file.")]
    Missing(&'static str),

    /// An environment variable is set but unusable.
    #[error("Invalid {var}: {reason}")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors that can occur talking to Google Sheets.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Credentials rejected or token exchange failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Google endpoint unreachable or timed out.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Rate limited by the Sheets API.
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// Any other non-success response.
    #[error("Sheets API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by Google, or the raw body.
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Service-account key unusable (bad PEM, bad JSON).
    #[error("Invalid service account credentials: {0}")]
    Credentials(String),
}

impl SheetsError {
    /// Short label for logs and user-facing status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SheetsError::Auth(_) => "auth",
            SheetsError::Transport(_) => "transport",
            SheetsError::Quota(_) => "quota",
            SheetsError::Api { .. } => "api",
            SheetsError::Parse(_) => "parse",
            SheetsError::Credentials(_) => "credentials",
        }
    }

    /// Map a non-success HTTP status to an error.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => SheetsError::Auth(message),
            429 => SheetsError::Quota(message),
            _ => SheetsError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for SheetsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SheetsError::Parse(e.to_string())
        } else {
            SheetsError::Transport(e.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for SheetsError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        SheetsError::Credentials(e.to_string())
    }
}

/// Result type for spreadsheet operations.
pub type Result<T> = std::result::Result<T, SheetsError>;
