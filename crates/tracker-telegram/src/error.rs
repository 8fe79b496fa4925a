//! Error types for the Telegram bot.

use thiserror::Error;
use tracker_core::{ConfigError, SheetsError};

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Required configuration missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Spreadsheet client could not be set up.
    #[error("Google Sheets error: {0}")]
    Sheets(#[from] SheetsError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Webhook registration failed.
    #[error("Failed to register webhook: {0}")]
    WebhookFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
