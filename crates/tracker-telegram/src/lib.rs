//! Telegram bot that records daily task updates in Google Sheets.
//!
//! Every plain-text message is classified as Done, In Progress or Unknown and
//! appended to the configured spreadsheet as `[timestamp, task, status]`.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `GOOGLE_SHEETS_ID`: Spreadsheet id
//! - `GOOGLE_SHEETS_CREDENTIALS`: Service-account JSON, inline or a file path
//!
//! Optional:
//! - `PORT`: Health check and webhook port (default: 8000)
//! - `WEBHOOK_URL` / `RAILWAY_PUBLIC_DOMAIN`: Public base URL; enables webhook mode
//! - `GOOGLE_SHEETS_WORKSHEET`: Target worksheet (default: Sheet1)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracker_core::{BotConfig, SheetsClient};
//! use tracker_telegram::{create_shared_state, TaskBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(BotConfig::from_env()?);
//!     let client = SheetsClient::from_config(&config)?;
//!     let state = create_shared_state(config, Arc::new(client));
//!
//!     TaskBot::new(state).run(false).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Welcome message and usage
//! - `/help` - Show available commands
//! - `/status` - Check the Google Sheets connection

pub mod bot;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use bot::TaskBot;
pub use error::{Result, TelegramError};
pub use handlers::Command;
pub use server::{health_router, HealthResponse};
pub use state::{create_shared_state, BotState, StatusReport, TaskOutcome};
