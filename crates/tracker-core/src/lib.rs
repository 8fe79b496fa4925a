//! Tracker Core - task classification and spreadsheet persistence.
//!
//! This crate holds everything the task tracker needs apart from the chat
//! transport:
//!
//! - **config**: Process-wide `BotConfig` loaded from the environment
//! - **classifier**: Keyword heuristic mapping message text to a status
//! - **task**: The `TaskEntry` written to the spreadsheet
//! - **sheets**: Google Sheets client, service-account auth and the
//!   `SheetWriter` seam used by the bot

pub mod classifier;
pub mod config;
pub mod error;
pub mod sheets;
pub mod task;

pub use classifier::{classify, parse_task, ParsedTask, TaskStatus, MIN_TASK_LEN};
pub use config::{BotConfig, ServiceAccountKey};
pub use error::{ConfigError, Result, SheetsError};
pub use sheets::{
    AppendAck, ServiceAccountAuth, SheetInfo, SheetWriter, SheetsClient, StaticToken,
    TokenProvider,
};
pub use task::TaskEntry;
