//! Shared state for the Telegram bot.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use tracker_core::{
    parse_task, AppendAck, BotConfig, SheetInfo, SheetWriter, SheetsError, TaskEntry,
};

/// Result of handling one task message.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The entry was appended to the sheet.
    Recorded {
        /// The persisted entry.
        entry: TaskEntry,
        /// Task description with status keywords stripped.
        description: String,
        /// Where the row landed.
        ack: AppendAck,
    },
    /// Too little text to record; nothing was written.
    TooShort,
    /// The sheet write failed.
    Failed(SheetsError),
}

/// Result of a `/status` liveness check.
#[derive(Debug)]
pub struct StatusReport {
    /// Spreadsheet metadata, or why it could not be read.
    pub connection: std::result::Result<SheetInfo, SheetsError>,
    /// When the check ran.
    pub checked_at: DateTime<Utc>,
    /// Seconds since the bot started.
    pub uptime_seconds: u64,
}

impl StatusReport {
    /// Whether the sheet is reachable with the configured credentials.
    pub fn is_connected(&self) -> bool {
        self.connection.is_ok()
    }
}

/// State shared by every handler. Read-only after construction.
pub struct BotState {
    /// Process-wide configuration.
    config: Arc<BotConfig>,
    /// Destination for task entries.
    writer: Arc<dyn SheetWriter>,
    /// Bot start time for uptime reporting.
    started_at: Instant,
}

impl BotState {
    /// Create state from configuration and a sheet writer.
    pub fn new(config: Arc<BotConfig>, writer: Arc<dyn SheetWriter>) -> Self {
        Self {
            config,
            writer,
            started_at: Instant::now(),
        }
    }

    /// The bot configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Seconds since the bot started.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Classify a message and append it to the sheet.
    ///
    /// Failures are logged and returned as an outcome; nothing is retried.
    pub async fn record_task(
        &self,
        chat_id: i64,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> TaskOutcome {
        let parsed = parse_task(text);
        if parsed.is_too_short() {
            debug!(chat_id = %chat_id, "Task text too short, asking for details");
            return TaskOutcome::TooShort;
        }

        let entry = TaskEntry::new(timestamp, text.trim(), chat_id.to_string());
        match self.writer.append(&entry).await {
            Ok(ack) => {
                info!(
                    chat_id = %chat_id,
                    status = %entry.status,
                    row = ?ack.row,
                    "Task recorded"
                );
                TaskOutcome::Recorded {
                    entry,
                    description: parsed.description,
                    ack,
                }
            }
            Err(e) => {
                error!(chat_id = %chat_id, kind = e.kind(), error = %e, "Failed to record task");
                TaskOutcome::Failed(e)
            }
        }
    }

    /// Run the liveness check against the sheet.
    pub async fn check_status(&self) -> StatusReport {
        let connection = self.writer.check_connection().await;
        if let Err(e) = &connection {
            warn!(kind = e.kind(), error = %e, "Sheet connectivity check failed");
        }

        StatusReport {
            connection,
            checked_at: Utc::now(),
            uptime_seconds: self.uptime_seconds(),
        }
    }
}

/// Create a shared state wrapped in Arc for use across handlers.
pub fn create_shared_state(config: Arc<BotConfig>, writer: Arc<dyn SheetWriter>) -> Arc<BotState> {
    Arc::new(BotState::new(config, writer))
}
