//! The task entry written to the spreadsheet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, TaskStatus};

/// Format used for the timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row written to an empty worksheet.
pub const HEADER_ROW: [&str; 3] = ["Timestamp", "Task", "Status"];

/// One classified task update.
///
/// Built once per inbound message and persisted as a single row. Entries are
/// never mutated or deleted after they are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Message text exactly as received.
    pub raw_text: String,
    /// Inferred status.
    pub status: TaskStatus,
    /// Chat the update came from.
    pub source_chat_id: String,
}

impl TaskEntry {
    /// Classify `raw_text` and build an entry.
    pub fn new(
        timestamp: DateTime<Utc>,
        raw_text: impl Into<String>,
        source_chat_id: impl Into<String>,
    ) -> Self {
        let raw_text = raw_text.into();
        let status = classify(&raw_text);
        Self {
            timestamp,
            raw_text,
            status,
            source_chat_id: source_chat_id.into(),
        }
    }

    /// Spreadsheet row: `[timestamp, task text, status]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.raw_text.clone(),
            self.status.label().to_string(),
        ]
    }
}
