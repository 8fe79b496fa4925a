//! Google Sheets persistence.
//!
//! [`SheetWriter`] is the seam the bot talks to. [`SheetsClient`] implements
//! it against the Sheets API v4, authenticating through a [`TokenProvider`].

pub mod auth;
pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::task::TaskEntry;

pub use auth::{ServiceAccountAuth, StaticToken, TokenProvider, SHEETS_SCOPE};
pub use client::{a1_range, SheetsClient, SHEETS_API_BASE};

/// Acknowledgement of an appended row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendAck {
    /// A1 range the API reports as written, e.g. `Sheet1!A7:C7`.
    pub updated_range: String,
    /// 1-based row number, when it can be read from the range.
    pub row: Option<u32>,
}

impl AppendAck {
    /// Build an acknowledgement from the range reported by the API.
    pub fn from_range(updated_range: impl Into<String>) -> Self {
        let updated_range = updated_range.into();
        let row = row_of_range(&updated_range);
        Self { updated_range, row }
    }
}

/// Spreadsheet identity returned by the liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    /// Spreadsheet id.
    pub spreadsheet_id: String,
    /// Document title.
    pub title: String,
}

/// Appends task entries to a spreadsheet.
///
/// Implementations surface failures to the caller and never retry.
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Append one row for `entry`.
    async fn append(&self, entry: &TaskEntry) -> Result<AppendAck>;

    /// Cheap authenticated read proving the credentials and sheet work.
    async fn check_connection(&self) -> Result<SheetInfo>;
}

/// Row number of the first cell in an A1 range (`'Tab'!A7:C7` -> 7).
fn row_of_range(range: &str) -> Option<u32> {
    let cells = range.rsplit('!').next()?;
    let first = cells.split(':').next()?;
    let digits: String = first
        .chars()
        .skip_while(|c| c.is_ascii_alphabetic())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
