//! Google Sheets API v4 client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::auth::{ServiceAccountAuth, TokenProvider};
use super::{AppendAck, SheetInfo, SheetWriter};
use crate::config::BotConfig;
use crate::error::{Result, SheetsError};
use crate::task::{TaskEntry, HEADER_ROW};

/// Sheets API endpoint.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Timeout applied to every Google API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Columns the tracker writes to.
const DATA_COLUMNS: &str = "A:C";

/// Cells holding the header row.
const HEADER_CELLS: &str = "A1:C1";

/// HTTP client shared by the Sheets client and the token exchange.
pub(crate) fn http_client() -> reqwest::Client {
    http_client_with_timeout(REQUEST_TIMEOUT)
}

fn http_client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, requests will have no timeout");
            reqwest::Client::new()
        })
}

/// A1 reference to `cells` on `worksheet`, with the worksheet name quoted.
///
/// `a1_range("Daily Log", "A:C")` is `'Daily Log'!A:C`.
pub fn a1_range(worksheet: &str, cells: &str) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), cells)
}

/// Pull Google's `error.message` out of an error body, else return it as is.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Client bound to a single spreadsheet and worksheet.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    auth: Arc<dyn TokenProvider>,
}

impl SheetsClient {
    /// Create a client for `spreadsheet_id`, appending to `worksheet`.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
        auth: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http: http_client(),
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            auth,
        }
    }

    /// Create a client authenticated with the configured service account.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let auth = ServiceAccountAuth::new(config.credentials.clone())?;
        info!(
            client_email = %auth.client_email(),
            worksheet = %config.worksheet,
            "Google Sheets client configured"
        );
        Ok(Self::new(
            config.sheet_id.clone(),
            config.worksheet.clone(),
            Arc::new(auth),
        ))
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Spreadsheet id this client writes to.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Build `<base>/<spreadsheet_id>/<segments...>`.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SheetsError::Transport(format!("invalid API base URL: {}", e)))?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                SheetsError::Transport(format!("API base URL cannot have a path: {}", self.base_url))
            })?;
            path.pop_if_empty().push(&self.spreadsheet_id);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Send an authenticated request and decode the JSON response.
    async fn call(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value> {
        let token = self.auth.access_token().await?;

        debug!("Google Sheets API: {} {}", method, url);

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SheetsError::from_status(
                status.as_u16(),
                api_error_message(&text),
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| SheetsError::Parse(e.to_string()))
    }

    /// Append one row after the existing data.
    ///
    /// Cells are stored verbatim (`RAW`); text starting with `=` stays text
    /// and is never evaluated as a formula.
    pub async fn append_row(&self, row: &[String]) -> Result<AppendAck> {
        let range = a1_range(&self.worksheet, DATA_COLUMNS);
        let mut url = self.url(&["values", &format!("{}:append", range)])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [row],
        });

        let parsed = self.call(Method::POST, url, Some(body)).await?;
        let updated_range = parsed["updates"]["updatedRange"]
            .as_str()
            .ok_or_else(|| SheetsError::Parse("append response has no updatedRange".to_string()))?;

        Ok(AppendAck::from_range(updated_range))
    }

    /// Read the cell values of `cells` on the worksheet.
    pub async fn read_range(&self, cells: &str) -> Result<Vec<Vec<String>>> {
        let range = a1_range(&self.worksheet, cells);
        let url = self.url(&["values", &range])?;
        let parsed = self.call(Method::GET, url, None).await?;

        Ok(parsed["values"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cols| {
                                cols.iter()
                                    .map(|c| match c {
                                        Value::String(s) => s.clone(),
                                        other => other.to_string(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Overwrite `cells` on the worksheet with `rows`, stored as typed.
    pub async fn write_range(&self, cells: &str, rows: &[Vec<String>]) -> Result<()> {
        let range = a1_range(&self.worksheet, cells);
        let mut url = self.url(&["values", &range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });

        self.call(Method::PUT, url, Some(body)).await?;
        Ok(())
    }

    /// Spreadsheet id and title.
    pub async fn metadata(&self) -> Result<SheetInfo> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "spreadsheetId,properties.title");

        let parsed = self.call(Method::GET, url, None).await?;
        Ok(SheetInfo {
            spreadsheet_id: parsed["spreadsheetId"]
                .as_str()
                .unwrap_or(&self.spreadsheet_id)
                .to_string(),
            title: parsed["properties"]["title"]
                .as_str()
                .unwrap_or("")
                .to_string(),
        })
    }

    /// Write the header row if row 1 is missing cells.
    ///
    /// Returns `true` when the header was written.
    pub async fn ensure_header(&self) -> Result<bool> {
        let existing = self.read_range(HEADER_CELLS).await?;
        let filled = existing
            .first()
            .map(|row| row.iter().filter(|c| !c.trim().is_empty()).count())
            .unwrap_or(0);

        if filled >= HEADER_ROW.len() {
            debug!(worksheet = %self.worksheet, "Header row already present");
            return Ok(false);
        }

        let header: Vec<String> = HEADER_ROW.iter().map(|h| h.to_string()).collect();
        self.write_range(HEADER_CELLS, &[header]).await?;
        info!(worksheet = %self.worksheet, "Header row written");
        Ok(true)
    }
}

#[async_trait]
impl SheetWriter for SheetsClient {
    async fn append(&self, entry: &TaskEntry) -> Result<AppendAck> {
        let ack = self.append_row(&entry.to_row()).await?;
        info!(
            chat_id = %entry.source_chat_id,
            status = %entry.status,
            range = %ack.updated_range,
            "Task appended to sheet"
        );
        Ok(ack)
    }

    async fn check_connection(&self) -> Result<SheetInfo> {
        self.metadata().await
    }
}
