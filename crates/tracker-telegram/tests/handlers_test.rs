//! Task recording and status checks against an in-memory sheet.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::State, http::Uri, Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use teloxide::types::Message;
use teloxide::Bot;
use tracker_core::{
    AppendAck, BotConfig, Result, ServiceAccountKey, SheetInfo, SheetWriter, SheetsError,
    TaskEntry, TaskStatus,
};
use tracker_telegram::handlers::{handle_message, status_reply, task_reply, SAVE_FAILED_MESSAGE};
use tracker_telegram::{create_shared_state, BotState, TaskOutcome};

/// Sheet writer that keeps rows in memory or fails on demand.
#[derive(Default)]
struct MockSheetWriter {
    rows: Mutex<Vec<Vec<String>>>,
    fail: Option<fn() -> SheetsError>,
}

impl MockSheetWriter {
    fn failing(fail: fn() -> SheetsError) -> Self {
        Self {
            fail: Some(fail),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SheetWriter for MockSheetWriter {
    async fn append(&self, entry: &TaskEntry) -> Result<AppendAck> {
        if let Some(fail) = self.fail {
            return Err(fail());
        }
        let mut rows = self.rows.lock().unwrap();
        rows.push(entry.to_row());
        let row = rows.len() + 1;
        Ok(AppendAck::from_range(format!("Sheet1!A{}:C{}", row, row)))
    }

    async fn check_connection(&self) -> Result<SheetInfo> {
        if let Some(fail) = self.fail {
            return Err(fail());
        }
        Ok(SheetInfo {
            spreadsheet_id: "1AbCdEfGhIjKlMnOpQrStUvWxYz".to_string(),
            title: "Daily Tasks".to_string(),
        })
    }
}

fn config() -> BotConfig {
    BotConfig {
        bot_token: "123:abc".to_string(),
        sheet_id: "1AbCdEfGhIjKlMnOpQrStUvWxYz".to_string(),
        credentials: ServiceAccountKey {
            client_email: "tracker@example.iam.gserviceaccount.com".to_string(),
            private_key: String::new(),
            private_key_id: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        },
        port: 8000,
        webhook_url: None,
        worksheet: "Sheet1".to_string(),
    }
}

fn state_with(writer: Arc<MockSheetWriter>) -> Arc<BotState> {
    create_shared_state(Arc::new(config()), writer)
}

fn sent_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 21, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn test_done_task_is_appended() {
    let writer = Arc::new(MockSheetWriter::default());
    let state = state_with(Arc::clone(&writer));

    let outcome = state
        .record_task(42, "Completed the sales report", sent_at())
        .await;

    match &outcome {
        TaskOutcome::Recorded {
            entry,
            description,
            ack,
        } => {
            assert_eq!(entry.status, TaskStatus::Done);
            assert_eq!(entry.source_chat_id, "42");
            assert_eq!(description, "the sales report");
            assert_eq!(ack.row, Some(2));
        }
        other => panic!("expected recorded task, got {:?}", other),
    }

    assert_eq!(
        *writer.rows.lock().unwrap(),
        vec![vec![
            "2025-05-21 09:30:00".to_string(),
            "Completed the sales report".to_string(),
            "Done".to_string(),
        ]]
    );

    let reply = task_reply(&outcome);
    assert!(reply.contains("Task Recorded!"));
    assert!(reply.contains("Done"));
}

#[tokio::test]
async fn test_in_progress_task_is_appended() {
    let writer = Arc::new(MockSheetWriter::default());
    let state = state_with(Arc::clone(&writer));

    let outcome = state
        .record_task(42, "Working on project planning", sent_at())
        .await;

    assert!(matches!(
        outcome,
        TaskOutcome::Recorded { ref entry, .. } if entry.status == TaskStatus::InProgress
    ));
    assert_eq!(writer.rows.lock().unwrap()[0][2], "In Progress");
}

#[tokio::test]
async fn test_unmatched_task_is_recorded_as_unknown() {
    let writer = Arc::new(MockSheetWriter::default());
    let state = state_with(Arc::clone(&writer));

    state.record_task(7, "Team lunch with design", sent_at()).await;
    state.record_task(7, "Finished the slides", sent_at()).await;

    let rows = writer.rows.lock().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2], "Unknown");
    assert_eq!(rows[1][2], "Done");
}

#[tokio::test]
async fn test_short_text_is_not_written() {
    let writer = Arc::new(MockSheetWriter::default());
    let state = state_with(Arc::clone(&writer));

    let outcome = state.record_task(42, "ok", sent_at()).await;

    assert!(matches!(outcome, TaskOutcome::TooShort));
    assert!(writer.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_write_failure_gets_generic_reply() {
    let state = state_with(Arc::new(MockSheetWriter::failing(|| {
        SheetsError::Quota("Quota exceeded".to_string())
    })));

    let outcome = state
        .record_task(42, "Completed the sales report", sent_at())
        .await;

    assert!(matches!(outcome, TaskOutcome::Failed(SheetsError::Quota(_))));
    assert_eq!(task_reply(&outcome), SAVE_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_status_reports_connected_sheet() {
    let state = state_with(Arc::new(MockSheetWriter::default()));

    let report = state.check_status().await;
    assert!(report.is_connected());

    let reply = status_reply(&report, &state.config().sheet_id_preview());
    assert!(reply.contains("✅ Connected"));
    assert!(reply.contains("Daily Tasks"));
    assert!(reply.contains("1AbCdEfGhIjKlMnOpQrS..."));
}

#[tokio::test]
async fn test_status_with_bad_credentials_reports_failure() {
    let state = state_with(Arc::new(MockSheetWriter::failing(|| {
        SheetsError::Auth("invalid_grant: Invalid JWT Signature.".to_string())
    })));

    let report = state.check_status().await;
    assert!(!report.is_connected());

    let reply = status_reply(&report, &state.config().sheet_id_preview());
    assert!(reply.contains("❌ Disconnected"));
    assert!(!reply.contains("Invalid JWT Signature"));
}

/// Telegram Bot API stand-in that rejects every call and records the method.
async fn rejecting_telegram(
    State(calls): State<Arc<Mutex<Vec<String>>>>,
    uri: Uri,
) -> Json<Value> {
    let method = uri.path().rsplit('/').next().unwrap_or("").to_string();
    calls.lock().unwrap().push(method);
    Json(json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat unavailable" }))
}

#[tokio::test]
async fn test_typing_failure_still_records_task() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .fallback(rejecting_telegram)
        .with_state(Arc::clone(&calls));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let bot = Bot::new("123:abc").set_api_url(format!("http://{}", addr).parse().unwrap());
    let msg: Message = serde_json::from_value(json!({
        "message_id": 1,
        "date": 1716283800,
        "chat": { "id": 42, "type": "private", "first_name": "Ana" },
        "text": "Completed the sales report"
    }))
    .unwrap();

    let writer = Arc::new(MockSheetWriter::default());
    let state = state_with(Arc::clone(&writer));

    // the reply fails too, but only after the row is written
    assert!(handle_message(bot, msg, state).await.is_err());

    let rows = writer.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "Completed the sales report");
    assert_eq!(rows[0][2], "Done");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.first().map(|m| m.to_lowercase()), Some("sendchataction".to_string()));
    assert_eq!(calls.len(), 2);
}
