//! Command and message handlers for the Telegram bot.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracker_core::TaskStatus;

use crate::state::{BotState, StatusReport, TaskOutcome};

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and show usage")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Check the Google Sheets connection")]
    Status,
}

/// Reply to /start.
pub const WELCOME_MESSAGE: &str = "🤖 <b>Daily Task Tracker Bot</b>\n\n\
    Hi! I'll help you track your daily tasks automatically.\n\n\
    <b>How to use:</b>\n\
    • Just send me your task updates\n\
    • I'll detect the status and save them to Google Sheets\n\n\
    <b>Examples:</b>\n\
    • \"Completed the sales report\"\n\
    • \"Working on project planning\"\n\
    • \"Finished client meeting\"\n\
    • \"Started code review\"\n\n\
    <b>Commands:</b>\n\
    • /start - Show this help\n\
    • /status - Check bot status\n\n\
    Ready to track your productivity! 📈";

/// Reply when a task message is too short to record.
pub const TOO_SHORT_MESSAGE: &str = "🤔 Could you provide more details about your task?";

/// Generic reply when a task could not be saved.
pub const SAVE_FAILED_MESSAGE: &str =
    "❌ Sorry, there was an issue saving your task. Please try again.";

/// Where a message goes once it failed to parse as a known [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Starts with `/` but names no known command.
    UnknownCommand,
    /// Plain text to classify and record.
    Task,
    /// No text (photos, stickers, service messages).
    Ignore,
}

/// Route a message by its text.
pub fn route(text: Option<&str>) -> Route {
    match text {
        Some(t) if t.starts_with('/') => Route::UnknownCommand,
        Some(_) => Route::Task,
        None => Route::Ignore,
    }
}

/// Reply to a `/command` the bot does not know.
pub fn unknown_command_reply(text: &str) -> String {
    format!(
        "Unknown command: {}\n\nUse /help to see available commands.",
        text.split_whitespace().next().unwrap_or(text)
    )
}

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn status_emoji(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Done => "✅",
        TaskStatus::InProgress => "🔄",
        TaskStatus::Unknown => "📌",
    }
}

/// Render an uptime like `2d 3h`, `1h 5m`, `4m 10s` or `12s`.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Build the reply for a handled task message.
pub fn task_reply(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Recorded {
            entry,
            description,
            ack,
        } => {
            let location = match ack.row {
                Some(row) => format!("💾 <b>Saved to Google Sheets</b> (row {})", row),
                None => "💾 <b>Saved to Google Sheets</b>".to_string(),
            };
            format!(
                "{} <b>Task Recorded!</b>\n\n\
                📝 <b>Task:</b> {}\n\
                📊 <b>Status:</b> {}\n\
                {}",
                status_emoji(entry.status),
                html_escape(description),
                entry.status,
                location
            )
        }
        TaskOutcome::TooShort => TOO_SHORT_MESSAGE.to_string(),
        TaskOutcome::Failed(_) => SAVE_FAILED_MESSAGE.to_string(),
    }
}

/// Build the reply for /status.
pub fn status_reply(report: &StatusReport, sheet_id_preview: &str) -> String {
    let (sheets_line, footer) = match &report.connection {
        Ok(info) if info.title.is_empty() => (
            "✅ Connected".to_string(),
            "Bot is running and ready! 🚀",
        ),
        Ok(info) => (
            format!("✅ Connected (<i>{}</i>)", html_escape(&info.title)),
            "Bot is running and ready! 🚀",
        ),
        Err(e) => (
            format!("❌ Disconnected ({} error)", e.kind()),
            "Task updates can't be saved until the connection is restored.",
        ),
    };

    format!(
        "🤖 <b>Bot Status</b>\n\n\
        📊 Google Sheets: {}\n\
        🔗 Sheet ID: <code>{}</code>\n\
        ⏰ Last check: {}\n\
        ⏱ Uptime: {}\n\n\
        {}",
        sheets_line,
        html_escape(sheet_id_preview),
        report.checked_at.format("%H:%M:%S UTC"),
        format_uptime(report.uptime_seconds),
        footer
    )
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, WELCOME_MESSAGE)
        .parse_mode(ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = Command::descriptions().to_string();
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Handle the /status command.
pub async fn handle_status(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let report = state.check_status().await;
    let reply = status_reply(&report, &state.config().sheet_id_preview());

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, connected = report.is_connected(), "Status requested");
    Ok(())
}

/// Handle regular text messages (classify and log to the sheet).
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
        warn!(chat_id = %msg.chat.id, error = %e, "Failed to send typing action");
    }

    let outcome = state.record_task(msg.chat.id.0, text, msg.date).await;

    bot.send_message(msg.chat.id, task_reply(&outcome))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle a `/command` that did not parse.
pub async fn handle_unknown_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        info!(cmd = %text, "Unrecognized command - sending response");
        bot.send_message(msg.chat.id, unknown_command_reply(text))
            .await?;
    }
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Status => handle_status(bot, msg, state).await,
    }
}
