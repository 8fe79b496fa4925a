//! Keyword heuristic that infers a task status from free text.
//!
//! Matching is case-insensitive. The core phrases ("completed", "finished",
//! "working on", "in progress") match anywhere in the text; the short extras
//! ("done", "started", ...) only match as whole words so they do not fire
//! inside unrelated words like "abandoned". The core phrases outrank the
//! extras: when both core sets match the task is considered still in progress,
//! and a core phrase of either status beats any extra of the other.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum number of characters a task description must have to be recorded.
pub const MIN_TASK_LEN: usize = 3;

const CORE_DONE_PATTERN: &str = r"(?i)completed|finished";

const CORE_IN_PROGRESS_PATTERN: &str = r"(?i)working\s+on|in\s+progress";

const DONE_PATTERN: &str = r"(?i)completed|finished|\b(?:done|complete|finish)\b|✅|✓|☑";

const IN_PROGRESS_PATTERN: &str =
    r"(?i)working\s+on|in\s+progress|\b(?:started|begun)\b|🔄|⏳";

fn core_done_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CORE_DONE_PATTERN).expect("Invalid regex pattern"))
}

fn core_in_progress_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CORE_IN_PROGRESS_PATTERN).expect("Invalid regex pattern"))
}

fn done_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DONE_PATTERN).expect("Invalid regex pattern"))
}

fn in_progress_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IN_PROGRESS_PATTERN).expect("Invalid regex pattern"))
}

/// Status inferred from a task update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// The task was reported finished.
    Done,
    /// The task was reported as ongoing.
    InProgress,
    /// No keyword matched.
    Unknown,
}

impl TaskStatus {
    /// Label written to the spreadsheet's status column.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Done => "Done",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a message. Pure and deterministic.
///
/// Precedence: core in-progress, core done, extra in-progress, extra done.
pub fn classify(text: &str) -> TaskStatus {
    if core_in_progress_regex().is_match(text) {
        TaskStatus::InProgress
    } else if core_done_regex().is_match(text) {
        TaskStatus::Done
    } else if in_progress_regex().is_match(text) {
        TaskStatus::InProgress
    } else if done_regex().is_match(text) {
        TaskStatus::Done
    } else {
        TaskStatus::Unknown
    }
}

/// A classified message with the status keywords removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    /// Task description with status keywords stripped.
    pub description: String,
    /// Inferred status.
    pub status: TaskStatus,
}

impl ParsedTask {
    /// Whether the description is too short to be worth recording.
    pub fn is_too_short(&self) -> bool {
        self.description.chars().count() < MIN_TASK_LEN
    }
}

/// Classify a message and extract the task description.
///
/// "Completed the sales report" becomes `("the sales report", Done)`.
pub fn parse_task(text: &str) -> ParsedTask {
    let status = classify(text);
    let stripped = match status {
        TaskStatus::Done => done_regex().replace_all(text, " "),
        TaskStatus::InProgress => in_progress_regex().replace_all(text, " "),
        TaskStatus::Unknown => text.into(),
    };

    let description = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, ':' | '-' | ',' | '.' | ';') || c.is_whitespace())
        .to_string();

    ParsedTask { description, status }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_keywords() {
        assert_eq!(classify("Completed the sales report"), TaskStatus::Done);
        assert_eq!(classify("finished client meeting"), TaskStatus::Done);
        assert_eq!(classify("FINISHED THE DECK"), TaskStatus::Done);
        assert_eq!(classify("report: done"), TaskStatus::Done);
        assert_eq!(classify("✅ invoices"), TaskStatus::Done);
    }

    #[test]
    fn test_done_matches_as_substring() {
        assert_eq!(classify("uncompleted? no, completedness"), TaskStatus::Done);
    }

    #[test]
    fn test_in_progress_keywords() {
        assert_eq!(classify("Working on project planning"), TaskStatus::InProgress);
        assert_eq!(classify("migration IN PROGRESS"), TaskStatus::InProgress);
        assert_eq!(classify("Started code review"), TaskStatus::InProgress);
        assert_eq!(classify("⏳ onboarding docs"), TaskStatus::InProgress);
    }

    #[test]
    fn test_in_progress_wins_tie() {
        assert_eq!(
            classify("Finished the draft, working on the review"),
            TaskStatus::InProgress
        );
        assert_eq!(classify("completed step 1, step 2 in progress"), TaskStatus::InProgress);
    }

    #[test]
    fn test_core_done_beats_extra_in_progress() {
        assert_eq!(
            classify("Completed the migration we started last week"),
            TaskStatus::Done
        );
        assert_eq!(classify("Finished what I had begun"), TaskStatus::Done);
        // extras still break ties among themselves
        assert_eq!(classify("started it, half done"), TaskStatus::InProgress);
    }

    #[test]
    fn test_core_in_progress_beats_extra_done() {
        assert_eq!(
            classify("Working on the report, intro done"),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn test_parse_task_strips_winning_status_only() {
        let parsed = parse_task("Completed the migration we started last week");
        assert_eq!(parsed.status, TaskStatus::Done);
        assert_eq!(parsed.description, "the migration we started last week");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("Buy milk"), TaskStatus::Unknown);
        assert_eq!(classify(""), TaskStatus::Unknown);
        // whole-word extras do not fire inside other words
        assert_eq!(classify("abandoned the plan"), TaskStatus::Unknown);
        assert_eq!(classify("restarted nothing"), TaskStatus::Unknown);
    }

    #[test]
    fn test_labels() {
        assert_eq!(TaskStatus::Done.to_string(), "Done");
        assert_eq!(TaskStatus::InProgress.to_string(), "In Progress");
        assert_eq!(TaskStatus::Unknown.label(), "Unknown");
    }

    #[test]
    fn test_parse_task_strips_keywords() {
        let parsed = parse_task("Completed the sales report");
        assert_eq!(parsed.status, TaskStatus::Done);
        assert_eq!(parsed.description, "the sales report");

        let parsed = parse_task("Working on project planning");
        assert_eq!(parsed.status, TaskStatus::InProgress);
        assert_eq!(parsed.description, "project planning");

        let parsed = parse_task("Quarterly review - done.");
        assert_eq!(parsed.description, "Quarterly review");
    }

    #[test]
    fn test_parse_task_unknown_keeps_text() {
        let parsed = parse_task("  Call   the bank ");
        assert_eq!(parsed.status, TaskStatus::Unknown);
        assert_eq!(parsed.description, "Call the bank");
    }

    #[test]
    fn test_too_short() {
        assert!(parse_task("done").is_too_short());
        assert!(parse_task("finished: ok").is_too_short());
        assert!(!parse_task("finished tax forms").is_too_short());
    }
}
