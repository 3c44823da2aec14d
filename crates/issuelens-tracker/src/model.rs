//! Issue and event data model plus the JSON export loader.
//!
//! The loader is deliberately lenient: field names vary between exports
//! (`event_type` / `type` / `event`, `created_date` / `created_at`, ...) and
//! individual records are often incomplete. A bad label, event, or date is
//! skipped; only an unreadable file or a document that is not a list of
//! issues fails the load.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use issuelens_core::{IssueLensError, IssueState};
use serde_json::Value;

use crate::labels::labels_from_json;

/// A single issue from the export. Immutable once loaded.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::model::Issue;
///
/// let issue = Issue {
///     id: "42".into(),
///     title: "Lock file not updated".into(),
///     labels: vec!["kind/bug".into()],
///     state: "open".into(),
///     created_at: None,
///     updated_at: None,
///     creator: None,
///     events: vec![],
/// };
/// assert_eq!(issue.display_state(), "Open");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Issue number, or the last path segment of its URL.
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Label names, original case, source order.
    pub labels: Vec<String>,
    /// Raw lifecycle state, lowercased (`""` when absent).
    pub state: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Login of the issue author.
    pub creator: Option<String>,
    /// Timeline events, in source order (which is not chronological).
    pub events: Vec<Event>,
}

impl Issue {
    /// Normalized open / closed / other state.
    pub fn lifecycle(&self) -> IssueState {
        IssueState::normalize(&self.state)
    }

    /// State for tables: capitalized, or `-` when unknown.
    pub fn display_state(&self) -> String {
        let mut chars = self.state.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "-".to_string(),
        }
    }
}

/// A timeline event belonging to one issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event kind such as `labeled`, `commented`, `assigned`.
    pub event_type: Option<String>,
    /// When it happened; `None` if missing or unparseable.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Load issues from a JSON export on disk.
///
/// # Errors
///
/// Returns [`IssueLensError::FileNotFound`] if `path` does not exist,
/// [`IssueLensError::Io`] if it cannot be read, and the errors of
/// [`parse_issues`] for bad content.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use issuelens_tracker::model::load_issues;
///
/// let issues = load_issues(Path::new("poetry_issues.json")).unwrap();
/// println!("loaded {} issues", issues.len());
/// ```
pub fn load_issues(path: &Path) -> Result<Vec<Issue>, IssueLensError> {
    if !path.exists() {
        return Err(IssueLensError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let issues = parse_issues(&content)?;
    tracing::info!(path = %path.display(), issues = issues.len(), "loaded issue export");
    Ok(issues)
}

/// Parse issues from a JSON document.
///
/// The document must be an array. Elements that are not objects are skipped.
///
/// # Errors
///
/// Returns [`IssueLensError::Serialization`] for invalid JSON and
/// [`IssueLensError::Data`] when the top level is not an array.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::model::parse_issues;
///
/// let json = r#"[{
///     "number": 7,
///     "title": "Docs typo",
///     "labels": [{"name": "area/docs"}],
///     "state": "closed",
///     "events": [{"event_type": "labeled", "event_date": "2024-03-01T10:00:00Z"}]
/// }]"#;
/// let issues = parse_issues(json).unwrap();
/// assert_eq!(issues[0].id, "7");
/// assert_eq!(issues[0].labels, vec!["area/docs"]);
/// assert_eq!(issues[0].events.len(), 1);
/// ```
pub fn parse_issues(content: &str) -> Result<Vec<Issue>, IssueLensError> {
    let document: Value = serde_json::from_str(content)?;
    let Some(records) = document.as_array() else {
        return Err(IssueLensError::Data(format!(
            "expected a JSON array at the top level, found {}",
            value_kind(&document)
        )));
    };

    let mut issues = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        match issue_from_json(record) {
            Some(issue) => issues.push(issue),
            None => tracing::warn!(position, "skipping issue record that is not an object"),
        }
    }
    Ok(issues)
}

fn issue_from_json(record: &Value) -> Option<Issue> {
    if !record.is_object() {
        return None;
    }

    let id = issue_id(record);
    let labels = record
        .get("labels")
        .and_then(Value::as_array)
        .map(|values| labels_from_json(values))
        .unwrap_or_default();
    let events: Vec<Event> = record
        .get("events")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(event_from_json).collect())
        .unwrap_or_default();

    let undated = events.iter().filter(|e| e.timestamp.is_none()).count();
    if undated > 0 {
        tracing::debug!(issue = %id, undated, "events without a usable date");
    }

    Some(Issue {
        id,
        title: first_str(record, &["title"]).unwrap_or_default(),
        labels,
        state: first_str(record, &["state"])
            .map(|s| s.to_lowercase())
            .unwrap_or_default(),
        created_at: first_str(record, &["created_date", "created_at"])
            .and_then(|s| parse_timestamp(&s)),
        updated_at: first_str(record, &["updated_date", "updated_at"])
            .and_then(|s| parse_timestamp(&s)),
        creator: first_str(record, &["creator", "user"]).or_else(|| {
            record
                .get("user")
                .and_then(|u| u.get("login"))
                .and_then(Value::as_str)
                .map(str::to_string)
        }),
        events,
    })
}

fn event_from_json(record: &Value) -> Option<Event> {
    if !record.is_object() {
        return None;
    }
    Some(Event {
        event_type: first_str(record, &["event_type", "type", "event"]),
        timestamp: first_str(record, &["event_date", "created_at", "date"])
            .and_then(|s| parse_timestamp(&s)),
    })
}

/// Issue number as text, falling back to the last segment of `url`.
fn issue_id(record: &Value) -> String {
    match record.get("number") {
        Some(Value::Number(n)) => return n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        _ => {}
    }
    record
        .get("url")
        .and_then(Value::as_str)
        .and_then(|url| url.rsplit('/').next())
        .unwrap_or_default()
        .to_string()
}

/// First non-empty string among `keys`.
fn first_str(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a timestamp in any of the common export formats.
///
/// Values without an offset are taken as UTC. Returns `None` rather than an
/// error for anything unparseable.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::model::parse_timestamp;
///
/// assert!(parse_timestamp("2024-05-01T12:30:00Z").is_some());
/// assert!(parse_timestamp("2024-05-01 12:30:00").is_some());
/// assert!(parse_timestamp("2024-05-01").is_some());
/// assert!(parse_timestamp("last tuesday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
