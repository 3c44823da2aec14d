//! Event aggregation and activity scoring.
//!
//! Events inside the selected [`Period`] are counted per issue and per event
//! type, then every event-type column is min-max normalized on its own so
//! that high-volume types (comments) do not drown out rare ones (assignment).
//! An issue's activity score is the sum of its normalized columns.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::model::Issue;

/// Event type that is always present as a column, even with zero counts.
pub const COMMENTED: &str = "commented";

/// A single year or an inclusive range of years.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::activity::Period;
///
/// let p = Period::Range { start: 2022, end: 2024 };
/// assert!(p.contains(2023));
/// assert!(!p.contains(2025));
/// assert_eq!(p.to_string(), "2022-2024");
/// assert_eq!(Period::Year(2024).to_string(), "2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    /// One calendar year.
    Year(i32),
    /// Inclusive year range.
    Range {
        /// First year included.
        start: i32,
        /// Last year included.
        end: i32,
    },
}

impl Period {
    /// Whether `year` falls in this period.
    pub fn contains(&self, year: i32) -> bool {
        match *self {
            Period::Year(y) => y == year,
            Period::Range { start, end } => start <= year && year <= end,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(y) => write!(f, "{y}"),
            Period::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Latest year seen among all parseable event timestamps.
pub fn latest_event_year(issues: &[Issue]) -> Option<i32> {
    issues
        .iter()
        .flat_map(|issue| &issue.events)
        .filter_map(|event| event.timestamp)
        .map(|ts| ts.year())
        .max()
}

/// One row of the long-form event table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow<'a> {
    /// Identifier of the owning issue.
    pub issue_id: &'a str,
    /// Event type; `None` when the export omitted it.
    pub event_type: Option<&'a str>,
}

/// Flatten every issue's events into rows, keeping only events dated inside
/// `period`. Undated events never match a period.
pub fn flatten_events<'a>(issues: &'a [Issue], period: &Period) -> Vec<EventRow<'a>> {
    issues
        .iter()
        .flat_map(|issue| {
            issue.events.iter().filter_map(move |event| {
                period
                    .contains(event.timestamp?.year())
                    .then_some(EventRow {
                        issue_id: issue.id.as_str(),
                        event_type: event.event_type.as_deref(),
                    })
            })
        })
        .collect()
}

/// Per-issue, per-event-type counts for one period, with the normalized view.
///
/// Rows are issues with at least one typed event in the period, in order of
/// first appearance. Columns are the observed event types in lexical order,
/// always including [`COMMENTED`].
///
/// # Examples
///
/// ```
/// use issuelens_tracker::activity::{ActivityTable, Period};
/// use issuelens_tracker::model::parse_issues;
///
/// let issues = parse_issues(r#"[
///     {"number": 1, "events": [{"event_type": "commented", "event_date": "2024-01-01"}]},
///     {"number": 2, "events": [
///         {"event_type": "commented", "event_date": "2024-02-01"},
///         {"event_type": "commented", "event_date": "2024-02-02"},
///         {"event_type": "commented", "event_date": "2024-02-03"}
///     ]}
/// ]"#).unwrap();
/// let table = ActivityTable::build(&issues, &Period::Year(2024));
/// assert_eq!(table.score("1"), 0.0);
/// assert_eq!(table.score("2"), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTable {
    /// Issue identifiers, one per row.
    pub issue_ids: Vec<String>,
    /// Event types, one per column.
    pub event_types: Vec<String>,
    /// Raw counts, `counts[row][column]`.
    pub counts: Vec<Vec<u32>>,
    /// Normalized values in `[0, 1]`, same shape as `counts`.
    pub normalized: Vec<Vec<f64>>,
}

impl ActivityTable {
    /// Count and normalize the events of `issues` that fall inside `period`.
    pub fn build(issues: &[Issue], period: &Period) -> Self {
        Self::from_rows(&flatten_events(issues, period))
    }

    /// Pivot long-form rows into the count table and normalize it.
    pub fn from_rows(rows: &[EventRow<'_>]) -> Self {
        let mut row_of: HashMap<&str, usize> = HashMap::new();
        let mut issue_ids: Vec<String> = Vec::new();
        let mut grouped: HashMap<(usize, &str), u32> = HashMap::new();
        let mut types: BTreeSet<&str> = BTreeSet::new();

        for row in rows {
            let Some(event_type) = row.event_type else {
                continue;
            };
            let next = issue_ids.len();
            let idx = *row_of.entry(row.issue_id).or_insert_with(|| {
                issue_ids.push(row.issue_id.to_string());
                next
            });
            *grouped.entry((idx, event_type)).or_default() += 1;
            types.insert(event_type);
        }

        if issue_ids.is_empty() {
            return Self::default();
        }
        types.insert(COMMENTED);

        let event_types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        let counts: Vec<Vec<u32>> = (0..issue_ids.len())
            .map(|idx| {
                types
                    .iter()
                    .map(|t| grouped.get(&(idx, *t)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();
        let normalized = normalize_columns(&counts, event_types.len());

        tracing::debug!(
            issues = issue_ids.len(),
            event_types = event_types.len(),
            "built activity table"
        );

        Self {
            issue_ids,
            event_types,
            counts,
            normalized,
        }
    }

    /// `true` when no issue had a typed event in the period.
    pub fn is_empty(&self) -> bool {
        self.issue_ids.is_empty()
    }

    /// Activity score of `issue_id`: the sum of its normalized columns.
    ///
    /// Issues without events in the period score exactly `0.0`.
    pub fn score(&self, issue_id: &str) -> f64 {
        self.issue_ids
            .iter()
            .position(|id| id == issue_id)
            .map_or(0.0, |row| self.row_score(row))
    }

    /// Activity score of the issue at `row`.
    pub fn row_score(&self, row: usize) -> f64 {
        self.normalized[row].iter().sum()
    }

    /// Scores for every row, in row order.
    pub fn scores(&self) -> Vec<(&str, f64)> {
        self.issue_ids
            .iter()
            .enumerate()
            .map(|(row, id)| (id.as_str(), self.row_score(row)))
            .collect()
    }
}

/// Min-max scale each column of `counts` to `[0, 1]` independently.
///
/// A column without variance maps non-zero values to `1.0` and zeros to `0.0`.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::activity::normalize_columns;
///
/// let counts = vec![vec![0, 4], vec![5, 4], vec![10, 4]];
/// let norm = normalize_columns(&counts, 2);
/// assert_eq!(norm, vec![vec![0.0, 1.0], vec![0.5, 1.0], vec![1.0, 1.0]]);
/// ```
pub fn normalize_columns(counts: &[Vec<u32>], columns: usize) -> Vec<Vec<f64>> {
    let mut normalized = vec![vec![0.0; columns]; counts.len()];
    for col in 0..columns {
        let values = counts.iter().map(|row| row[col]);
        let (Some(min), Some(max)) = (values.clone().min(), values.max()) else {
            continue;
        };
        let range = f64::from(max - min);
        for (row, out) in counts.iter().zip(normalized.iter_mut()) {
            let value = row[col];
            out[col] = if max == min {
                if value > 0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                f64::from(value - min) / range
            };
        }
    }
    normalized
}
