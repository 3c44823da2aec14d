//! Multi-area impact analysis.
//!
//! An issue that carries more than one `area/*` label touches several parts
//! of the codebase at once. This module finds those issues inside a look-back
//! window and summarizes which areas they hit, how many areas each one spans,
//! their states, and when they were opened.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use issuelens_core::ImpactConfig;
use serde::{Deserialize, Serialize};

use crate::model::Issue;
use crate::table::{markdown_table, text_table};

const AREA_PREFIX: &str = "area/";
const DAYS_PER_MONTH: i64 = 30;

/// Per-run settings for [`analyze_impact`].
#[derive(Debug, Clone)]
pub struct ImpactOptions {
    /// Look-back window in months of 30 days; `0` means all time.
    pub months: u32,
    /// Rows in the impacted-areas ranking.
    pub top_areas: usize,
    /// Reference instant the window is measured back from.
    pub now: DateTime<Utc>,
}

impl ImpactOptions {
    /// Options from the `[impact]` config section, anchored at the current time.
    pub fn from_config(config: &ImpactConfig) -> Self {
        Self {
            months: config.months,
            top_areas: config.top_areas,
            now: Utc::now(),
        }
    }

    fn timeline_label(&self) -> String {
        if self.months == 0 {
            "all time".to_string()
        } else {
            format!("last {} months", self.months)
        }
    }
}

/// An issue spanning more than one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAreaIssue {
    /// Issue identifier.
    pub id: String,
    /// Issue title.
    pub title: String,
    /// Its `area/*` labels, source order.
    pub areas: Vec<String>,
    /// Number of area labels.
    pub area_count: usize,
    /// Lowercase state, `unknown` when absent.
    pub state: String,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Issue author.
    pub creator: Option<String>,
}

/// How many multi-area issues touch one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCount {
    /// The area label.
    pub area: String,
    /// Multi-area issues carrying it.
    pub issues: usize,
}

/// Number of issues spanning exactly `areas` areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSpan {
    /// Areas per issue.
    pub areas: usize,
    /// Issues with that many areas.
    pub issues: usize,
}

/// Multi-area issues in one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateShare {
    /// Lowercase state.
    pub state: String,
    /// Issue count.
    pub issues: usize,
    /// Share of all multi-area issues, `0.0..=100.0`.
    pub percent: f64,
}

/// Multi-area issues opened in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCount {
    /// Month as `YYYY-MM`.
    pub month: String,
    /// Issues created that month.
    pub issues: usize,
}

/// Result of [`analyze_impact`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    /// Window description, e.g. `all time` or `last 6 months`.
    pub timeline: String,
    /// Issues inside the window.
    pub issues_analyzed: usize,
    /// Multi-area issues, most areas first.
    pub multi_area: Vec<MultiAreaIssue>,
    /// Most impacted areas.
    pub areas: Vec<AreaCount>,
    /// Distribution of areas per issue, ascending.
    pub spans: Vec<AreaSpan>,
    /// Distribution by state, largest first.
    pub states: Vec<StateShare>,
    /// Creation month timeline, chronological.
    pub months: Vec<MonthCount>,
}

/// Labels whose lowercase form starts with `area/`.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::impact::area_labels;
///
/// let labels = vec!["Area/CLI".to_string(), "kind/bug".to_string(), "area/solver".to_string()];
/// assert_eq!(area_labels(&labels), vec!["Area/CLI", "area/solver"]);
/// ```
pub fn area_labels(labels: &[String]) -> Vec<&str> {
    labels
        .iter()
        .filter(|label| label.to_lowercase().starts_with(AREA_PREFIX))
        .map(String::as_str)
        .collect()
}

/// Issues created within the last `months` × 30 days before `now`.
///
/// `months == 0` keeps everything. Otherwise issues without a creation date
/// are dropped.
pub fn within_timeline(issues: &[Issue], months: u32, now: DateTime<Utc>) -> Vec<&Issue> {
    if months == 0 {
        return issues.iter().collect();
    }
    let cutoff = now - TimeDelta::days(i64::from(months) * DAYS_PER_MONTH);
    issues
        .iter()
        .filter(|issue| issue.created_at.is_some_and(|created| created >= cutoff))
        .collect()
}

/// Run the multi-area impact analysis.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::impact::{analyze_impact, ImpactOptions};
/// use issuelens_tracker::model::parse_issues;
///
/// let issues = parse_issues(r#"[
///     {"number": 1, "labels": ["area/cli", "area/solver"], "state": "open"},
///     {"number": 2, "labels": ["area/cli"], "state": "closed"}
/// ]"#).unwrap();
/// let report = analyze_impact(&issues, &ImpactOptions::from_config(&Default::default()));
/// assert_eq!(report.multi_area.len(), 1);
/// assert_eq!(report.areas[0].area, "area/cli");
/// ```
pub fn analyze_impact(issues: &[Issue], options: &ImpactOptions) -> ImpactReport {
    let window = within_timeline(issues, options.months, options.now);
    tracing::info!(
        timeline = %options.timeline_label(),
        issues = window.len(),
        "analyzing multi-area impact"
    );

    let mut multi_area: Vec<MultiAreaIssue> = window
        .iter()
        .filter_map(|issue| {
            let areas = area_labels(&issue.labels);
            (areas.len() > 1).then(|| MultiAreaIssue {
                id: issue.id.clone(),
                title: issue.title.clone(),
                area_count: areas.len(),
                areas: areas.into_iter().map(str::to_string).collect(),
                state: if issue.state.is_empty() {
                    "unknown".to_string()
                } else {
                    issue.state.clone()
                },
                created_at: issue.created_at,
                creator: issue.creator.clone(),
            })
        })
        .collect();
    multi_area.sort_by(|a, b| b.area_count.cmp(&a.area_count));

    ImpactReport {
        timeline: options.timeline_label(),
        issues_analyzed: window.len(),
        areas: area_counts(&multi_area, options.top_areas),
        spans: area_spans(&multi_area),
        states: state_shares(&multi_area),
        months: monthly(&multi_area),
        multi_area,
    }
}

fn area_counts(multi_area: &[MultiAreaIssue], top: usize) -> Vec<AreaCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for issue in multi_area {
        for area in &issue.areas {
            *counts.entry(area.as_str()).or_default() += 1;
        }
    }
    let mut ranked: Vec<AreaCount> = counts
        .into_iter()
        .map(|(area, issues)| AreaCount {
            area: area.to_string(),
            issues,
        })
        .collect();
    ranked.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.area.cmp(&b.area)));
    ranked.truncate(top);
    ranked
}

fn area_spans(multi_area: &[MultiAreaIssue]) -> Vec<AreaSpan> {
    let mut spans: BTreeMap<usize, usize> = BTreeMap::new();
    for issue in multi_area {
        *spans.entry(issue.area_count).or_default() += 1;
    }
    spans
        .into_iter()
        .map(|(areas, issues)| AreaSpan { areas, issues })
        .collect()
}

fn state_shares(multi_area: &[MultiAreaIssue]) -> Vec<StateShare> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for issue in multi_area {
        *counts.entry(issue.state.as_str()).or_default() += 1;
    }
    let total = multi_area.len();
    let mut shares: Vec<StateShare> = counts
        .into_iter()
        .map(|(state, issues)| StateShare {
            state: state.to_string(),
            issues,
            percent: issues as f64 / total as f64 * 100.0,
        })
        .collect();
    shares.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.state.cmp(&b.state)));
    shares
}

fn monthly(multi_area: &[MultiAreaIssue]) -> Vec<MonthCount> {
    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for created in multi_area.iter().filter_map(|issue| issue.created_at) {
        *months.entry(created.format("%Y-%m").to_string()).or_default() += 1;
    }
    months
        .into_iter()
        .map(|(month, issues)| MonthCount { month, issues })
        .collect()
}

impl ImpactReport {
    fn sections(&self) -> Vec<(String, Vec<&'static str>, Vec<Vec<String>>)> {
        vec![
            (
                "Most impacted areas".to_string(),
                vec!["Area", "Issues"],
                self.areas
                    .iter()
                    .map(|a| vec![a.area.clone(), a.issues.to_string()])
                    .collect(),
            ),
            (
                "Areas per issue".to_string(),
                vec!["Areas", "Issues"],
                self.spans
                    .iter()
                    .map(|s| vec![s.areas.to_string(), s.issues.to_string()])
                    .collect(),
            ),
            (
                "Multi-area issues by state".to_string(),
                vec!["State", "Issues", "Percent"],
                self.states
                    .iter()
                    .map(|s| {
                        vec![
                            capitalize(&s.state),
                            s.issues.to_string(),
                            format!("{:.1}", s.percent),
                        ]
                    })
                    .collect(),
            ),
            (
                "Multi-area issues over time".to_string(),
                vec!["Month", "Issues"],
                self.months
                    .iter()
                    .map(|m| vec![m.month.clone(), m.issues.to_string()])
                    .collect(),
            ),
            (
                "Multi-area issues".to_string(),
                vec!["Issue ID", "Title", "Areas", "State"],
                self.multi_area
                    .iter()
                    .map(|i| {
                        vec![
                            format!("#{}", i.id),
                            i.title.clone(),
                            i.areas.join(", "),
                            capitalize(&i.state),
                        ]
                    })
                    .collect(),
            ),
        ]
    }

    fn summary(&self) -> String {
        format!(
            "Analyzed {} issues from {}; {} touch more than one area.",
            self.issues_analyzed,
            self.timeline,
            self.multi_area.len()
        )
    }

    /// Render the report as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Multi-Area Impact ({})\n\n{}\n\n", self.timeline, self.summary());
        if self.multi_area.is_empty() {
            return out;
        }
        for (title, headers, rows) in self.sections() {
            out.push_str(&format!("## {title}\n\n"));
            out.push_str(&markdown_table(&headers, &rows));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for ImpactReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Multi-Area Impact ({})\n", self.timeline)?;
        writeln!(f, "{}", self.summary())?;
        if self.multi_area.is_empty() {
            return Ok(());
        }
        for (title, headers, rows) in self.sections() {
            writeln!(f, "\n{title}:")?;
            write!(f, "{}", text_table(&headers, &rows))?;
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
