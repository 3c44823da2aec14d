//! Resolution-time correlation.
//!
//! For each configured event type, pairs "days from creation to the first
//! such event" with "days from creation to last update" and fits a
//! least-squares line through the points.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use issuelens_core::ResolutionConfig;
use serde::{Deserialize, Serialize};

use crate::model::Issue;
use crate::table::{markdown_table, text_table};

/// Per-run settings for [`analyze_resolution`].
#[derive(Debug, Clone)]
pub struct ResolutionOptions {
    /// Event types to correlate, in output order.
    pub events: Vec<String>,
}

impl ResolutionOptions {
    /// Options from the `[resolution]` config section.
    pub fn from_config(config: &ResolutionConfig) -> Self {
        Self {
            events: config.events.clone(),
        }
    }
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self::from_config(&ResolutionConfig::default())
    }
}

/// One observation: when the event first happened and how long the issue took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPoint {
    /// Issue identifier.
    pub id: String,
    /// Whole days from creation to the first event.
    pub event_day: i64,
    /// Whole days from creation to last update.
    pub resolution_days: i64,
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trendline {
    /// Change in resolution days per day of event delay.
    pub slope: f64,
    /// Resolution days when the event happens on day zero.
    pub intercept: f64,
}

/// Correlation of one event type with resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCorrelation {
    /// The event type.
    pub event_type: String,
    /// Issues with both an event day and a resolution time.
    pub points: Vec<ResolutionPoint>,
    /// Fitted line; absent with fewer than two distinct event days.
    pub trendline: Option<Trendline>,
    /// Pearson coefficient; absent when either variable has no variance.
    pub correlation: Option<f64>,
}

/// Result of [`analyze_resolution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    /// Open or closed issues with a creation date.
    pub issues_considered: usize,
    /// Of those, issues that also have a resolution time.
    pub with_resolution: usize,
    /// One entry per configured event type.
    pub events: Vec<EventCorrelation>,
}

/// Whole days from `from` to `to`, rounded toward negative infinity.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use issuelens_tracker::resolution::whole_days;
///
/// let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let b = Utc.with_ymd_and_hms(2024, 1, 3, 11, 0, 0).unwrap();
/// assert_eq!(whole_days(a, b), 1);
/// assert_eq!(whole_days(b, a), -2);
/// ```
pub fn whole_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let delta = to - from;
    let days = delta.num_days();
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}

/// Earliest timestamp among the issue's events of `event_type`.
///
/// Events are not assumed to be in chronological order.
pub fn first_occurrence(issue: &Issue, event_type: &str) -> Option<DateTime<Utc>> {
    issue
        .events
        .iter()
        .filter(|event| event.event_type.as_deref() == Some(event_type))
        .filter_map(|event| event.timestamp)
        .min()
}

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// Returns `None` with fewer than two points or when every x is equal.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::resolution::fit_trendline;
///
/// let line = fit_trendline(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
/// assert_eq!(line.slope, 2.0);
/// assert_eq!(line.intercept, 1.0);
/// assert!(fit_trendline(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
/// ```
pub fn fit_trendline(points: &[(f64, f64)]) -> Option<Trendline> {
    let moments = Moments::of(points)?;
    if moments.sxx == 0.0 {
        return None;
    }
    let slope = moments.sxy / moments.sxx;
    Some(Trendline {
        slope,
        intercept: moments.mean_y - slope * moments.mean_x,
    })
}

/// Pearson correlation coefficient of the points.
///
/// Returns `None` with fewer than two points or when either variable is
/// constant.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::resolution::pearson;
///
/// let r = pearson(&[(1.0, 10.0), (2.0, 8.0), (3.0, 6.0)]).unwrap();
/// assert!((r + 1.0).abs() < 1e-12);
/// ```
pub fn pearson(points: &[(f64, f64)]) -> Option<f64> {
    let moments = Moments::of(points)?;
    if moments.sxx == 0.0 || moments.syy == 0.0 {
        return None;
    }
    Some(moments.sxy / (moments.sxx * moments.syy).sqrt())
}

struct Moments {
    mean_x: f64,
    mean_y: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl Moments {
    fn of(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for &(x, y) in points {
            let (dx, dy) = (x - mean_x, y - mean_y);
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        Some(Self {
            mean_x,
            mean_y,
            sxx,
            syy,
            sxy,
        })
    }
}

/// Correlate each configured event type with resolution time.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::model::parse_issues;
/// use issuelens_tracker::resolution::{analyze_resolution, ResolutionOptions};
///
/// let issues = parse_issues(r#"[
///     {"number": 1, "state": "closed", "created_at": "2024-01-01", "updated_at": "2024-01-11",
///      "events": [{"event_type": "labeled", "event_date": "2024-01-02"}]}
/// ]"#).unwrap();
/// let report = analyze_resolution(&issues, &ResolutionOptions::default());
/// assert_eq!(report.events[0].points[0].event_day, 1);
/// assert_eq!(report.events[0].points[0].resolution_days, 10);
/// ```
pub fn analyze_resolution(issues: &[Issue], options: &ResolutionOptions) -> ResolutionReport {
    let considered: Vec<(&Issue, DateTime<Utc>)> = issues
        .iter()
        .filter(|issue| matches!(issue.state.as_str(), "open" | "closed"))
        .filter_map(|issue| issue.created_at.map(|created| (issue, created)))
        .collect();

    let resolved: Vec<(&Issue, DateTime<Utc>, i64)> = considered
        .iter()
        .filter_map(|&(issue, created)| {
            let updated = issue.updated_at?;
            Some((issue, created, whole_days(created, updated)))
        })
        .collect();

    let events = options
        .events
        .iter()
        .map(|event_type| {
            let points: Vec<ResolutionPoint> = resolved
                .iter()
                .filter_map(|&(issue, created, resolution_days)| {
                    let first = first_occurrence(issue, event_type)?;
                    Some(ResolutionPoint {
                        id: issue.id.clone(),
                        event_day: whole_days(created, first),
                        resolution_days,
                    })
                })
                .collect();
            let xy: Vec<(f64, f64)> = points
                .iter()
                .map(|p| (p.event_day as f64, p.resolution_days as f64))
                .collect();
            tracing::debug!(event_type = %event_type, points = points.len(), "correlated event");
            EventCorrelation {
                event_type: event_type.clone(),
                trendline: fit_trendline(&xy),
                correlation: pearson(&xy),
                points,
            }
        })
        .collect();

    ResolutionReport {
        issues_considered: considered.len(),
        with_resolution: resolved.len(),
        events,
    }
}

impl EventCorrelation {
    fn mean(&self, pick: impl Fn(&ResolutionPoint) -> i64) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: i64 = self.points.iter().map(pick).sum();
        Some(sum as f64 / self.points.len() as f64)
    }

    fn row(&self) -> Vec<String> {
        let opt = |v: Option<f64>, digits: usize| {
            v.map_or_else(|| "-".to_string(), |v| format!("{v:.digits$}"))
        };
        vec![
            self.event_type.clone(),
            self.points.len().to_string(),
            opt(self.mean(|p| p.event_day), 1),
            opt(self.mean(|p| p.resolution_days), 1),
            opt(self.trendline.map(|t| t.slope), 3),
            opt(self.trendline.map(|t| t.intercept), 1),
            opt(self.correlation, 3),
        ]
    }
}

const SUMMARY_HEADERS: [&str; 7] = [
    "Event",
    "Points",
    "Mean days to event",
    "Mean resolution days",
    "Slope",
    "Intercept",
    "Pearson r",
];

impl ResolutionReport {
    fn summary(&self) -> String {
        format!(
            "{} open/closed issues with a creation date; {} have a resolution time.",
            self.issues_considered, self.with_resolution
        )
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.events.iter().map(EventCorrelation::row).collect()
    }

    /// Render the report as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Event Timing vs Resolution Time\n\n{}\n\n", self.summary());
        out.push_str(&markdown_table(&SUMMARY_HEADERS, &self.rows()));
        out
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event Timing vs Resolution Time\n")?;
        writeln!(f, "{}\n", self.summary())?;
        write!(f, "{}", text_table(&SUMMARY_HEADERS, &self.rows()))
    }
}
