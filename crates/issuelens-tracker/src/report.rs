//! Most-active-categories report.
//!
//! Ties the pieces together for one period: score every active issue,
//! classify it, apply the user's filters, and build the ranked Top-N, the
//! category share table, the category × state grid, and the breakdown of
//! what ended up in the Other bucket.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use issuelens_core::{ActivityConfig, Category, IssueState};
use serde::{Deserialize, Serialize};

use crate::activity::{latest_event_year, ActivityTable, Period};
use crate::classify::classify;
use crate::labels::split_family;
use crate::model::Issue;
use crate::table::{markdown_table, text_table};

/// Sub-labels listed per family in the Other breakdown.
const SUBLABELS_PER_FAMILY: usize = 3;

/// Category and raw-label filters for the ranked views.
///
/// An empty filter matches everything. Category and label filters combine
/// with AND; values inside each list combine with OR.
///
/// # Examples
///
/// ```
/// use issuelens_core::Category;
/// use issuelens_tracker::report::IssueFilter;
///
/// let filter = IssueFilter::new(vec![Category::Bug], [" Area/CLI ", ""]);
/// assert_eq!(filter.labels, vec!["area/cli"]);
/// assert!(filter.matches(Category::Bug, &["area/cli/run".into()]));
/// assert!(!filter.matches(Category::Docs, &["area/cli".into()]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    /// Keep only these categories (empty = all).
    pub categories: Vec<Category>,
    /// Keep issues with a label containing any of these, lowercase (empty = all).
    pub labels: Vec<String>,
}

impl IssueFilter {
    /// Build a filter, trimming and lowercasing label needles and dropping
    /// blank ones.
    pub fn new<I, S>(categories: Vec<Category>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        Self { categories, labels }
    }

    /// `true` if the filter lets every issue through.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.labels.is_empty()
    }

    /// Whether an issue with this category and these labels passes.
    pub fn matches(&self, category: Category, labels: &[String]) -> bool {
        let category_ok = self.categories.is_empty() || self.categories.contains(&category);
        let labels_ok = self.labels.is_empty()
            || labels.iter().any(|label| {
                let label = label.to_lowercase();
                self.labels.iter().any(|needle| label.contains(needle.as_str()))
            });
        category_ok && labels_ok
    }

    fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.categories.is_empty() {
            let names: Vec<&str> = self.categories.iter().map(|c| c.name()).collect();
            parts.push(format!("Types: {}", names.join(", ")));
        }
        if !self.labels.is_empty() {
            parts.push(format!("Labels like: {}", self.labels.join(", ")));
        }
        (!parts.is_empty()).then(|| parts.join(" | "))
    }
}

/// Per-run settings for [`analyze_categories`].
///
/// # Examples
///
/// ```
/// use issuelens_tracker::report::ActivityOptions;
///
/// let opts = ActivityOptions::default();
/// assert_eq!(opts.top_n, 5);
/// assert!(opts.period.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ActivityOptions {
    /// Period to analyze; `None` picks the latest year with dated events.
    pub period: Option<Period>,
    /// Rows in the ranked table.
    pub top_n: usize,
    /// Rows in each Other-breakdown table.
    pub other_top_k: usize,
    /// Title truncation width, in characters.
    pub title_width: usize,
    /// Labels shown per ranked row.
    pub max_labels: usize,
    /// User filters for the ranked views.
    pub filter: IssueFilter,
}

impl ActivityOptions {
    /// Options seeded from the `[activity]` config section.
    pub fn from_config(config: &ActivityConfig) -> Self {
        Self {
            period: None,
            top_n: config.top_n,
            other_top_k: config.other_top_k,
            title_width: config.title_width,
            max_labels: config.max_labels,
            filter: IssueFilter::default(),
        }
    }
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self::from_config(&ActivityConfig::default())
    }
}

/// An issue active in the period, with its category and activity score.
#[derive(Debug, Clone)]
pub struct ScoredIssue<'a> {
    /// The source issue.
    pub issue: &'a Issue,
    /// Classifier output.
    pub category: Category,
    /// Sum of normalized event counts.
    pub score: f64,
}

/// One line of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIssue {
    /// 1-based position.
    pub rank: usize,
    /// Issue identifier.
    pub id: String,
    /// Title, truncated with `…` past the configured width.
    pub title: String,
    /// Leading labels, capped at the configured count.
    pub labels: Vec<String>,
    /// Assigned category.
    pub category: Category,
    /// Display state (`Open`, `Closed`, `-`).
    pub state: String,
    /// Activity score.
    pub score: f64,
    /// Chart color of the category.
    pub color: String,
}

/// Issue count and share of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// The category.
    pub category: Category,
    /// Distinct issues in the category.
    pub count: usize,
    /// Share of all counted issues, `0.0..=100.0`.
    pub percent: f64,
}

/// Open / closed / other counts of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStates {
    /// The category.
    pub category: Category,
    /// Issues whose state contains "open".
    pub open: usize,
    /// Issues whose state contains "close".
    pub closed: usize,
    /// Issues in any other state.
    pub other: usize,
}

/// A label (or sub-label) and the number of distinct issues carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    /// Label text as it appears in the export.
    pub label: String,
    /// Distinct issues.
    pub issues: usize,
}

/// A label family (text before the first `/`) inside the Other bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyCount {
    /// Family name.
    pub family: String,
    /// Distinct issues with any label of this family.
    pub issues: usize,
    /// Most common non-empty sub-labels of the family.
    pub sublabels: Vec<LabelCount>,
}

/// What the Other bucket is made of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherBreakdown {
    /// Distinct issues classified as Other.
    pub issues: usize,
    /// Most common raw labels.
    pub labels: Vec<LabelCount>,
    /// Most common label families.
    pub families: Vec<FamilyCount>,
}

/// The full most-active-categories report for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    /// Period label, e.g. `2024` or `2022-2024`.
    pub period: String,
    /// Filters applied to the ranked views.
    pub filter: IssueFilter,
    /// Distinct issues active in the period, before filtering.
    pub issues_in_period: usize,
    /// `true` when the filters removed every issue.
    pub no_matches: bool,
    /// Ranked most-active issues.
    pub top: Vec<RankedIssue>,
    /// Count and share per category, in display order.
    pub categories: Vec<CategoryShare>,
    /// Category × state grid, in display order.
    pub states: Vec<CategoryStates>,
    /// Other-bucket breakdown, always over the unfiltered period.
    pub other: OtherBreakdown,
}

/// Result of a most-active-categories run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CategoryOutcome {
    /// The export contains no events at all.
    NoEvents,
    /// No event has a parseable date, so no period can be chosen.
    NoYears,
    /// Nothing happened in the selected period.
    EmptyPeriod {
        /// Period label.
        period: String,
    },
    /// A report was produced.
    Report(CategoryReport),
}

/// Build the most-active-categories report.
///
/// Never fails: missing data is reported through the [`CategoryOutcome`]
/// variants, and a filter that matches nothing yields a report with
/// `no_matches` set and the Other breakdown still filled in.
///
/// # Examples
///
/// ```
/// use issuelens_core::Category;
/// use issuelens_tracker::model::parse_issues;
/// use issuelens_tracker::report::{analyze_categories, ActivityOptions, CategoryOutcome};
///
/// let issues = parse_issues(r#"[
///     {"number": 1, "title": "Crash on install", "state": "open",
///      "events": [{"event_type": "commented", "event_date": "2024-04-01"}]},
///     {"number": 2, "title": "Add docs for plugins", "state": "closed", "labels": ["area/docs"],
///      "events": [{"event_type": "labeled", "event_date": "2024-04-02"}]}
/// ]"#).unwrap();
///
/// let CategoryOutcome::Report(report) = analyze_categories(&issues, &ActivityOptions::default()) else {
///     panic!("expected a report");
/// };
/// assert_eq!(report.period, "2024");
/// assert_eq!(report.top.len(), 2);
/// assert_eq!(report.categories[Category::Bug.index()].count, 1);
/// ```
pub fn analyze_categories(issues: &[Issue], options: &ActivityOptions) -> CategoryOutcome {
    if issues.iter().all(|issue| issue.events.is_empty()) {
        return CategoryOutcome::NoEvents;
    }
    let period = match options.period {
        Some(period) => period,
        None => match latest_event_year(issues) {
            Some(year) => Period::Year(year),
            None => return CategoryOutcome::NoYears,
        },
    };
    let period_label = period.to_string();

    let scored = score_period(issues, &period);
    if scored.is_empty() {
        tracing::info!(period = %period_label, "no events in period");
        return CategoryOutcome::EmptyPeriod {
            period: period_label,
        };
    }

    let other = other_breakdown(&scored, options.other_top_k);

    let mut working: Vec<ScoredIssue<'_>> = scored
        .iter()
        .filter(|s| options.filter.matches(s.category, &s.issue.labels))
        .cloned()
        .collect();
    tracing::debug!(
        period = %period_label,
        active = scored.len(),
        matching = working.len(),
        "scored period"
    );

    rank(&mut working);

    CategoryOutcome::Report(CategoryReport {
        period: period_label,
        filter: options.filter.clone(),
        issues_in_period: scored.len(),
        no_matches: working.is_empty(),
        top: top_rows(&working, options),
        categories: category_shares(&working),
        states: category_states(&working),
        other,
    })
}

/// Score and classify every issue with typed events in `period`.
///
/// Returns one entry per distinct issue id, in order of first activity.
pub fn score_period<'a>(issues: &'a [Issue], period: &Period) -> Vec<ScoredIssue<'a>> {
    let table = ActivityTable::build(issues, period);

    let mut by_id: HashMap<&str, &Issue> = HashMap::new();
    for issue in issues {
        by_id.entry(issue.id.as_str()).or_insert(issue);
    }

    table
        .scores()
        .into_iter()
        .filter_map(|(id, score)| {
            let issue = *by_id.get(id)?;
            Some(ScoredIssue {
                issue,
                category: classify(&issue.labels, &issue.title),
                score,
            })
        })
        .collect()
}

/// Sort by score descending; equal scores fall back to ascending issue id.
pub fn rank(scored: &mut [ScoredIssue<'_>]) {
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| compare_ids(&a.issue.id, &b.issue.id))
    });
}

/// Numeric comparison when both ids are numbers, lexical otherwise.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use issuelens_tracker::report::compare_ids;
///
/// assert_eq!(compare_ids("9", "10"), Ordering::Less);
/// assert_eq!(compare_ids("abc", "abd"), Ordering::Less);
/// ```
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn top_rows(ranked: &[ScoredIssue<'_>], options: &ActivityOptions) -> Vec<RankedIssue> {
    ranked
        .iter()
        .take(options.top_n)
        .enumerate()
        .map(|(i, s)| RankedIssue {
            rank: i + 1,
            id: s.issue.id.clone(),
            title: truncate_title(&s.issue.title, options.title_width),
            labels: s.issue.labels.iter().take(options.max_labels).cloned().collect(),
            category: s.category,
            state: s.issue.display_state(),
            score: s.score,
            color: s.category.color().to_string(),
        })
        .collect()
}

fn truncate_title(title: &str, width: usize) -> String {
    if title.chars().count() > width {
        let mut short: String = title.chars().take(width).collect();
        short.push('…');
        short
    } else {
        title.to_string()
    }
}

/// Distinct-issue count and percentage share for every category.
///
/// All six categories are present, in display order; shares sum to 100
/// whenever at least one issue is counted.
pub fn category_shares(scored: &[ScoredIssue<'_>]) -> Vec<CategoryShare> {
    let counts = distinct_by_category(scored, |_| ());
    let total: usize = counts.iter().map(|c| c.len()).sum();
    Category::ALL
        .iter()
        .map(|&category| {
            let count = counts[category.index()].len();
            let percent = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            CategoryShare {
                category,
                count,
                percent,
            }
        })
        .collect()
}

/// Distinct-issue counts per category and normalized state.
pub fn category_states(scored: &[ScoredIssue<'_>]) -> Vec<CategoryStates> {
    let seen = distinct_by_category(scored, |s| s.issue.lifecycle());
    Category::ALL
        .iter()
        .map(|&category| {
            let states = &seen[category.index()];
            let count = |wanted: IssueState| states.iter().filter(|(_, st)| *st == wanted).count();
            CategoryStates {
                category,
                open: count(IssueState::Open),
                closed: count(IssueState::Closed),
                other: count(IssueState::Other),
            }
        })
        .collect()
}

/// Group distinct issue ids per category, keeping the first `extra` value
/// computed for each id.
fn distinct_by_category<'a, T>(
    scored: &[ScoredIssue<'a>],
    extra: impl Fn(&ScoredIssue<'a>) -> T,
) -> Vec<Vec<(&'a str, T)>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut grouped: Vec<Vec<(&'a str, T)>> = Category::ALL.iter().map(|_| Vec::new()).collect();
    for s in scored {
        if seen.insert(s.issue.id.as_str()) {
            grouped[s.category.index()].push((s.issue.id.as_str(), extra(s)));
        }
    }
    grouped
}

/// Break the Other bucket down by raw label and by label family.
///
/// Counts are distinct issues. Labels are ranked by count, then name; each
/// family lists up to three of its most common sub-labels.
pub fn other_breakdown(scored: &[ScoredIssue<'_>], top_k: usize) -> OtherBreakdown {
    let mut seen: HashSet<&str> = HashSet::new();
    let others: Vec<&Issue> = scored
        .iter()
        .filter(|s| s.category == Category::Other)
        .map(|s| s.issue)
        .filter(|issue| seen.insert(issue.id.as_str()))
        .collect();

    let mut label_issues: HashMap<&str, usize> = HashMap::new();
    let mut family_issues: HashMap<&str, usize> = HashMap::new();
    let mut sublabel_issues: HashMap<(&str, &str), usize> = HashMap::new();

    for issue in &others {
        let labels: HashSet<&str> = issue
            .labels
            .iter()
            .map(String::as_str)
            .filter(|l| !l.is_empty())
            .collect();
        let mut families: HashSet<&str> = HashSet::new();
        let mut sublabels: HashSet<(&str, &str)> = HashSet::new();
        for label in labels {
            *label_issues.entry(label).or_default() += 1;
            let (family, sub) = split_family(label);
            families.insert(family);
            if !sub.is_empty() {
                sublabels.insert((family, sub));
            }
        }
        for family in families {
            *family_issues.entry(family).or_default() += 1;
        }
        for pair in sublabels {
            *sublabel_issues.entry(pair).or_default() += 1;
        }
    }

    let families = top_counts(family_issues, top_k)
        .into_iter()
        .map(|top| {
            let subs: HashMap<&str, usize> = sublabel_issues
                .iter()
                .filter(|((family, _), _)| *family == top.label)
                .map(|((_, sub), n)| (*sub, *n))
                .collect();
            FamilyCount {
                family: top.label,
                issues: top.issues,
                sublabels: top_counts(subs, SUBLABELS_PER_FAMILY),
            }
        })
        .collect();

    OtherBreakdown {
        issues: others.len(),
        labels: top_counts(label_issues, top_k),
        families,
    }
}

fn top_counts(counts: HashMap<&str, usize>, k: usize) -> Vec<LabelCount> {
    let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(k)
        .map(|(label, issues)| LabelCount {
            label: label.to_string(),
            issues,
        })
        .collect()
}

// Rendering

impl CategoryReport {
    fn title_line(&self) -> String {
        let mut line = format!("Most Active Issues ({}) - Top {}", self.period, self.top.len());
        if let Some(desc) = self.filter.describe() {
            line.push_str(" - ");
            line.push_str(&desc);
        }
        line
    }

    fn no_match_line(&self) -> String {
        format!(
            "No issues found for {} in {}",
            self.filter.describe().unwrap_or_default(),
            self.period
        )
    }

    fn top_table(&self) -> (Vec<&'static str>, Vec<Vec<String>>) {
        let headers = vec!["Rank", "Issue ID", "Title", "Labels", "Type", "State", "Score"];
        let rows = self
            .top
            .iter()
            .map(|r| {
                vec![
                    r.rank.to_string(),
                    format!("#{}", r.id),
                    r.title.clone(),
                    if r.labels.is_empty() {
                        "-".to_string()
                    } else {
                        r.labels.join(", ")
                    },
                    r.category.to_string(),
                    r.state.clone(),
                    format!("{:.2}", r.score),
                ]
            })
            .collect();
        (headers, rows)
    }

    fn share_table(&self) -> (Vec<&'static str>, Vec<Vec<String>>) {
        let rows = self
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.to_string(),
                    c.count.to_string(),
                    format!("{:.1}", c.percent),
                ]
            })
            .collect();
        (vec!["Type", "Count", "Percent"], rows)
    }

    fn state_table(&self) -> (Vec<&'static str>, Vec<Vec<String>>) {
        let with_other = self.states.iter().any(|s| s.other > 0);
        let mut headers = vec!["Type", "Open", "Closed"];
        if with_other {
            headers.push("Other");
        }
        let rows = self
            .states
            .iter()
            .map(|s| {
                let mut row = vec![
                    s.category.to_string(),
                    s.open.to_string(),
                    s.closed.to_string(),
                ];
                if with_other {
                    row.push(s.other.to_string());
                }
                row
            })
            .collect();
        (headers, rows)
    }

    /// Render the report as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if self.no_matches {
            out.push_str(&format!("# {}\n\n", self.no_match_line()));
        } else {
            out.push_str(&format!("# {}\n\n", self.title_line()));
            let (headers, rows) = self.top_table();
            out.push_str(&markdown_table(&headers, &rows));
            out.push('\n');
        }

        out.push_str(&self.other.to_markdown(&self.period));

        if !self.no_matches {
            out.push_str(&format!("## Category Share (% of issues) - {}\n\n", self.period));
            let (headers, rows) = self.share_table();
            out.push_str(&markdown_table(&headers, &rows));
            out.push('\n');

            out.push_str(&format!(
                "## Issue Counts by Category and State - {}\n\n",
                self.period
            ));
            let (headers, rows) = self.state_table();
            out.push_str(&markdown_table(&headers, &rows));
        }
        out
    }
}

impl fmt::Display for CategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.no_matches {
            writeln!(f, "{}\n", self.no_match_line())?;
            return write!(f, "{}", OtherText(&self.other, &self.period));
        }

        writeln!(f, "{}\n", self.title_line())?;
        let (headers, rows) = self.top_table();
        writeln!(f, "{}", text_table(&headers, &rows))?;

        write!(f, "{}", OtherText(&self.other, &self.period))?;

        writeln!(f, "Category Share (% of issues) - {}\n", self.period)?;
        let (headers, rows) = self.share_table();
        writeln!(f, "{}", text_table(&headers, &rows))?;

        writeln!(f, "Issue Counts by Category and State - {}\n", self.period)?;
        let (headers, rows) = self.state_table();
        write!(f, "{}", text_table(&headers, &rows))
    }
}

impl OtherBreakdown {
    fn label_rows(&self) -> Vec<Vec<String>> {
        self.labels
            .iter()
            .map(|l| vec![l.label.clone(), l.issues.to_string()])
            .collect()
    }

    fn family_rows(&self) -> Vec<Vec<String>> {
        self.families
            .iter()
            .map(|fam| {
                let common = if fam.sublabels.is_empty() {
                    "-".to_string()
                } else {
                    fam.sublabels
                        .iter()
                        .map(|s| format!("{} ({})", s.label, s.issues))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                vec![fam.family.clone(), fam.issues.to_string(), common]
            })
            .collect()
    }

    fn empty_message(&self, period: &str) -> Option<String> {
        if self.issues == 0 {
            Some(format!("No 'Other' issues to break down for {period}."))
        } else if self.labels.is_empty() {
            Some(format!("No labels found inside 'Other' for {period}."))
        } else {
            None
        }
    }

    /// Render the breakdown as markdown sections.
    pub fn to_markdown(&self, period: &str) -> String {
        if let Some(msg) = self.empty_message(period) {
            return format!("{msg}\n\n");
        }
        let mut out = String::new();
        out.push_str("## Top labels found in 'Other'\n\n");
        out.push_str(&markdown_table(&["Label", "Issues"], &self.label_rows()));
        out.push_str("\n## Top label families in 'Other'\n\n");
        out.push_str(&markdown_table(
            &["Family", "Issues", "Common sublabels"],
            &self.family_rows(),
        ));
        out.push('\n');
        out
    }
}

struct OtherText<'a>(&'a OtherBreakdown, &'a str);

impl fmt::Display for OtherText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let OtherText(other, period) = self;
        if let Some(msg) = other.empty_message(period) {
            return writeln!(f, "{msg}\n");
        }
        writeln!(f, "Top labels found in 'Other':")?;
        writeln!(f, "{}", text_table(&["Label", "Issues"], &other.label_rows()))?;
        writeln!(f, "Top label families in 'Other':")?;
        writeln!(
            f,
            "{}",
            text_table(&["Family", "Issues", "Common sublabels"], &other.family_rows())
        )
    }
}

impl fmt::Display for CategoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryOutcome::NoEvents => writeln!(f, "No events to analyze."),
            CategoryOutcome::NoYears => writeln!(f, "No years found in events."),
            CategoryOutcome::EmptyPeriod { period } => {
                writeln!(f, "No events found for selected period {period}.")
            }
            CategoryOutcome::Report(report) => write!(f, "{report}"),
        }
    }
}

impl CategoryOutcome {
    /// Render the outcome as markdown.
    pub fn to_markdown(&self) -> String {
        match self {
            CategoryOutcome::Report(report) => report.to_markdown(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_issues;

    fn events(kind: &str, n: usize, date: &str) -> String {
        (0..n)
            .map(|_| format!(r#"{{"event_type": "{kind}", "event_date": "{date}"}}"#))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn fixture() -> Vec<Issue> {
        let json = format!(
            r#"[
            {{"number": 10, "title": "Crash when locking", "state": "open",
              "labels": ["kind/bug", "area/cli"], "events": [{}]}},
            {{"number": 11, "title": "Stale entry", "state": "closed",
              "labels": ["status/triage", "status/duplicate"], "events": [{}]}},
            {{"number": 12, "title": "Question about groups", "state": "open",
              "labels": [{{"name": "status/triage"}}, {{"name": "good first issue"}}], "events": [{}]}},
            {{"number": 13, "title": "Explain groups in pyproject", "state": "closed",
              "labels": ["area/docs"], "events": [{}]}},
            {{"number": 14, "title": "Old thing", "state": "open",
              "labels": ["kind/feature"], "events": [{}]}}
        ]"#,
            events("commented", 10, "2024-02-01"),
            events("commented", 5, "2024-03-01"),
            events("labeled", 1, "2024-04-01"),
            events("commented", 5, "2024-05-01"),
            events("commented", 3, "2022-01-01"),
        );
        parse_issues(&json).unwrap()
    }

    fn report(options: &ActivityOptions) -> CategoryReport {
        match analyze_categories(&fixture(), options) {
            CategoryOutcome::Report(r) => r,
            other => panic!("expected report, got {other:?}"),
        }
    }

    #[test]
    fn defaults_to_latest_year() {
        let r = report(&ActivityOptions::default());
        assert_eq!(r.period, "2024");
        assert_eq!(r.issues_in_period, 4);
    }

    #[test]
    fn ranking_orders_by_score_then_id() {
        let r = report(&ActivityOptions::default());
        let ids: Vec<&str> = r.top.iter().map(|t| t.id.as_str()).collect();
        // 10: commented 1.0; 11 and 13 tie at 0.5; 12: labeled 1.0.
        assert_eq!(ids, vec!["10", "12", "11", "13"]);
        assert_eq!(r.top[0].rank, 1);
        assert_eq!(r.top[0].category, Category::Bug);
        assert_eq!(r.top[0].color, "#d62728");
        assert_eq!(r.top[0].state, "Open");
        assert_eq!(r.top[2].score, 0.5);
    }

    #[test]
    fn tied_scores_rank_by_ascending_id_regardless_of_input_order() {
        let json = format!(
            r#"[
            {{"number": 30, "events": [{}]}},
            {{"number": 20, "events": [{}]}},
            {{"number": 9, "events": [{}]}}
        ]"#,
            events("commented", 1, "2024-03-01"),
            events("commented", 1, "2024-03-02"),
            events("commented", 1, "2024-03-03"),
        );
        let issues = parse_issues(&json).unwrap();
        let mut scored = score_period(&issues, &Period::Year(2024));
        assert!(scored.iter().all(|s| s.score == 1.0));
        rank(&mut scored);
        let ids: Vec<&str> = scored.iter().map(|s| s.issue.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "20", "30"]);
    }

    #[test]
    fn top_n_limits_rows() {
        let options = ActivityOptions {
            top_n: 2,
            ..ActivityOptions::default()
        };
        assert_eq!(report(&options).top.len(), 2);
    }

    #[test]
    fn category_shares_cover_all_categories_and_sum_to_100() {
        let r = report(&ActivityOptions::default());
        assert_eq!(r.categories.len(), 6);
        let by_cat = |c: Category| r.categories[c.index()].count;
        assert_eq!(by_cat(Category::Bug), 1);
        assert_eq!(by_cat(Category::Docs), 1);
        assert_eq!(by_cat(Category::Other), 2);
        assert_eq!(by_cat(Category::Feature), 0);
        let total: f64 = r.categories.iter().map(|c| c.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn state_grid_counts_distinct_issues() {
        let r = report(&ActivityOptions::default());
        let other = &r.states[Category::Other.index()];
        assert_eq!((other.open, other.closed, other.other), (1, 1, 0));
        let docs = &r.states[Category::Docs.index()];
        assert_eq!((docs.open, docs.closed), (0, 1));
    }

    #[test]
    fn other_breakdown_counts_labels_and_families() {
        let r = report(&ActivityOptions::default());
        assert_eq!(r.other.issues, 2);
        assert_eq!(
            r.other.labels[0],
            LabelCount {
                label: "status/triage".into(),
                issues: 2
            }
        );
        let status = &r.other.families[0];
        assert_eq!(status.family, "status");
        assert_eq!(status.issues, 2);
        assert_eq!(
            status.sublabels,
            vec![
                LabelCount {
                    label: "triage".into(),
                    issues: 2
                },
                LabelCount {
                    label: "duplicate".into(),
                    issues: 1
                },
            ]
        );
        let gfi = r.other.families.iter().find(|f| f.family == "good first issue").unwrap();
        assert!(gfi.sublabels.is_empty());
    }

    #[test]
    fn type_filter_without_matches_keeps_other_breakdown() {
        let options = ActivityOptions {
            filter: IssueFilter::new(vec![Category::Feature], Vec::<String>::new()),
            ..ActivityOptions::default()
        };
        let r = report(&options);
        assert!(r.no_matches);
        assert!(r.top.is_empty());
        assert!(r.categories.iter().all(|c| c.count == 0 && c.percent == 0.0));
        assert_eq!(r.other.issues, 2);
    }

    #[test]
    fn label_filter_applies_to_ranked_views_only() {
        let options = ActivityOptions {
            filter: IssueFilter::new(vec![], ["TRIAGE"]),
            ..ActivityOptions::default()
        };
        let r = report(&options);
        let ids: Vec<&str> = r.top.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["12", "11"]);
        assert_eq!(r.categories[Category::Other.index()].percent, 100.0);
        assert_eq!(r.issues_in_period, 4);
        assert_eq!(r.other.issues, 2);
    }

    #[test]
    fn category_and_label_filters_combine() {
        let options = ActivityOptions {
            filter: IssueFilter::new(vec![Category::Bug, Category::Other], ["area/cli"]),
            ..ActivityOptions::default()
        };
        let r = report(&options);
        let ids: Vec<&str> = r.top.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["10"]);
    }

    #[test]
    fn explicit_range_includes_older_events() {
        let options = ActivityOptions {
            period: Some(Period::Range {
                start: 2022,
                end: 2024,
            }),
            ..ActivityOptions::default()
        };
        let r = report(&options);
        assert_eq!(r.period, "2022-2024");
        assert_eq!(r.issues_in_period, 5);
    }

    #[test]
    fn empty_period_is_not_an_error() {
        let options = ActivityOptions {
            period: Some(Period::Year(2010)),
            ..ActivityOptions::default()
        };
        assert_eq!(
            analyze_categories(&fixture(), &options),
            CategoryOutcome::EmptyPeriod {
                period: "2010".into()
            }
        );
    }

    #[test]
    fn missing_events_and_dates_are_reported() {
        let no_events = parse_issues(r#"[{"number": 1}]"#).unwrap();
        assert_eq!(
            analyze_categories(&no_events, &ActivityOptions::default()),
            CategoryOutcome::NoEvents
        );
        let undated = parse_issues(r#"[{"number": 1, "events": [{"event_type": "x"}]}]"#).unwrap();
        assert_eq!(
            analyze_categories(&undated, &ActivityOptions::default()),
            CategoryOutcome::NoYears
        );
    }

    #[test]
    fn long_titles_are_truncated() {
        assert_eq!(truncate_title("abcdef", 3), "abc…");
        assert_eq!(truncate_title("abc", 3), "abc");
    }

    #[test]
    fn labels_are_capped() {
        let options = ActivityOptions {
            max_labels: 1,
            ..ActivityOptions::default()
        };
        let r = report(&options);
        assert!(r.top.iter().all(|t| t.labels.len() <= 1));
    }

    #[test]
    fn numeric_ids_compare_numerically() {
        assert_eq!(compare_ids("2", "10"), Ordering::Less);
        assert_eq!(compare_ids("10", "abc"), Ordering::Less);
    }

    #[test]
    fn text_rendering_includes_sections() {
        let text = report(&ActivityOptions::default()).to_string();
        assert!(text.contains("Most Active Issues (2024) - Top 4"));
        assert!(text.contains("#10"));
        assert!(text.contains("Top labels found in 'Other':"));
        assert!(text.contains("Category Share (% of issues) - 2024"));
        assert!(text.contains("Issue Counts by Category and State - 2024"));
    }

    #[test]
    fn markdown_rendering_of_no_matches() {
        let options = ActivityOptions {
            filter: IssueFilter::new(vec![Category::Infra], Vec::<String>::new()),
            ..ActivityOptions::default()
        };
        let md = report(&options).to_markdown();
        assert!(md.starts_with("# No issues found for Types: Infra in 2024"));
        assert!(md.contains("## Top labels found in 'Other'"));
        assert!(!md.contains("Category Share"));
    }

    #[test]
    fn report_serializes_with_camel_case() {
        let json = serde_json::to_value(CategoryOutcome::Report(report(&ActivityOptions::default())))
            .unwrap();
        assert_eq!(json["status"], "report");
        assert_eq!(json["issuesInPeriod"], 4);
        assert!(json["other"]["families"].is_array());
    }
}
