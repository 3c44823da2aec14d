use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// High-level issue category assigned by the classifier.
///
/// The set is closed. [`Category::ALL`] lists the categories in display
/// order, which is not the order the classifier evaluates its rules in.
///
/// # Examples
///
/// ```
/// use issuelens_core::Category;
///
/// let cat: Category = "docs".parse().unwrap();
/// assert_eq!(cat, Category::Docs);
/// assert_eq!(cat.to_string(), "Docs");
/// assert_eq!(cat.color(), "#9467bd");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Defects, crashes, regressions.
    Bug,
    /// Feature requests and enhancements.
    Feature,
    /// Documentation, guides, and questions.
    Docs,
    /// Dependency bumps and lockfile churn.
    Dependency,
    /// CI, build, release, tooling, and core plumbing.
    Infra,
    /// Everything the rules above do not claim.
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Bug,
        Category::Feature,
        Category::Docs,
        Category::Dependency,
        Category::Infra,
        Category::Other,
    ];

    /// Display name, e.g. `"Dependency"`.
    pub fn name(self) -> &'static str {
        match self {
            Category::Bug => "Bug",
            Category::Feature => "Feature",
            Category::Docs => "Docs",
            Category::Dependency => "Dependency",
            Category::Infra => "Infra",
            Category::Other => "Other",
        }
    }

    /// Hex color used when charting this category.
    pub fn color(self) -> &'static str {
        match self {
            Category::Bug => "#d62728",
            Category::Feature => "#2ca02c",
            Category::Docs => "#9467bd",
            Category::Dependency => "#1f77b4",
            Category::Infra => "#ff7f0e",
            Category::Other => "#7f7f7f",
        }
    }

    /// Position of this category in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Category::Bug => 0,
            Category::Feature => 1,
            Category::Docs => 2,
            Category::Dependency => 3,
            Category::Infra => 4,
            Category::Other => 5,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown category: {} (expected one of Bug, Feature, Docs, Dependency, Infra, Other)",
                    s.trim()
                )
            })
    }
}

/// Lifecycle state of an issue, normalized from the free-text source value.
///
/// # Examples
///
/// ```
/// use issuelens_core::IssueState;
///
/// assert_eq!(IssueState::normalize("OPEN"), IssueState::Open);
/// assert_eq!(IssueState::normalize("closed"), IssueState::Closed);
/// assert_eq!(IssueState::normalize("merged"), IssueState::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// State text contains "open".
    Open,
    /// State text contains "close".
    Closed,
    /// Anything else, including an empty state.
    Other,
}

impl IssueState {
    /// Map a raw state string onto open / closed / other.
    ///
    /// Matching is case-insensitive containment, so `"reopened"` counts as open.
    pub fn normalize(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("open") {
            IssueState::Open
        } else if lower.contains("close") {
            IssueState::Closed
        } else {
            IssueState::Other
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
            IssueState::Other => write!(f, "other"),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use issuelens_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// GitHub-flavored Markdown tables.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_str_is_case_insensitive() {
        assert_eq!("bug".parse::<Category>().unwrap(), Category::Bug);
        assert_eq!(" INFRA ".parse::<Category>().unwrap(), Category::Infra);
        assert_eq!("Dependency".parse::<Category>().unwrap(), Category::Dependency);
        assert!("chore".parse::<Category>().is_err());
    }

    #[test]
    fn category_index_matches_display_order() {
        for (i, cat) in Category::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
    }

    #[test]
    fn category_serializes_as_display_name() {
        let json = serde_json::to_string(&Category::Dependency).unwrap();
        assert_eq!(json, "\"Dependency\"");
    }

    #[test]
    fn state_normalization() {
        assert_eq!(IssueState::normalize("open"), IssueState::Open);
        assert_eq!(IssueState::normalize("Reopened"), IssueState::Open);
        assert_eq!(IssueState::normalize("CLOSED"), IssueState::Closed);
        assert_eq!(IssueState::normalize(""), IssueState::Other);
        assert_eq!(IssueState::normalize("-"), IssueState::Other);
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
