//! Label and title heuristics that map an issue onto a [`Category`].
//!
//! Rules are evaluated in a fixed priority order and the first match wins:
//! Bug > Dependency > Infra > Feature > Docs, with Other as the fallback.
//! Status and workflow labels (`status/*`, `triage`, ...) are intentionally
//! left to Other.

use std::sync::LazyLock;

use issuelens_core::Category;
use regex::Regex;

struct Rule {
    category: Category,
    /// Matched as case-insensitive substrings of any label.
    label_terms: &'static [&'static str],
    /// Matched when a label equals the family or starts with `family/`.
    label_families: &'static [&'static str],
    /// Whole-word pattern over the lowercased title.
    title: Regex,
}

impl Rule {
    fn new(
        category: Category,
        label_terms: &'static [&'static str],
        label_families: &'static [&'static str],
        title_pattern: &str,
    ) -> Self {
        Self {
            category,
            label_terms,
            label_families,
            title: Regex::new(title_pattern).expect("title pattern is a valid regex"),
        }
    }

    fn matches(&self, labels: &[String], title: &str) -> bool {
        labels.iter().any(|label| {
            self.label_terms.iter().any(|term| label.contains(term))
                || self
                    .label_families
                    .iter()
                    .any(|family| in_family(label, family))
        }) || self.title.is_match(title)
    }
}

static RULES: LazyLock<[Rule; 5]> = LazyLock::new(|| {
    [
        Rule::new(
            Category::Bug,
            &[
                "kind/bug",
                "bug",
                "crash",
                "regression",
                "panic",
                "traceback",
                "segfault",
                "needs-reproduction",
            ],
            &[],
            r"\b(?:bug|crash|regression|error|fix(?:es)?)\b",
        ),
        Rule::new(
            Category::Dependency,
            &[
                "dependency",
                "dependencies",
                "deps",
                "dependabot",
                "bump",
                "chore(deps)",
                "security(deps)",
            ],
            &[],
            r"\b(?:dependenc(?:y|ies)|deps|dependabot|bump|poetry\.lock)\b",
        ),
        Rule::new(
            Category::Infra,
            &[
                "ci",
                "cd",
                "workflow",
                "github actions",
                "pipeline",
                "build",
                "release",
                "refactor",
                "tooling",
                "flake8",
                "ruff",
                "test",
                "tests",
                "pytest",
                "unittest",
            ],
            &[
                "area/ci",
                "area/cli",
                "area/core",
                "area/config",
                "area/installer",
                "area/solver",
            ],
            r"\b(?:ci|cd|workflow|build|release|pipeline|tests?)\b",
        ),
        Rule::new(
            Category::Feature,
            &[
                "kind/feature",
                "kind/enhancement",
                "feature",
                "enhancement",
                "improvement",
            ],
            &[],
            r"\b(?:feature|enhancement|improvement|proposal|request)\b",
        ),
        Rule::new(
            Category::Docs,
            &[
                "docs",
                "documentation",
                "readme",
                "guide",
                "tutorial",
                "howto",
                "how-to",
                "faq",
                "kind/question",
            ],
            &["area/docs", "docs/faq"],
            r"\b(?:docs?|readme|guide|tutorial|how[- ]?to|faq)\b",
        ),
    ]
});

/// `true` if `label` is `family` itself or a member `family/...`.
///
/// Both sides are expected lowercase. A family only matches from the start
/// of the label, so `scary/area` is not in family `area`.
fn in_family(label: &str, family: &str) -> bool {
    label
        .strip_prefix(family)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Classify an issue from its labels and title.
///
/// Total and deterministic: every input yields exactly one category. An
/// empty label list is fine; the title alone then decides.
///
/// # Examples
///
/// ```
/// use issuelens_core::Category;
/// use issuelens_tracker::classify::classify;
///
/// let labels = vec!["kind/bug".to_string(), "area/cli".to_string()];
/// assert_eq!(classify(&labels, "App crashes on save"), Category::Bug);
///
/// assert_eq!(classify(&["area/docs".to_string()], "Clarify install steps"), Category::Docs);
/// assert_eq!(classify(&[], "Add a plugin proposal"), Category::Feature);
/// assert_eq!(classify(&["status/triage".to_string()], "Odd behaviour"), Category::Other);
/// ```
pub fn classify(labels: &[String], title: &str) -> Category {
    let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let title = title.to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.matches(&labels, &title))
        .map_or(Category::Other, |rule| rule.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bug_beats_feature() {
        assert_eq!(
            classify(&labels(&["bug", "enhancement"]), "Something"),
            Category::Bug
        );
    }

    #[test]
    fn bug_beats_infra_family() {
        assert_eq!(
            classify(&labels(&["kind/bug", "area/cli"]), "App crashes on save"),
            Category::Bug
        );
    }

    #[test]
    fn dependency_beats_infra() {
        assert_eq!(
            classify(&labels(&["dependencies", "ci"]), "Update action"),
            Category::Dependency
        );
    }

    #[test]
    fn infra_beats_feature_and_docs() {
        assert_eq!(
            classify(&labels(&["area/solver", "kind/feature"]), "Faster resolution"),
            Category::Infra
        );
        assert_eq!(
            classify(&labels(&["pytest", "documentation"]), "Something"),
            Category::Infra
        );
    }

    #[test]
    fn feature_beats_docs() {
        assert_eq!(
            classify(&labels(&["kind/feature"]), "Improve the docs"),
            Category::Feature
        );
    }

    #[test]
    fn docs_family_match() {
        assert_eq!(classify(&labels(&["area/docs"]), "Clarify"), Category::Docs);
        assert_eq!(
            classify(&labels(&["docs/faq/venv"]), "Clarify"),
            Category::Docs
        );
    }

    #[test]
    fn family_requires_prefix_segment() {
        assert!(in_family("area/cli", "area/cli"));
        assert!(in_family("area/cli/run", "area/cli"));
        assert!(!in_family("area/client", "area/cli"));
        assert!(!in_family("scary/area", "area"));
        assert!(!in_family("x-area/cli", "area/cli"));
    }

    #[test]
    fn label_match_is_case_insensitive() {
        assert_eq!(classify(&labels(&["Kind/Bug"]), ""), Category::Bug);
        assert_eq!(classify(&labels(&["DEPENDABOT"]), ""), Category::Dependency);
    }

    #[test]
    fn label_terms_are_substrings() {
        assert_eq!(
            classify(&labels(&["kind/feature-request"]), ""),
            Category::Feature
        );
        assert_eq!(classify(&labels(&["release-blocker"]), ""), Category::Infra);
    }

    #[test]
    fn title_uses_whole_words() {
        assert_eq!(classify(&[], "Error when installing"), Category::Bug);
        assert_eq!(classify(&[], "Fixes lock handling"), Category::Bug);
        assert_eq!(classify(&[], "Bump requests to 2.31"), Category::Dependency);
        assert_eq!(classify(&[], "Update poetry.lock"), Category::Dependency);
        assert_eq!(classify(&[], "Tests are flaky on windows"), Category::Infra);
        assert_eq!(classify(&[], "Add a how-to for plugins"), Category::Docs);
        assert_eq!(classify(&[], "Add a how to for plugins"), Category::Docs);
        // Substrings of unrelated words do not count.
        assert_eq!(classify(&[], "Debugging output is terse"), Category::Other);
        assert_eq!(classify(&[], "Decide on cdn"), Category::Other);
        assert_eq!(classify(&[], "Prefix handling"), Category::Other);
        assert_eq!(classify(&[], "Guidelines"), Category::Other);
    }

    #[test]
    fn status_labels_fall_through_to_other() {
        assert_eq!(
            classify(&labels(&["status/triage", "status/duplicate"]), "Odd"),
            Category::Other
        );
    }

    #[test]
    fn empty_inputs_are_other() {
        assert_eq!(classify(&[], ""), Category::Other);
    }

    #[test]
    fn classification_is_total_and_deterministic() {
        let samples = [
            (labels(&[]), "Lorem ipsum"),
            (labels(&["kind/question"]), ""),
            (labels(&["area/installer"]), ""),
            (labels(&["good first issue"]), "Crash"),
        ];
        for (l, t) in &samples {
            let first = classify(l, t);
            assert_eq!(first, classify(l, t));
            assert!(Category::ALL.contains(&first));
        }
    }
}
