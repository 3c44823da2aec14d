//! Label normalization.
//!
//! Issue exports carry labels either as bare strings or as records with a
//! `name` field (the GitHub API shape). Everything downstream works on a flat
//! list of strings.

use serde::Deserialize;

/// One label as it appears in the export.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::labels::LabelEntry;
///
/// let bare: LabelEntry = serde_json::from_str("\"kind/bug\"").unwrap();
/// let record: LabelEntry = serde_json::from_str(r#"{"name": "area/cli", "color": "fff"}"#).unwrap();
/// assert_eq!(bare.name(), Some("kind/bug"));
/// assert_eq!(record.name(), Some("area/cli"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelEntry {
    /// A plain label string.
    Name(String),
    /// A structured label record; only `name` is used.
    Record {
        /// Label name; may be absent in malformed records.
        #[serde(default)]
        name: Option<String>,
    },
}

impl LabelEntry {
    /// The label text, or `None` for a record without a usable name.
    pub fn name(&self) -> Option<&str> {
        match self {
            LabelEntry::Name(name) => Some(name),
            LabelEntry::Record { name } => name.as_deref().filter(|n| !n.is_empty()),
        }
    }
}

/// Flatten label entries into plain strings.
///
/// Order and duplicates are preserved. Records with an empty or missing
/// name are dropped.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::labels::{normalize_labels, LabelEntry};
///
/// let entries = vec![
///     LabelEntry::Name("kind/bug".into()),
///     LabelEntry::Record { name: None },
///     LabelEntry::Record { name: Some("area/cli".into()) },
/// ];
/// assert_eq!(normalize_labels(&entries), vec!["kind/bug", "area/cli"]);
/// ```
pub fn normalize_labels(entries: &[LabelEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(LabelEntry::name)
        .map(str::to_string)
        .collect()
}

/// Decode raw JSON label values, dropping anything that is neither a string
/// nor an object.
pub(crate) fn labels_from_json(values: &[serde_json::Value]) -> Vec<String> {
    let entries: Vec<LabelEntry> = values
        .iter()
        .filter_map(|v| {
            if !(v.is_string() || v.is_object()) {
                return None;
            }
            LabelEntry::deserialize(v).ok()
        })
        .collect();
    let skipped = values.len() - entries.len();
    if skipped > 0 {
        tracing::debug!(skipped, "dropped malformed label entries");
    }
    normalize_labels(&entries)
}

/// The family of a label: the text before the first `/`, or the whole label.
///
/// # Examples
///
/// ```
/// use issuelens_tracker::labels::split_family;
///
/// assert_eq!(split_family("area/docs/faq"), ("area", "docs/faq"));
/// assert_eq!(split_family("duplicate"), ("duplicate", ""));
/// ```
pub fn split_family(label: &str) -> (&str, &str) {
    match label.split_once('/') {
        Some((family, rest)) => (family, rest),
        None => (label, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_entries_keep_order_and_duplicates() {
        let values = vec![
            json!("status/triage"),
            json!({"name": "kind/bug", "color": "d73a4a"}),
            json!("status/triage"),
        ];
        assert_eq!(
            labels_from_json(&values),
            vec!["status/triage", "kind/bug", "status/triage"]
        );
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let values = vec![
            json!(42),
            json!(null),
            json!({"name": ""}),
            json!({"color": "fff"}),
            json!({"name": 7}),
            json!("area/docs"),
        ];
        assert_eq!(labels_from_json(&values), vec!["area/docs"]);
    }

    #[test]
    fn record_case_is_preserved() {
        let values = vec![json!({"name": "Kind/Bug"})];
        assert_eq!(labels_from_json(&values), vec!["Kind/Bug"]);
    }

    #[test]
    fn family_split_uses_first_slash() {
        assert_eq!(split_family("a/b/c"), ("a", "b/c"));
        assert_eq!(split_family("/leading"), ("", "leading"));
        assert_eq!(split_family("trailing/"), ("trailing", ""));
    }
}
