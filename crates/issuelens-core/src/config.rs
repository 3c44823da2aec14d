use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::IssueLensError;

/// Top-level configuration loaded from `.issuelens.toml`.
///
/// Every field has a default, so an empty file is valid. CLI flags take
/// precedence over values read here.
///
/// # Examples
///
/// ```
/// use issuelens_core::IssueLensConfig;
///
/// let config = IssueLensConfig::default();
/// assert_eq!(config.activity.top_n, 5);
/// assert_eq!(config.impact.months, 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueLensConfig {
    /// Where the issue export lives.
    #[serde(default)]
    pub data: DataConfig,
    /// Most-active-categories report settings.
    #[serde(default)]
    pub activity: ActivityConfig,
    /// Multi-area impact settings.
    #[serde(default)]
    pub impact: ImpactConfig,
    /// Resolution-time correlation settings.
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

impl IssueLensConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IssueLensError::FileNotFound`] if the file does not exist,
    /// [`IssueLensError::Io`] if it cannot be read, or
    /// [`IssueLensError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use issuelens_core::IssueLensConfig;
    /// use std::path::Path;
    ///
    /// let config = IssueLensConfig::from_file(Path::new(".issuelens.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, IssueLensError> {
        if !path.exists() {
            return Err(IssueLensError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`IssueLensError::Toml`] if parsing fails, or
    /// [`IssueLensError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use issuelens_core::IssueLensConfig;
    ///
    /// let toml = r#"
    /// [activity]
    /// top_n = 10
    /// "#;
    /// let config = IssueLensConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.activity.top_n, 10);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, IssueLensError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), IssueLensError> {
        if self.activity.title_width == 0 {
            return Err(IssueLensError::Config(
                "activity.title_width must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Input data location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the issues JSON export (default: `./poetry_issues.json`).
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./poetry_issues.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

/// Settings for the most-active-categories report.
///
/// # Examples
///
/// ```
/// use issuelens_core::ActivityConfig;
///
/// let config = ActivityConfig::default();
/// assert_eq!(config.other_top_k, 10);
/// assert_eq!(config.title_width, 80);
/// assert_eq!(config.max_labels, 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Number of issues in the ranked table (default: 5).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Rows in each table of the "Other" breakdown (default: 10).
    #[serde(default = "default_other_top_k")]
    pub other_top_k: usize,
    /// Titles longer than this are truncated with an ellipsis (default: 80).
    #[serde(default = "default_title_width")]
    pub title_width: usize,
    /// Labels shown per ranked row (default: 4).
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,
    /// Wrap width for chart axis labels; presentation only (default: 60).
    #[serde(default = "default_wrap_at")]
    pub wrap_at: usize,
}

fn default_top_n() -> usize {
    5
}

fn default_other_top_k() -> usize {
    10
}

fn default_title_width() -> usize {
    80
}

fn default_max_labels() -> usize {
    4
}

fn default_wrap_at() -> usize {
    60
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            other_top_k: default_other_top_k(),
            title_width: default_title_width(),
            max_labels: default_max_labels(),
            wrap_at: default_wrap_at(),
        }
    }
}

/// Settings for the multi-area impact analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactConfig {
    /// Look back this many months; `0` means all time (default: 0).
    #[serde(default)]
    pub months: u32,
    /// Areas shown in the impact ranking (default: 10).
    #[serde(default = "default_top_areas")]
    pub top_areas: usize,
}

fn default_top_areas() -> usize {
    10
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            months: 0,
            top_areas: default_top_areas(),
        }
    }
}

/// Settings for the resolution-time correlation.
///
/// # Examples
///
/// ```
/// use issuelens_core::ResolutionConfig;
///
/// let config = ResolutionConfig::default();
/// assert_eq!(config.events, vec!["labeled", "assigned"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Event types whose first occurrence is correlated with resolution time.
    #[serde(default = "default_resolution_events")]
    pub events: Vec<String>,
}

fn default_resolution_events() -> Vec<String> {
    vec!["labeled".into(), "assigned".into()]
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            events: default_resolution_events(),
        }
    }
}
