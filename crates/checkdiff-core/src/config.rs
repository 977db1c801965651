use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CheckDiffError;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".checkdiff.toml";

/// Top-level configuration loaded from `.checkdiff.toml`.
///
/// Supports layered resolution: CLI flags > config file > defaults.
///
/// # Examples
///
/// ```
/// use checkdiff_core::CheckDiffConfig;
///
/// let config = CheckDiffConfig::default();
/// assert_eq!(config.display.limit, 7);
/// assert_eq!(config.tags.pattern, "MERGE_BASE_*");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckDiffConfig {
    /// Report display settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Merge-base tag lookup settings.
    #[serde(default)]
    pub tags: TagConfig,
    /// Branch display settings.
    #[serde(default)]
    pub branches: BranchConfig,
}

impl CheckDiffConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckDiffError::Io`] if the file cannot be read, or
    /// [`CheckDiffError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use checkdiff_core::CheckDiffConfig;
    /// use std::path::Path;
    ///
    /// let config = CheckDiffConfig::from_file(Path::new(".checkdiff.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CheckDiffError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CheckDiffError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use checkdiff_core::CheckDiffConfig;
    ///
    /// let toml = r#"
    /// [display]
    /// limit = 3
    /// "#;
    /// let config = CheckDiffConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.display.limit, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CheckDiffError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load `path` if given, else `.checkdiff.toml` in `dir` if it exists,
    /// else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CheckDiffError::FileNotFound`] if an explicit `path` does not
    /// exist, or any error from [`CheckDiffConfig::from_file`].
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, CheckDiffError> {
        match path {
            Some(p) if !p.exists() => Err(CheckDiffError::FileNotFound(p.to_path_buf())),
            Some(p) => Self::from_file(p),
            None => {
                let default_path = dir.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Report display configuration.
///
/// # Examples
///
/// ```
/// use checkdiff_core::DisplayConfig;
///
/// let config = DisplayConfig::default();
/// assert_eq!(config.limit, 7);
/// assert!(!config.show_lines);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Maximum merge-base tags to list; 0 lists all (default: 7).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Show implicated line numbers for every commit.
    #[serde(default)]
    pub show_lines: bool,
    /// Show commit dates.
    #[serde(default)]
    pub show_date: bool,
    /// Print the raw text of each checked hunk.
    #[serde(default)]
    pub show_hunks: bool,
}

fn default_limit() -> usize {
    7
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            show_lines: false,
            show_date: false,
            show_hunks: false,
        }
    }
}

/// Merge-base tag lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagConfig {
    /// Glob selecting the tags considered merge-base markers.
    #[serde(default = "default_tag_pattern")]
    pub pattern: String,
}

fn default_tag_pattern() -> String {
    "MERGE_BASE_*".into()
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            pattern: default_tag_pattern(),
        }
    }
}

/// Branch display configuration.
///
/// # Examples
///
/// ```
/// use checkdiff_core::BranchConfig;
///
/// let config = BranchConfig::default();
/// assert_eq!(config.patterns, vec!["origin/develop", "origin/release-*"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchConfig {
    /// Globs selecting the remote-tracking branches shown next to a commit.
    #[serde(default = "default_branch_patterns")]
    pub patterns: Vec<String>,
}

fn default_branch_patterns() -> Vec<String> {
    vec!["origin/develop".into(), "origin/release-*".into()]
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            patterns: default_branch_patterns(),
        }
    }
}

/// Compile a glob pattern, mapping failures to [`CheckDiffError::Config`].
///
/// # Examples
///
/// ```
/// use checkdiff_core::compile_pattern;
///
/// let pattern = compile_pattern("MERGE_BASE_*").unwrap();
/// assert!(pattern.matches("MERGE_BASE_12"));
/// assert!(compile_pattern("[").is_err());
/// ```
pub fn compile_pattern(pattern: &str) -> Result<glob::Pattern, CheckDiffError> {
    glob::Pattern::new(pattern)
        .map_err(|e| CheckDiffError::Config(format!("invalid pattern '{pattern}': {e}")))
}
