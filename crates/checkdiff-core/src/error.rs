use std::path::PathBuf;

/// Errors that can occur while checking a diff.
///
/// Every variant is fatal for the whole invocation. Lines that cannot be
/// attributed to a commit are not errors; they are reported as
/// attribution gaps alongside the normal output.
///
/// # Examples
///
/// ```
/// use checkdiff_core::CheckDiffError;
///
/// let err = CheckDiffError::Usage("no files given".into());
/// assert!(err.to_string().contains("no files given"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CheckDiffError {
    /// Bad command-line usage.
    #[error("usage error: {0}")]
    #[diagnostic(
        code(checkdiff::usage),
        help("usage: git check-diff [OPTIONS] <FILE>...")
    )]
    Usage(String),

    /// Malformed diff input.
    #[error("parse error: {0}")]
    #[diagnostic(code(checkdiff::parse))]
    Parse(String),

    /// An internal invariant was violated upstream of attribution.
    #[error("consistency error: {0}")]
    #[diagnostic(code(checkdiff::consistency))]
    Consistency(String),

    /// A tag name does not follow the `MERGE_BASE_<N>` pattern.
    #[error("tag format error: {0}")]
    #[diagnostic(
        code(checkdiff::tag_format),
        help("merge-base tags must be named MERGE_BASE_<integer>")
    )]
    TagFormat(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(checkdiff::config))]
    Config(String),

    /// Git process or repository failure.
    #[error("git error: {0}")]
    #[diagnostic(code(checkdiff::git))]
    Git(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
