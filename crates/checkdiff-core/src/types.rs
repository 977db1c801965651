use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CheckDiffError;

/// A contiguous span of lines on one side of a diff.
///
/// `count == 0` means the side has no lines (pure addition or pure deletion).
///
/// # Examples
///
/// ```
/// use checkdiff_core::LineRange;
///
/// let range = LineRange { start: 10, count: 0 };
/// assert!(range.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    /// First line of the span (1-based, 0 for "before the first line").
    pub start: u32,
    /// Number of lines in the span.
    pub count: u32,
}

impl LineRange {
    /// Returns `true` if the span covers no lines.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A single hunk from a zero-context unified diff.
///
/// # Examples
///
/// ```
/// use checkdiff_core::{Hunk, LineRange};
///
/// let hunk = Hunk {
///     index: 1,
///     removed: LineRange { start: 5, count: 1 },
///     added: LineRange { start: 5, count: 2 },
///     raw_text: "@@ -5 +5,2 @@\n-old\n+new\n+newer".into(),
/// };
/// assert!(!hunk.is_pure_addition());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// 1-based position of the hunk in the parsed diff.
    pub index: usize,
    /// Lines taken out of the pre-image.
    pub removed: LineRange,
    /// Lines put into the post-image.
    pub added: LineRange,
    /// Header line followed by the hunk body.
    pub raw_text: String,
}

impl Hunk {
    /// Returns `true` if the hunk removes nothing.
    pub fn is_pure_addition(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Parsed diff for a single file.
///
/// `added_total` and `removed_total` always equal the sums of the
/// corresponding counts over `hunks`; use [`Diff::from_hunks`] to build one.
///
/// # Examples
///
/// ```
/// use checkdiff_core::{Diff, Hunk, LineRange};
///
/// let diff = Diff::from_hunks(vec![Hunk {
///     index: 1,
///     removed: LineRange { start: 3, count: 2 },
///     added: LineRange { start: 3, count: 1 },
///     raw_text: String::new(),
/// }]);
/// assert_eq!(diff.removed_total, 2);
/// assert_eq!(diff.added_total, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    /// Total lines added across all hunks.
    pub added_total: u32,
    /// Total lines removed across all hunks.
    pub removed_total: u32,
    /// Hunks in source order.
    pub hunks: Vec<Hunk>,
}

impl Diff {
    /// Build a diff from hunks, computing the totals.
    pub fn from_hunks(hunks: Vec<Hunk>) -> Self {
        let added_total = hunks.iter().map(|h| h.added.count).sum();
        let removed_total = hunks.iter().map(|h| h.removed.count).sum();
        Self {
            added_total,
            removed_total,
            hunks,
        }
    }
}

/// Which neighbouring line to blame instead of the changed line itself.
///
/// # Examples
///
/// ```
/// use checkdiff_core::LineOffset;
///
/// assert_eq!(LineOffset::Before.apply(5), Some(4));
/// assert_eq!(LineOffset::After.apply(5), Some(6));
/// assert_eq!(LineOffset::Before.apply(0), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOffset {
    /// Blame the line immediately preceding the changed line.
    Before,
    /// Blame the changed line itself.
    #[default]
    None,
    /// Blame the line immediately following the changed line.
    After,
}

impl LineOffset {
    /// Signed delta applied to a line number.
    pub fn delta(self) -> i64 {
        match self {
            LineOffset::Before => -1,
            LineOffset::None => 0,
            LineOffset::After => 1,
        }
    }

    /// Shift `line` by this offset, or `None` if the result is not a valid
    /// line number.
    pub fn apply(self, line: u32) -> Option<u32> {
        u32::try_from(i64::from(line) + self.delta()).ok()
    }
}

/// A merge-base tag name of the form `MERGE_BASE_<N>`.
///
/// Ordering is by the numeric suffix, then by name, so `MERGE_BASE_10`
/// sorts after `MERGE_BASE_2`.
///
/// # Examples
///
/// ```
/// use checkdiff_core::MergeBaseTag;
///
/// let mut tags: Vec<MergeBaseTag> = ["MERGE_BASE_2", "MERGE_BASE_10", "MERGE_BASE_1"]
///     .iter()
///     .map(|t| t.parse().unwrap())
///     .collect();
/// tags.sort();
/// let names: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
/// assert_eq!(names, ["MERGE_BASE_1", "MERGE_BASE_2", "MERGE_BASE_10"]);
///
/// assert!("RELEASE_1".parse::<MergeBaseTag>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct MergeBaseTag {
    name: String,
    number: i64,
}

impl MergeBaseTag {
    /// Prefix every merge-base tag carries.
    pub const PREFIX: &'static str = "MERGE_BASE_";

    /// The full tag name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The numeric ordering key.
    pub fn number(&self) -> i64 {
        self.number
    }
}

impl FromStr for MergeBaseTag {
    type Err = CheckDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s.strip_prefix(Self::PREFIX).ok_or_else(|| {
            CheckDiffError::TagFormat(format!("{s} is not a MERGE_BASE tag"))
        })?;
        if suffix.contains('_') {
            return Err(CheckDiffError::TagFormat(format!(
                "{s} does not match MERGE_BASE_N pattern"
            )));
        }
        let number = suffix
            .parse()
            .map_err(|e| CheckDiffError::TagFormat(format!("{s}: {e}")))?;
        Ok(Self {
            name: s.to_string(),
            number,
        })
    }
}

impl Ord for MergeBaseTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for MergeBaseTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MergeBaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<MergeBaseTag> for String {
    fn from(tag: MergeBaseTag) -> Self {
        tag.name
    }
}

/// Output format for reports.
///
/// # Examples
///
/// ```
/// use checkdiff_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
