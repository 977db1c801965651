//! Per-line blame records for the checked-out revision of a file.

/// One raw blame record, e.g. a line of `git blame -l` output.
///
/// The commit id is the text before the first space. A record without a
/// space carries no attribution.
///
/// # Examples
///
/// ```
/// use checkdiff_gitpulse::blame::LineBlame;
///
/// let line = LineBlame::new("abc123 (alice 2024-01-01 1) fn main() {");
/// assert_eq!(line.commit_id(), Some("abc123"));
/// assert_eq!(LineBlame::new("").commit_id(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBlame(String);

impl LineBlame {
    /// Wrap a raw blame record.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The commit id leading this record, if any.
    pub fn commit_id(&self) -> Option<&str> {
        let (id, _) = self.0.split_once(' ')?;
        (!id.is_empty()).then_some(id)
    }
}

/// Line-number indexed blame for one file.
///
/// Index 0 is a reserved sentinel so 1-based line numbers index the table
/// directly; it never carries a commit id. The table is immutable once built.
///
/// # Examples
///
/// ```
/// use checkdiff_gitpulse::blame::BlameTable;
///
/// let blame = BlameTable::from_records(["aaa (x) one", "bbb (y) two"]);
/// assert_eq!(blame.line_count(), 2);
/// assert_eq!(blame.commit_at(2), Some("bbb"));
/// assert_eq!(blame.commit_at(0), None);
/// assert_eq!(blame.commit_at(3), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameTable {
    records: Vec<LineBlame>,
}

impl BlameTable {
    /// Build a table from per-line records, first record is line 1.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = vec![LineBlame::default()];
        table.extend(records.into_iter().map(LineBlame::new));
        Self { records: table }
    }

    /// Number of blamed lines (the sentinel is not counted).
    pub fn line_count(&self) -> usize {
        self.records.len() - 1
    }

    /// Returns `true` if `line` is a real line of the file.
    pub fn contains(&self, line: u32) -> bool {
        line > 0 && (line as usize) <= self.line_count()
    }

    /// Commit id that introduced `line`, or `None` for the sentinel, lines
    /// past the end, and records with no attribution.
    pub fn commit_at(&self, line: u32) -> Option<&str> {
        if !self.contains(line) {
            return None;
        }
        self.records.get(line as usize)?.commit_id()
    }
}
