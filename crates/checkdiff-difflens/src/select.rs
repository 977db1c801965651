//! Restrict a diff to an explicit subset of its hunks.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use checkdiff_core::{CheckDiffError, Diff};

/// A set of 1-based hunk indices, in the order `git diff -U0` prints them.
///
/// # Examples
///
/// ```
/// use checkdiff_difflens::select::HunkSelection;
///
/// let selection: HunkSelection = "1,3".parse().unwrap();
/// assert!(selection.contains(3));
/// assert!(!selection.contains(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HunkSelection {
    indices: BTreeSet<usize>,
}

impl HunkSelection {
    /// Build a selection from 1-based indices.
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    /// Returns `true` if the 1-based `index` is selected.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Keep only the selected hunks, recomputing totals over the kept ones.
    ///
    /// Hunks are matched by their parser-assigned [`Hunk::index`], so
    /// filtering an already filtered diff again is a no-op. Indices past the
    /// end of the diff select nothing.
    ///
    /// [`Hunk::index`]: checkdiff_core::Hunk::index
    ///
    /// # Examples
    ///
    /// ```
    /// use checkdiff_difflens::parser::parse_diff;
    /// use checkdiff_difflens::select::HunkSelection;
    ///
    /// let diff = parse_diff("@@ -1 +1 @@\n-a\n+b\n@@ -9,2 +9 @@\n-c\n-d\n+e\n").unwrap();
    /// let picked = HunkSelection::new([2, 7]).apply(&diff);
    /// assert_eq!(picked.hunks.len(), 1);
    /// assert_eq!(picked.removed_total, 2);
    /// ```
    pub fn apply(&self, diff: &Diff) -> Diff {
        let hunks = diff
            .hunks
            .iter()
            .filter(|h| self.contains(h.index))
            .cloned()
            .collect();
        Diff::from_hunks(hunks)
    }
}

/// Apply an optional selection; `None` passes the diff through unchanged.
pub fn select_hunks(diff: Diff, selection: Option<&HunkSelection>) -> Diff {
    match selection {
        Some(selection) => selection.apply(&diff),
        None => diff,
    }
}

impl FromStr for HunkSelection {
    type Err = CheckDiffError;

    /// Parse a comma separated list such as `"1,3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut indices = BTreeSet::new();
        for part in s.split(',') {
            let part = part.trim();
            let n = part
                .parse()
                .map_err(|e| CheckDiffError::Usage(format!("{part}: {e}")))?;
            indices.insert(n);
        }
        Ok(Self { indices })
    }
}

impl fmt::Display for HunkSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.indices.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}
