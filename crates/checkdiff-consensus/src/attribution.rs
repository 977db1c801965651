//! Map diff hunks onto the commits that last touched their lines.

use std::collections::HashMap;

use checkdiff_core::{CheckDiffError, Diff, Hunk, LineOffset, Result};
use checkdiff_gitpulse::blame::BlameTable;
use serde::Serialize;

/// Knobs for attribution.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::attribution::AttributionOptions;
/// use checkdiff_core::LineOffset;
///
/// let opts = AttributionOptions::default();
/// assert_eq!(opts.offset, LineOffset::None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributionOptions {
    /// Blame a neighbouring line instead of the removed line itself.
    /// Not applied to pure additions.
    pub offset: LineOffset,
}

/// A commit and the line numbers attributed to it, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitLines {
    /// Commit id as reported by blame.
    pub commit: String,
    /// Blamed line numbers; may repeat across hunks.
    pub lines: Vec<u32>,
}

/// A removed line whose offset position fell outside the blamed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionGap {
    /// 1-based index of the hunk the line belongs to.
    pub hunk: usize,
    /// Offset-adjusted line number.
    pub line: i64,
    /// Number of lines in the blame table.
    pub blame_lines: usize,
}

/// Result of attributing one file's diff.
///
/// Commits keep the order in which they were first encountered, which makes
/// both iteration and display deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribution {
    commits: Vec<CommitLines>,
    index: HashMap<String, usize>,
    gaps: Vec<AttributionGap>,
}

impl Attribution {
    fn record(&mut self, commit: &str, line: u32) {
        match self.index.get(commit) {
            Some(&i) => self.commits[i].lines.push(line),
            None => {
                self.index.insert(commit.to_string(), self.commits.len());
                self.commits.push(CommitLines {
                    commit: commit.to_string(),
                    lines: vec![line],
                });
            }
        }
    }

    /// Attributed commits in first-encounter order.
    pub fn commits(&self) -> &[CommitLines] {
        &self.commits
    }

    /// Lines attributed to `commit`, if it was implicated.
    pub fn lines_for(&self, commit: &str) -> Option<&[u32]> {
        self.index
            .get(commit)
            .map(|&i| self.commits[i].lines.as_slice())
    }

    /// Out-of-bounds lines skipped during attribution.
    pub fn gaps(&self) -> &[AttributionGap] {
        &self.gaps
    }

    /// Number of distinct commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns `true` if no line could be attributed.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Attribute every hunk of `diff` to commits via `blame`.
///
/// - A pure addition is attributed to the line it was inserted after (line
///   1 when inserted at the top of the file); the offset is not applied.
/// - A single removed line is shifted by the offset and looked up directly.
/// - Each line of a multi-line removal is shifted by the offset; positions
///   outside the file are recorded as [`AttributionGap`]s and skipped.
///
/// Lines without a blame commit are skipped silently.
///
/// # Errors
///
/// Returns [`CheckDiffError::Consistency`] for a hunk that removes nothing
/// and adds nothing.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::attribution::{attribute, AttributionOptions};
/// use checkdiff_core::LineOffset;
/// use checkdiff_difflens::parser::parse_diff;
/// use checkdiff_gitpulse::blame::BlameTable;
///
/// let blame = BlameTable::from_records(["a1 x", "b2 x", "c3 x", "abc123 x", "d4 x"]);
/// let diff = parse_diff("@@ -5,1 +5,1 @@\n-old\n+new\n").unwrap();
/// let opts = AttributionOptions { offset: LineOffset::Before };
/// let attribution = attribute(&diff, &blame, &opts).unwrap();
/// assert_eq!(attribution.lines_for("abc123"), Some(&[4][..]));
/// ```
pub fn attribute(
    diff: &Diff,
    blame: &BlameTable,
    options: &AttributionOptions,
) -> Result<Attribution> {
    let mut attribution = Attribution::default();

    for hunk in &diff.hunks {
        if hunk.is_pure_addition() {
            attribute_addition(hunk, blame, &mut attribution)?;
        } else if hunk.removed.count > 1 {
            attribute_removal_range(hunk, blame, options.offset, &mut attribution);
        } else {
            let Some(line) = options.offset.apply(hunk.removed.start) else {
                continue;
            };
            if let Some(commit) = blame.commit_at(line) {
                attribution.record(commit, line);
            }
        }
    }

    tracing::debug!(
        commits = attribution.len(),
        gaps = attribution.gaps.len(),
        "attributed diff"
    );
    Ok(attribution)
}

fn attribute_addition(
    hunk: &Hunk,
    blame: &BlameTable,
    attribution: &mut Attribution,
) -> Result<()> {
    if hunk.added.is_empty() {
        return Err(CheckDiffError::Consistency(format!(
            "hunk {} removes no lines but adds {} lines",
            hunk.index, hunk.added.count
        )));
    }
    let line = hunk.removed.start.max(1);
    if let Some(commit) = blame.commit_at(line) {
        attribution.record(commit, line);
    }
    Ok(())
}

fn attribute_removal_range(
    hunk: &Hunk,
    blame: &BlameTable,
    offset: LineOffset,
    attribution: &mut Attribution,
) {
    let start = i64::from(hunk.removed.start);
    let end = start + i64::from(hunk.removed.count);
    for line in start..end {
        let shifted = line + offset.delta();
        match u32::try_from(shifted).ok().filter(|&l| blame.contains(l)) {
            Some(l) => {
                if let Some(commit) = blame.commit_at(l) {
                    attribution.record(commit, l);
                }
            }
            None => {
                tracing::warn!(
                    hunk = hunk.index,
                    line = shifted,
                    blame_lines = blame.line_count(),
                    "line out of bounds"
                );
                attribution.gaps.push(AttributionGap {
                    hunk: hunk.index,
                    line: shifted,
                    blame_lines: blame.line_count(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkdiff_core::LineRange;
    use checkdiff_difflens::parser::parse_diff;

    fn blame(ids: &[&str]) -> BlameTable {
        BlameTable::from_records(ids.iter().map(|id| {
            if id.is_empty() {
                String::new()
            } else {
                format!("{id} (Author 2024-01-01 00:00:00 +0000) code")
            }
        }))
    }

    fn opts(offset: LineOffset) -> AttributionOptions {
        AttributionOptions { offset }
    }

    #[test]
    fn pure_addition_on_unattributed_line_records_nothing() {
        let mut ids = vec!["c1"; 12];
        ids[9] = "";
        let diff = parse_diff("@@ -10,0 +10,3 @@\n+a\n+b\n+c\n").unwrap();
        let result = attribute(&diff, &blame(&ids), &opts(LineOffset::None)).unwrap();
        assert!(result.is_empty());
        assert!(result.gaps().is_empty());
    }

    #[test]
    fn pure_addition_ignores_offset() {
        let diff = parse_diff("@@ -2,0 +3 @@\n+x\n").unwrap();
        let table = blame(&["a", "b", "c"]);
        for offset in [LineOffset::Before, LineOffset::None, LineOffset::After] {
            let result = attribute(&diff, &table, &opts(offset)).unwrap();
            assert_eq!(result.lines_for("b"), Some(&[2][..]));
            assert_eq!(result.len(), 1);
        }
    }

    #[test]
    fn insertion_at_file_start_blames_line_one() {
        let diff = parse_diff("@@ -0,0 +1,2 @@\n+x\n+y\n").unwrap();
        let result = attribute(&diff, &blame(&["first", "second"]), &opts(LineOffset::None))
            .unwrap();
        assert_eq!(result.lines_for("first"), Some(&[1][..]));
    }

    #[test]
    fn single_line_removal_applies_offset() {
        let diff = parse_diff("@@ -5,1 +5,1 @@\n-old\n+new\n").unwrap();
        let table = blame(&["l1", "l2", "l3", "abc123", "l5", "l6"]);

        let before = attribute(&diff, &table, &opts(LineOffset::Before)).unwrap();
        assert_eq!(before.commits().len(), 1);
        assert_eq!(before.lines_for("abc123"), Some(&[4][..]));

        let same = attribute(&diff, &table, &opts(LineOffset::None)).unwrap();
        assert_eq!(same.lines_for("l5"), Some(&[5][..]));

        let after = attribute(&diff, &table, &opts(LineOffset::After)).unwrap();
        assert_eq!(after.lines_for("l6"), Some(&[6][..]));
    }

    #[test]
    fn single_line_out_of_bounds_is_skipped_silently() {
        let diff = parse_diff("@@ -3 +3 @@\n-old\n+new\n").unwrap();
        let result = attribute(&diff, &blame(&["a", "b", "c"]), &opts(LineOffset::After)).unwrap();
        assert!(result.is_empty());
        assert!(result.gaps().is_empty());

        let diff = parse_diff("@@ -1 +1 @@\n-old\n+new\n").unwrap();
        let result = attribute(&diff, &blame(&["a"]), &opts(LineOffset::Before)).unwrap();
        assert!(result.is_empty());
        assert!(result.gaps().is_empty());
    }

    #[test]
    fn multi_line_removal_records_gaps_for_out_of_bounds_lines() {
        let diff = parse_diff("@@ -2,2 +1,0 @@\n-b\n-c\n").unwrap();
        let table = blame(&["a", "b", "c"]);
        let result = attribute(&diff, &table, &opts(LineOffset::After)).unwrap();
        assert_eq!(result.lines_for("c"), Some(&[3][..]));
        assert_eq!(
            result.gaps(),
            &[AttributionGap {
                hunk: 1,
                line: 4,
                blame_lines: 3
            }]
        );
    }

    #[test]
    fn multi_line_removal_at_top_with_before_offset() {
        let diff = parse_diff("@@ -1,2 +0,0 @@\n-a\n-b\n").unwrap();
        let result =
            attribute(&diff, &blame(&["a", "b"]), &opts(LineOffset::Before)).unwrap();
        assert_eq!(result.lines_for("a"), Some(&[1][..]));
        assert_eq!(result.gaps().len(), 1);
        assert_eq!(result.gaps()[0].line, 0);
    }

    #[test]
    fn lines_accumulate_per_commit_in_encounter_order() {
        let diff = parse_diff(
            "\
@@ -1,3 +1,0 @@
-a
-b
-c
@@ -6 +3 @@
-f
+F
@@ -2,0 +4 @@
+g
",
        )
        .unwrap();
        let table = blame(&["x", "y", "x", "z", "z", "y"]);
        let result = attribute(&diff, &table, &opts(LineOffset::None)).unwrap();
        let order: Vec<&str> = result.commits().iter().map(|c| c.commit.as_str()).collect();
        assert_eq!(order, ["x", "y"]);
        assert_eq!(result.lines_for("x"), Some(&[1, 3][..]));
        assert_eq!(result.lines_for("y"), Some(&[2, 6, 2][..]));
        assert_eq!(result.lines_for("z"), None);
    }

    #[test]
    fn attribution_is_deterministic() {
        let diff = parse_diff("@@ -1,4 +1 @@\n-a\n-b\n-c\n-d\n+e\n").unwrap();
        let table = blame(&["p", "q", "p", "r"]);
        let first = attribute(&diff, &table, &opts(LineOffset::None)).unwrap();
        for _ in 0..5 {
            assert_eq!(attribute(&diff, &table, &opts(LineOffset::None)).unwrap(), first);
        }
    }

    #[test]
    fn empty_pure_addition_is_a_consistency_error() {
        let diff = Diff::from_hunks(vec![Hunk {
            index: 1,
            removed: LineRange { start: 4, count: 0 },
            added: LineRange { start: 4, count: 0 },
            raw_text: "@@ -4,0 +4,0 @@".into(),
        }]);
        let err = attribute(&diff, &blame(&["a"; 5]), &opts(LineOffset::None)).unwrap_err();
        assert!(matches!(err, CheckDiffError::Consistency(_)));
    }
}
