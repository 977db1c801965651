//! Text and JSON rendering of check results.

use std::fmt::Write;

use checkdiff_core::{MergeBaseTag, Result};
use chrono::Local;

use crate::check::{CommitReport, FileReport, RunReport};

/// Presentation settings for the text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Maximum number of tags per list; `None` shows all.
    pub limit: Option<usize>,
    /// Show implicated lines for each commit even when a consensus exists.
    pub show_lines: bool,
    /// Print the raw text of each checked hunk.
    pub show_hunks: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            limit: Some(7),
            show_lines: false,
            show_hunks: false,
        }
    }
}

/// Join tags with spaces, truncated to `limit` entries.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::report::format_tags;
/// use checkdiff_core::MergeBaseTag;
///
/// let tags: Vec<MergeBaseTag> = ["MERGE_BASE_1", "MERGE_BASE_2", "MERGE_BASE_3"]
///     .iter()
///     .map(|t| t.parse().unwrap())
///     .collect();
/// assert_eq!(format_tags(&tags, None), "MERGE_BASE_1 MERGE_BASE_2 MERGE_BASE_3");
/// assert_eq!(
///     format_tags(&tags, Some(2)),
///     "MERGE_BASE_1 MERGE_BASE_2 ... 1 more (use --all to show all)"
/// );
/// ```
pub fn format_tags(tags: &[MergeBaseTag], limit: Option<usize>) -> String {
    let shown = match limit {
        Some(n) if n < tags.len() => n,
        _ => tags.len(),
    };
    let mut out = tags[..shown]
        .iter()
        .map(MergeBaseTag::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    if shown < tags.len() {
        let _ = write!(out, " ... {} more (use --all to show all)", tags.len() - shown);
    }
    out
}

/// Render a whole invocation as text.
///
/// Files are separated by a blank line. With more than one file the report
/// ends with the cross-file verdict.
pub fn render_text(report: &RunReport, options: &DisplayOptions) -> String {
    let mut out = String::new();
    for (i, file) in report.files.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_file(&mut out, file, options);
    }
    if report.files.len() > 1 {
        out.push('\n');
        if report.common_tags.is_empty() {
            out.push_str("NO COMMON TAG\n");
        } else {
            let _ = writeln!(
                out,
                "COMMON TAG: {}",
                format_tags(&report.common_tags, options.limit)
            );
        }
    }
    out
}

fn render_file(out: &mut String, file: &FileReport, options: &DisplayOptions) {
    let _ = writeln!(out, "{}", file.path.display());
    let _ = writeln!(
        out,
        "    Lines: {} removed, {} added",
        file.removed_total, file.added_total
    );
    if options.show_hunks {
        for hunk in &file.hunks {
            let _ = writeln!(out, "{}", hunk.raw_text);
        }
    }
    for gap in &file.gaps {
        let _ = writeln!(
            out,
            "    warning: line {} is out of bounds (blame has {} lines)",
            gap.line, gap.blame_lines
        );
    }

    if file.has_common() {
        out.push_str("    Commits affected:\n");
        for commit in &file.commits {
            render_commit(out, commit);
            if options.show_lines {
                render_lines(out, &commit.lines);
            }
        }
        out.push_str("    Common tag:\n");
        let _ = writeln!(out, "\t{}", format_tags(&file.common_tags, options.limit));
    } else {
        out.push_str("    No common tags found for all the affected commits.\n");
        for commit in &file.commits {
            render_commit(out, commit);
            let hot: Vec<&str> = commit
                .hot_tags(&file.hot_tags)
                .map(MergeBaseTag::as_str)
                .collect();
            if !hot.is_empty() {
                let _ = writeln!(out, "\t\t{}", hot.join(" "));
            }
            render_lines(out, &commit.lines);
        }
    }
}

fn render_commit(out: &mut String, commit: &CommitReport) {
    let _ = write!(out, "\t{}", commit.id);
    if let Some(date) = commit.date {
        let _ = write!(
            out,
            " {}",
            date.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %z")
        );
    }
    let _ = writeln!(out, " ({})", commit.branches.join(", "));
}

fn render_lines(out: &mut String, lines: &[u32]) {
    if lines.is_empty() {
        return;
    }
    let lines: Vec<String> = lines.iter().map(u32::to_string).collect();
    let _ = writeln!(out, "\tlines: {}", lines.join(" "));
}

/// Render a whole invocation as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`checkdiff_core::CheckDiffError::Serialization`] if encoding fails.
pub fn render_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
