use checkdiff_core::{CheckDiffError, Diff, Hunk, LineRange, Result};

/// Parse a zero-context unified diff (as produced by `git diff -U0`) for a
/// single file into a [`Diff`].
///
/// File header lines before the first hunk (`diff --git`, `index`, `---`,
/// `+++`, mode lines, binary notices) are skipped. Hunk bodies are consumed
/// by the counts in the hunk header, so removed lines that happen to look
/// like file headers (e.g. `--- foo`) stay inside their hunk.
///
/// A `removedStart` of 0 is kept as-is; it marks an insertion before the
/// first line and is normalized by attribution, not here.
///
/// # Errors
///
/// Returns [`CheckDiffError::Parse`] if a hunk header is malformed or a hunk
/// changes no lines at all.
///
/// # Examples
///
/// ```
/// use checkdiff_difflens::parser::parse_diff;
///
/// let diff = "diff --git a/lib.rs b/lib.rs\n\
///             --- a/lib.rs\n\
///             +++ b/lib.rs\n\
///             @@ -3 +3,2 @@\n\
///             -old\n\
///             +new\n\
///             +newer\n";
/// let diff = parse_diff(diff).unwrap();
/// assert_eq!(diff.hunks.len(), 1);
/// assert_eq!(diff.removed_total, 1);
/// assert_eq!(diff.added_total, 2);
/// ```
pub fn parse_diff(input: &str) -> Result<Diff> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut current: Option<PendingHunk> = None;

    for line in input.lines() {
        if let Some(pending) = current.as_mut() {
            if pending.accepts(line) {
                pending.push(line);
                continue;
            }
            if let Some(done) = current.take() {
                hunks.push(done.finish());
            }
        }

        if line.starts_with("@@ ") {
            let (removed, added) = parse_hunk_header(line)?;
            if removed.is_empty() && added.is_empty() {
                return Err(CheckDiffError::Parse(format!(
                    "hunk changes no lines: {line}"
                )));
            }
            current = Some(PendingHunk::new(hunks.len() + 1, removed, added, line));
        }
    }

    if let Some(done) = current.take() {
        hunks.push(done.finish());
    }

    tracing::debug!(hunks = hunks.len(), "parsed diff");
    Ok(Diff::from_hunks(hunks))
}

struct PendingHunk {
    index: usize,
    removed: LineRange,
    added: LineRange,
    removed_left: u32,
    added_left: u32,
    lines: Vec<String>,
}

impl PendingHunk {
    fn new(index: usize, removed: LineRange, added: LineRange, header: &str) -> Self {
        Self {
            index,
            removed,
            added,
            removed_left: removed.count,
            added_left: added.count,
            lines: vec![header.to_string()],
        }
    }

    fn accepts(&self, line: &str) -> bool {
        match line.as_bytes().first() {
            Some(b'-') => self.removed_left > 0,
            Some(b'+') => self.added_left > 0,
            Some(b' ') => self.removed_left > 0 || self.added_left > 0,
            Some(b'\\') => true,
            _ => false,
        }
    }

    fn push(&mut self, line: &str) {
        match line.as_bytes().first() {
            Some(b'-') => self.removed_left -= 1,
            Some(b'+') => self.added_left -= 1,
            Some(b' ') => {
                self.removed_left = self.removed_left.saturating_sub(1);
                self.added_left = self.added_left.saturating_sub(1);
            }
            _ => {}
        }
        self.lines.push(line.to_string());
    }

    fn finish(self) -> Hunk {
        Hunk {
            index: self.index,
            removed: self.removed,
            added: self.added,
            raw_text: self.lines.join("\n"),
        }
    }
}

fn parse_hunk_header(line: &str) -> Result<(LineRange, LineRange)> {
    let inner = line
        .strip_prefix("@@ ")
        .and_then(|s| {
            let end = s.find(" @@")?;
            Some(&s[..end])
        })
        .ok_or_else(|| CheckDiffError::Parse(format!("invalid hunk header: {line}")))?;

    let parts: Vec<&str> = inner.split(' ').collect();
    if parts.len() != 2 {
        return Err(CheckDiffError::Parse(format!("invalid hunk header: {line}")));
    }

    let old = parts[0]
        .strip_prefix('-')
        .ok_or_else(|| CheckDiffError::Parse(format!("invalid old range in hunk: {line}")))?;
    let new = parts[1]
        .strip_prefix('+')
        .ok_or_else(|| CheckDiffError::Parse(format!("invalid new range in hunk: {line}")))?;

    Ok((parse_range(old, line)?, parse_range(new, line)?))
}

fn parse_range(range: &str, context: &str) -> Result<LineRange> {
    let (start, count) = match range.split_once(',') {
        Some((start, count)) => (start, Some(count)),
        None => (range, None),
    };
    let start = start
        .parse()
        .map_err(|_| CheckDiffError::Parse(format!("invalid range number in: {context}")))?;
    let count = match count {
        Some(c) => c
            .parse()
            .map_err(|_| CheckDiffError::Parse(format!("invalid range count in: {context}")))?,
        None => 1,
    };
    Ok(LineRange { start, count })
}
