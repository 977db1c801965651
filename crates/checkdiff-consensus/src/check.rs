//! Per-file and multi-file checking: diff, blame, attribute, resolve tags,
//! aggregate.

use std::path::{Path, PathBuf};

use checkdiff_core::{CheckDiffError, Hunk, LineOffset, MergeBaseTag, Result};
use checkdiff_difflens::parser::parse_diff;
use checkdiff_difflens::select::{select_hunks, HunkSelection};
use checkdiff_gitpulse::blame::BlameTable;
use checkdiff_gitpulse::tags::TagResolver;
use checkdiff_gitpulse::vcs::Vcs;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::attribution::{attribute, AttributionGap, AttributionOptions};
use crate::consensus::{aggregate, sort_tags, Consensus, CrossFileConsensus};

/// Immutable settings for one invocation.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::check::CheckOptions;
///
/// let opts = CheckOptions::default();
/// assert!(opts.selection.is_none());
/// assert!(!opts.cached);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Neighbouring line to blame for removed lines.
    pub offset: LineOffset,
    /// Diff the staged index instead of the working tree.
    pub cached: bool,
    /// Only check these hunks; single-file invocations only.
    pub selection: Option<HunkSelection>,
    /// Look up commit dates.
    pub with_dates: bool,
}

/// One implicated commit as shown in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    /// Commit id.
    pub id: String,
    /// Line numbers attributed to the commit.
    pub lines: Vec<u32>,
    /// Merge-base tags containing the commit, ascending.
    pub tags: Vec<MergeBaseTag>,
    /// Display branches containing the commit.
    pub branches: Vec<String>,
    /// Commit date, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl CommitReport {
    /// This commit's tags that are hot for the file.
    pub fn hot_tags<'a>(
        &'a self,
        hot: &'a [MergeBaseTag],
    ) -> impl Iterator<Item = &'a MergeBaseTag> {
        self.tags.iter().filter(move |tag| hot.contains(*tag))
    }
}

/// Result of checking one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Path as given on the command line.
    pub path: PathBuf,
    /// Lines removed by the checked hunks.
    pub removed_total: u32,
    /// Lines added by the checked hunks.
    pub added_total: u32,
    /// The checked hunks.
    pub hunks: Vec<Hunk>,
    /// Out-of-bounds lines skipped during attribution.
    pub gaps: Vec<AttributionGap>,
    /// Implicated commits in first-encounter order.
    pub commits: Vec<CommitReport>,
    /// Tags common to every implicated commit.
    pub common_tags: Vec<MergeBaseTag>,
    /// Tags shared by more than one but not all implicated commits.
    pub hot_tags: Vec<MergeBaseTag>,
}

impl FileReport {
    /// Returns `true` if every implicated commit shares at least one tag.
    pub fn has_common(&self) -> bool {
        !self.common_tags.is_empty()
    }
}

/// Result of checking every file of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Per-file results in argument order.
    pub files: Vec<FileReport>,
    /// Tags that were common for every file.
    pub common_tags: Vec<MergeBaseTag>,
}

/// Drives the check for files of one repository.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use checkdiff_consensus::check::{CheckOptions, Checker};
/// use checkdiff_core::CheckDiffConfig;
/// use checkdiff_gitpulse::vcs::GitRepository;
///
/// let config = CheckDiffConfig::default();
/// let repo = GitRepository::open(Path::new("."), &config.tags, &config.branches).unwrap();
/// let checker = Checker::new(&repo, CheckOptions::default());
/// let report = checker.check_file(Path::new("src/main.rs")).unwrap();
/// println!("{} commits", report.commits.len());
/// ```
pub struct Checker<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    resolver: TagResolver<'a, V>,
    options: CheckOptions,
}

impl<'a, V: Vcs + ?Sized> Checker<'a, V> {
    /// Create a checker over `vcs`.
    pub fn new(vcs: &'a V, options: CheckOptions) -> Self {
        Self {
            vcs,
            resolver: TagResolver::new(vcs),
            options,
        }
    }

    /// Check a single file.
    ///
    /// # Errors
    ///
    /// Returns any parse, consistency, tag format, or collaborator error.
    pub fn check_file(&self, path: &Path) -> Result<FileReport> {
        let _span = tracing::debug_span!("check_file", path = %path.display()).entered();

        let blame = BlameTable::from_records(self.vcs.blame_lines(path)?);
        let raw = self.vcs.diff_text(path, self.options.cached)?;
        let diff = select_hunks(parse_diff(&raw)?, self.options.selection.as_ref());

        let attribution = attribute(
            &diff,
            &blame,
            &AttributionOptions {
                offset: self.options.offset,
            },
        )?;

        let mut tag_sets = Vec::with_capacity(attribution.len());
        for commit in attribution.commits() {
            tag_sets.push(self.resolver.resolve(&commit.commit)?);
        }
        let Consensus { common, hot, .. } = aggregate(tag_sets.iter().map(Vec::as_slice))?;

        let mut commits = Vec::with_capacity(attribution.len());
        for (commit, tags) in attribution.commits().iter().zip(&tag_sets) {
            let date = if self.options.with_dates {
                Some(self.vcs.commit_time(&commit.commit)?)
            } else {
                None
            };
            commits.push(CommitReport {
                id: commit.commit.clone(),
                lines: commit.lines.clone(),
                tags: sort_tags(tags)?,
                branches: self.vcs.branches_containing(&commit.commit)?,
                date,
            });
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            removed_total: diff.removed_total,
            added_total: diff.added_total,
            gaps: attribution.gaps().to_vec(),
            hunks: diff.hunks,
            commits,
            common_tags: common,
            hot_tags: hot,
        })
    }

    /// Check every file in order and compute the cross-file consensus.
    ///
    /// # Errors
    ///
    /// Returns [`CheckDiffError::Usage`] if `paths` is empty or a hunk
    /// selection is combined with more than one file, and otherwise the
    /// first error from [`Checker::check_file`].
    pub fn check_files(&self, paths: &[PathBuf]) -> Result<RunReport> {
        if paths.is_empty() {
            return Err(CheckDiffError::Usage("no files given".into()));
        }
        if self.options.selection.is_some() && paths.len() > 1 {
            return Err(CheckDiffError::Usage(
                "hunk selection works only with one file".into(),
            ));
        }

        let mut cross = CrossFileConsensus::default();
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let report = self.check_file(path)?;
            cross.add_file(&report.common_tags);
            files.push(report);
        }

        Ok(RunReport {
            files,
            common_tags: cross.common(),
        })
    }
}
