//! Version-control collaborator: raw diff and blame text, tag and branch
//! containment, commit timestamps.
//!
//! Diff and blame text come from the `git` binary so the output matches
//! what a user sees on the command line. Ancestry queries go through git2.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::process::Command;

use checkdiff_core::{compile_pattern, BranchConfig, CheckDiffError, Result, TagConfig};
use chrono::{DateTime, Utc};
use git2::{BranchType, Oid, Repository};

/// Data the checker needs from version control.
///
/// Implemented by [`GitRepository`] for real repositories; tests drive the
/// checker with in-memory implementations.
pub trait Vcs {
    /// Zero-context unified diff of `file` in the working tree against the
    /// index, or of the index against `HEAD` when `cached` is set.
    fn diff_text(&self, file: &Path, cached: bool) -> Result<String>;

    /// One blame record per line of `file` at `HEAD`, each starting with the
    /// full commit id.
    fn blame_lines(&self, file: &Path) -> Result<Vec<String>>;

    /// Merge-base tags whose target contains `commit`, in no particular order.
    fn tags_containing(&self, commit: &str) -> Result<Vec<String>>;

    /// Display branches whose tip contains `commit`, sorted by name.
    fn branches_containing(&self, commit: &str) -> Result<Vec<String>>;

    /// Commit timestamp of `commit`.
    fn commit_time(&self, commit: &str) -> Result<DateTime<Utc>>;
}

/// A git working copy.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use checkdiff_core::CheckDiffConfig;
/// use checkdiff_gitpulse::vcs::{GitRepository, Vcs};
///
/// let config = CheckDiffConfig::default();
/// let repo = GitRepository::open(Path::new("."), &config.tags, &config.branches).unwrap();
/// let blame = repo.blame_lines(Path::new("src/main.rs")).unwrap();
/// println!("{} lines", blame.len());
/// ```
pub struct GitRepository {
    repo: Repository,
    cwd: PathBuf,
    tag_pattern: glob::Pattern,
    branch_patterns: Vec<glob::Pattern>,
    tag_targets: OnceCell<Vec<(String, Oid)>>,
}

impl GitRepository {
    /// Discover the repository containing `cwd`. Git commands run in `cwd`
    /// so file paths are interpreted relative to it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckDiffError::Git`] if no repository is found, or
    /// [`CheckDiffError::Config`] if a configured pattern is invalid.
    pub fn open(
        cwd: &Path,
        tags: &TagConfig,
        branches: &BranchConfig,
    ) -> Result<Self> {
        let repo = Repository::discover(cwd)
            .map_err(|e| CheckDiffError::Git(format!("failed to open repository: {e}")))?;
        let tag_pattern = compile_pattern(&tags.pattern)?;
        let branch_patterns = branches
            .patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            repo,
            cwd: cwd.to_path_buf(),
            tag_pattern,
            branch_patterns,
            tag_targets: OnceCell::new(),
        })
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.cwd);
        cmd
    }

    fn merge_base_tags(&self) -> Result<&[(String, Oid)]> {
        if let Some(targets) = self.tag_targets.get() {
            return Ok(targets.as_slice());
        }

        let names = self
            .repo
            .tag_names(None)
            .map_err(|e| CheckDiffError::Git(format!("failed to list tags: {e}")))?;
        let mut targets = Vec::new();
        for name in names.iter().flatten() {
            if !self.tag_pattern.matches(name) {
                continue;
            }
            let object = self
                .repo
                .revparse_single(&format!("refs/tags/{name}"))
                .map_err(|e| CheckDiffError::Git(format!("failed to resolve tag {name}: {e}")))?;
            let Ok(commit) = object.peel_to_commit() else {
                tracing::debug!(tag = name, "skipping tag that does not point at a commit");
                continue;
            };
            targets.push((name.to_string(), commit.id()));
        }
        tracing::debug!(count = targets.len(), "loaded merge-base tags");

        Ok(self.tag_targets.get_or_init(|| targets).as_slice())
    }

    fn contains(&self, tip: Oid, commit: Oid) -> Result<bool> {
        if tip == commit {
            return Ok(true);
        }
        self.repo
            .graph_descendant_of(tip, commit)
            .map_err(|e| CheckDiffError::Git(format!("failed to check ancestry: {e}")))
    }
}

impl Vcs for GitRepository {
    fn diff_text(&self, file: &Path, cached: bool) -> Result<String> {
        let mut cmd = self.git();
        // User config must not change the patch format.
        cmd.args(["diff", "--no-color", "--no-ext-diff", "--no-textconv", "-U0"]);
        if cached {
            cmd.arg("--cached");
        }
        cmd.arg("--").arg(file);
        run(cmd, "diff")
    }

    fn blame_lines(&self, file: &Path) -> Result<Vec<String>> {
        let mut cmd = self.git();
        cmd.args(["blame", "-l", "--root", "HEAD", "--"]).arg(file);
        let output = run(cmd, "blame")?;
        Ok(output.lines().map(str::to_string).collect())
    }

    fn tags_containing(&self, commit: &str) -> Result<Vec<String>> {
        let oid = parse_oid(commit)?;
        let mut tags = Vec::new();
        for (name, target) in self.merge_base_tags()? {
            if self.contains(*target, oid)? {
                tags.push(name.clone());
            }
        }
        Ok(tags)
    }

    fn branches_containing(&self, commit: &str) -> Result<Vec<String>> {
        let oid = parse_oid(commit)?;
        let branches = self
            .repo
            .branches(Some(BranchType::Remote))
            .map_err(|e| CheckDiffError::Git(format!("failed to list branches: {e}")))?;

        let mut names = Vec::new();
        for entry in branches {
            let (branch, _) =
                entry.map_err(|e| CheckDiffError::Git(format!("failed to read branch: {e}")))?;
            let Ok(Some(name)) = branch.name() else {
                continue;
            };
            if !self.branch_patterns.iter().any(|p| p.matches(name)) {
                continue;
            }
            // Symbolic refs such as origin/HEAD have no direct target.
            let Some(tip) = branch.get().target() else {
                continue;
            };
            if self.contains(tip, oid)? {
                names.push(name.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn commit_time(&self, commit: &str) -> Result<DateTime<Utc>> {
        let oid = parse_oid(commit)?;
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| CheckDiffError::Git(format!("failed to find commit: {e}")))?;
        let seconds = commit.time().seconds();
        DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| CheckDiffError::Git(format!("invalid commit time {seconds}")))
    }
}

fn parse_oid(commit: &str) -> Result<Oid> {
    Oid::from_str(commit)
        .map_err(|e| CheckDiffError::Git(format!("invalid commit id '{commit}': {e}")))
}

fn run(mut cmd: Command, what: &str) -> Result<String> {
    tracing::debug!(?cmd, "running git");
    let output = cmd
        .output()
        .map_err(|e| CheckDiffError::Git(format!("failed to run git {what}: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CheckDiffError::Git(format!(
            "git {what} failed: {}",
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
