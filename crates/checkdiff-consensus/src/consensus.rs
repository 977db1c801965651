//! Merge-base tag consensus across the commits behind a change.

use std::collections::{BTreeSet, HashMap};

use checkdiff_core::{MergeBaseTag, Result};
use serde::Serialize;

/// Tag agreement among one file's attributed commits.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::consensus::aggregate;
///
/// let a = vec!["MERGE_BASE_3".to_string(), "MERGE_BASE_4".to_string()];
/// let b = vec!["MERGE_BASE_3".to_string()];
/// let consensus = aggregate([a.as_slice(), b.as_slice()]).unwrap();
/// assert_eq!(consensus.n_commits, 2);
/// assert_eq!(consensus.common[0].as_str(), "MERGE_BASE_3");
/// assert!(consensus.hot.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consensus {
    /// Number of distinct commits considered.
    pub n_commits: usize,
    /// Tags carried by every commit, ascending.
    pub common: Vec<MergeBaseTag>,
    /// Tags carried by more than one but not all commits, ascending.
    pub hot: Vec<MergeBaseTag>,
}

impl Consensus {
    /// Returns `true` if at least one tag is common to all commits.
    pub fn has_common(&self) -> bool {
        !self.common.is_empty()
    }
}

/// Compute consensus over per-commit tag sets, one entry per distinct commit.
///
/// Duplicate tags within one commit's set count once. With zero commits the
/// consensus is empty.
///
/// # Errors
///
/// Returns [`TagFormat`](checkdiff_core::CheckDiffError::TagFormat) if any tag is not `MERGE_BASE_<N>`.
pub fn aggregate<'a, I>(tag_sets: I) -> Result<Consensus>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut frequency: HashMap<MergeBaseTag, usize> = HashMap::new();
    let mut n_commits = 0;

    for tags in tag_sets {
        n_commits += 1;
        for tag in sort_tags(tags)? {
            *frequency.entry(tag).or_insert(0) += 1;
        }
    }

    let mut common = Vec::new();
    let mut hot = Vec::new();
    if n_commits > 0 {
        for (tag, count) in frequency {
            if count == n_commits {
                common.push(tag);
            } else if count > 1 {
                hot.push(tag);
            }
        }
    }
    common.sort();
    hot.sort();

    Ok(Consensus {
        n_commits,
        common,
        hot,
    })
}

/// Validate and sort tag names ascending by numeric suffix, dropping
/// duplicates.
///
/// # Errors
///
/// Returns [`TagFormat`](checkdiff_core::CheckDiffError::TagFormat) for the first malformed name.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::consensus::sort_tags;
///
/// let names = ["MERGE_BASE_2", "MERGE_BASE_10", "MERGE_BASE_1"].map(String::from);
/// let sorted: Vec<String> = sort_tags(&names)
///     .unwrap()
///     .into_iter()
///     .map(String::from)
///     .collect();
/// assert_eq!(sorted, ["MERGE_BASE_1", "MERGE_BASE_2", "MERGE_BASE_10"]);
/// ```
pub fn sort_tags(names: &[String]) -> Result<Vec<MergeBaseTag>> {
    let set = names
        .iter()
        .map(|n| n.parse::<MergeBaseTag>())
        .collect::<Result<BTreeSet<_>>>()?;
    Ok(set.into_iter().collect())
}

/// Accumulates per-file consensus across an invocation.
///
/// A tag is globally common only if it was common for every file added.
///
/// # Examples
///
/// ```
/// use checkdiff_consensus::consensus::CrossFileConsensus;
/// use checkdiff_core::MergeBaseTag;
///
/// let tag: MergeBaseTag = "MERGE_BASE_3".parse().unwrap();
/// let mut cross = CrossFileConsensus::default();
/// cross.add_file(&[tag.clone()]);
/// cross.add_file(&[]);
/// assert!(cross.common().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrossFileConsensus {
    counts: HashMap<MergeBaseTag, usize>,
    files: usize,
}

impl CrossFileConsensus {
    /// Record one completed file's common tags.
    pub fn add_file(&mut self, common: &[MergeBaseTag]) {
        self.files += 1;
        let unique: BTreeSet<&MergeBaseTag> = common.iter().collect();
        for tag in unique {
            *self.counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    /// Tags common to every recorded file, ascending.
    pub fn common(&self) -> Vec<MergeBaseTag> {
        if self.files == 0 {
            return Vec::new();
        }
        let mut tags: Vec<MergeBaseTag> = self
            .counts
            .iter()
            .filter(|(_, &count)| count == self.files)
            .map(|(tag, _)| tag.clone())
            .collect();
        tags.sort();
        tags
    }
}
