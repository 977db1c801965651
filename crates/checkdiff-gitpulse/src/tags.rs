//! Merge-base tag lookup with a per-invocation cache.

use std::cell::RefCell;
use std::collections::HashMap;

use checkdiff_core::Result;

use crate::vcs::Vcs;

/// Resolves a commit to the merge-base tags that contain it.
///
/// Results are cached per commit id, so a commit implicated in several files
/// is looked up once. The resolver never sorts; ordering is the
/// aggregator's job.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use checkdiff_core::CheckDiffConfig;
/// use checkdiff_gitpulse::tags::TagResolver;
/// use checkdiff_gitpulse::vcs::GitRepository;
///
/// let config = CheckDiffConfig::default();
/// let repo = GitRepository::open(Path::new("."), &config.tags, &config.branches).unwrap();
/// let resolver = TagResolver::new(&repo);
/// let tags = resolver.resolve("9f2c1e0b7a4d3c2b1a0f9e8d7c6b5a4f3e2d1c0b").unwrap();
/// println!("{tags:?}");
/// ```
pub struct TagResolver<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    cache: RefCell<HashMap<String, Vec<String>>>,
}

impl<'a, V: Vcs + ?Sized> TagResolver<'a, V> {
    /// Create a resolver backed by `vcs`.
    pub fn new(vcs: &'a V) -> Self {
        Self {
            vcs,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Merge-base tags containing `commit`.
    ///
    /// # Errors
    ///
    /// Propagates any collaborator failure; failures are not cached.
    pub fn resolve(&self, commit: &str) -> Result<Vec<String>> {
        if let Some(tags) = self.cache.borrow().get(commit) {
            return Ok(tags.clone());
        }
        let tags = self.vcs.tags_containing(commit)?;
        tracing::debug!(commit, count = tags.len(), "resolved merge-base tags");
        self.cache
            .borrow_mut()
            .insert(commit.to_string(), tags.clone());
        Ok(tags)
    }
}
