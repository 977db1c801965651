//! Core types, configuration, and error handling for git-check-diff.
//!
//! This crate provides the shared foundation used by the other checkdiff crates:
//! - [`CheckDiffError`]: unified error type using `thiserror`
//! - [`CheckDiffConfig`]: configuration loaded from `.checkdiff.toml`
//! - Shared types: [`LineRange`], [`Hunk`], [`Diff`], [`LineOffset`],
//!   [`MergeBaseTag`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    compile_pattern, BranchConfig, CheckDiffConfig, DisplayConfig, TagConfig, CONFIG_FILE_NAME,
};
pub use error::CheckDiffError;
pub use types::{Diff, Hunk, LineOffset, LineRange, MergeBaseTag, OutputFormat};

/// A convenience `Result` type for checkdiff operations.
pub type Result<T> = std::result::Result<T, CheckDiffError>;
