//! Blame attribution and merge-base tag consensus.
//!
//! Combines a parsed diff with blame data to find the commits behind a
//! change, then decides which merge-base tags all of those commits share,
//! per file and across every file of an invocation.

pub mod attribution;
pub mod check;
pub mod consensus;
pub mod report;
