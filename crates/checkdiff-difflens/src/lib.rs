//! Zero-context diff parsing and hunk selection.
//!
//! Turns the output of `git diff -U0` for a single file into a structured
//! [`Diff`](checkdiff_core::Diff) and optionally narrows it down to a subset
//! of its hunks before attribution.

pub mod parser;
pub mod select;
