//! Git-backed data sources: per-line blame, merge-base tag and branch
//! containment, commit timestamps.
//!
//! The [`vcs::Vcs`] trait is the seam between the attribution algorithm and
//! version control; [`vcs::GitRepository`] implements it with the `git`
//! binary and git2.

pub mod blame;
pub mod tags;
pub mod vcs;
