//! Milestone - workflow milestone dates from issue tracker exports.
//!
//! Issues exported from the tracker carry their status changelog. This crate
//! turns each issue into an [`IssueRecord`](domain::IssueRecord), extracts
//! its status transitions and resolves a [`Lifecycle`](domain::Lifecycle):
//! the dates it was prioritized, ready for development, in progress, in
//! review, in staging and resolved, with fallbacks for skipped or renamed
//! states.

#![forbid(unsafe_code)]

pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod source;

// Public CLI module (needed by binary)
pub mod cli;
