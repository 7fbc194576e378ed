#![forbid(unsafe_code)]

//! Core engine for the Microplan training-plan board.
//!
//! This crate provides:
//! - Domain types (phases, scheduled items, days, microcycles)
//! - Drag session tracking and drop placement
//! - Reordering and day insertion engines
//! - Persistence (commit log, board snapshot, CSV export)
//! - Exercise library and configuration

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod library;
pub mod locator;
pub mod drag;
pub mod placement;
pub mod reorder;
pub mod days;
pub mod commit;
pub mod state;
pub mod export;
pub mod board;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use library::{build_default_library, ExerciseLibrary};
pub use drag::{DragSubject, DropTarget};
pub use placement::{Highlight, Placement};
pub use days::DayShift;
pub use commit::{read_commits, Commit, CommitSink, JsonlCommitLog};
pub use export::export_csv;
pub use board::{Board, CommitFailure, MutationResult, PendingCreation};
