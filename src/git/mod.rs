//! Git repository operations for history summarization
//!
//! Provides functionality to walk a repository's linear commit history,
//! partition it into groups, and compute cumulative range diffs.

/// Commit grouping for partitioning history into summarization units
pub mod grouper;
/// Git repository walking, commit extraction and range diffs
pub mod walker;

pub use grouper::{CommitGroup, group_commits};
pub use walker::{CommitInfo, EMPTY_TREE_HASH, GitWalker, diff_line_count};
