//! # git-memory: AI-powered commit-by-commit memory for Git projects
//!
//! Walks a repository's linear commit history, partitions it into ordered
//! groups, computes each group's cumulative diff, asks an AI summarizer for a
//! structured memory record, and persists per-group and project-level
//! artifacts under a `.history/` directory inside the repository.
//!
//! ## Overview
//!
//! Runs are resumable and append-only: a group already persisted on disk is
//! skipped without recomputation, so repeated runs over unchanged history are
//! no-ops and runs over extended history only process the new groups. The AI
//! provider is an untrusted collaborator: any summarization failure degrades
//! to a deterministic local record instead of aborting the run.
//!
//! ## On-disk layout
//!
//! ```text
//! .history/
//!   <oldest-commit-hash>/   one directory per processed commit group
//!     diff.patch            cumulative unified diff for the group
//!     memory.md             structured memory rendered as Markdown
//!     structure.mmd         Mermaid diagram of the project at that point
//!     group.json            metadata; written last, marks the group complete
//!   memory.md               project memory + all group memories, in order
//!   history.md              all group diffs, in order
//!   structure.mmd           the most recent group's diagram
//! ```
//!
//! ## Modules
//!
//! - [`git`]: commit history walking, grouping and range diffs
//! - [`summarizer`]: AI summarizer boundary with deterministic fallbacks
//! - [`store`]: per-group artifact persistence and resumability
//! - [`aggregator`]: project-level file aggregation
//! - [`pipeline`]: the orchestrating run loop and its statistics
//! - [`memory`]: artifact data model shared across the above
//! - [`config`]: run configuration with environment variable support
//! - [`error`]: error types and utilities
//!
//! ## Usage Example
//!
//! ```no_run
//! use git_memory::config::Config;
//! use git_memory::pipeline::Pipeline;
//! use git_memory::summarizer::LocalSummarizer;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new()?;
//!     let pipeline = Pipeline::new(config, Box::new(LocalSummarizer));
//!     let stats = pipeline.run(Path::new(".")).await?;
//!     println!("Processed {} group(s)", stats.processed);
//!     Ok(())
//! }
//! ```

/// Project-level artifact aggregation
pub mod aggregator;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Git repository walking, commit grouping and range diffs
pub mod git;

/// Artifact data model: commit memories, changes, project memory
pub mod memory;

/// Pipeline orchestration and run statistics
pub mod pipeline;

/// On-disk history store with per-group completion markers
pub mod store;

/// AI summarizer boundary with deterministic local fallbacks
pub mod summarizer;
