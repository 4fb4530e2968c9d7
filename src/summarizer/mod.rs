//! AI summarizer boundary
//!
//! The pipeline treats summarization as an untrusted external call: any
//! failure is converted to a deterministic local fallback record at a single
//! call site in the pipeline, so an unavailable provider degrades artifact
//! quality but never run completion.

/// OpenAI-compatible chat completions adapter
pub mod openai;

use crate::error::SummarizeError;
use crate::memory::{Change, CommitMemory, Impact, ProjectMemory};
use async_trait::async_trait;

pub use openai::OpenAiSummarizer;

/// Diff line count above which a fallback change is considered moderate
/// rather than minor.
const FALLBACK_MODERATE_THRESHOLD: usize = 100;

/// Structured summarization of commit groups
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one commit group's cumulative diff into a memory record
    async fn summarize(
        &self,
        diff_text: &str,
        commit_message: &str,
        commit_id: &str,
    ) -> Result<CommitMemory, SummarizeError>;

    /// Aggregate per-group memories into a project-level memory
    async fn aggregate(
        &self,
        memories: &[CommitMemory],
        total_commits: usize,
    ) -> Result<ProjectMemory, SummarizeError>;

    /// Produce a Mermaid diagram describing the project structure after a group
    async fn diagram(
        &self,
        memory: &CommitMemory,
        files: &[String],
    ) -> Result<String, SummarizeError>;
}

/// Deterministic memory record synthesized when the summarizer is unavailable
///
/// The summary is the raw commit message; impact follows a line-count
/// heuristic on the diff.
pub fn fallback_memory(commit_message: &str, diff_line_count: usize) -> CommitMemory {
    let impact = if diff_line_count > FALLBACK_MODERATE_THRESHOLD {
        Impact::Moderate
    } else {
        Impact::Minor
    };

    CommitMemory {
        added: vec![Change {
            description: format!("Changes from commit: {}", commit_message),
            files: Vec::new(),
            impact,
        }],
        removed: Vec::new(),
        changed: Vec::new(),
        summary: commit_message.to_string(),
        technical_details: format!(
            "AI summarization unavailable; recorded from commit metadata ({} diff lines).",
            diff_line_count
        ),
    }
}

/// Deterministic project memory synthesized from per-group memories
pub fn fallback_project_memory(memories: &[CommitMemory], total_commits: usize) -> ProjectMemory {
    let mut major_features: Vec<String> = memories
        .iter()
        .flat_map(|m| m.added.iter())
        .filter(|c| c.impact == Impact::Major)
        .map(|c| c.description.clone())
        .collect();
    major_features.dedup();

    ProjectMemory {
        major_features,
        architecture_evolution: Vec::new(),
        key_decisions: Vec::new(),
        current_state: format!(
            "{} commits summarized across {} groups.",
            total_commits,
            memories.len()
        ),
        next_steps: Vec::new(),
    }
}

/// Deterministic Mermaid diagram synthesized from a commit's file listing
///
/// Files are grouped by top-level directory; the listing is capped so huge
/// trees stay readable.
pub fn fallback_diagram(files: &[String]) -> String {
    const MAX_FILES: usize = 40;

    let mut out = String::from("graph TD\n    root[Project]\n");

    let mut dirs: Vec<&str> = Vec::new();
    let mut shown = 0;

    for file in files {
        if shown >= MAX_FILES {
            out.push_str(&format!(
                "    root --> more[\"... {} more files\"]\n",
                files.len() - shown
            ));
            break;
        }

        match file.split_once('/') {
            Some((dir, _)) => {
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                    out.push_str(&format!("    root --> {}[\"{}/\"]\n", node_id(dir), dir));
                }
                out.push_str(&format!(
                    "    {} --> {}[\"{}\"]\n",
                    node_id(dir),
                    node_id(file),
                    file
                ));
            }
            None => {
                out.push_str(&format!("    root --> {}[\"{}\"]\n", node_id(file), file));
            }
        }
        shown += 1;
    }

    out
}

/// Mermaid node identifier for an arbitrary path
fn node_id(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Summarizer that never calls out: always produces the deterministic
/// fallback records
///
/// Used by `--no-ai` runs and in tests.
pub struct LocalSummarizer;

#[async_trait]
impl Summarizer for LocalSummarizer {
    async fn summarize(
        &self,
        diff_text: &str,
        commit_message: &str,
        _commit_id: &str,
    ) -> Result<CommitMemory, SummarizeError> {
        Ok(fallback_memory(
            commit_message,
            crate::git::diff_line_count(diff_text),
        ))
    }

    async fn aggregate(
        &self,
        memories: &[CommitMemory],
        total_commits: usize,
    ) -> Result<ProjectMemory, SummarizeError> {
        Ok(fallback_project_memory(memories, total_commits))
    }

    async fn diagram(
        &self,
        _memory: &CommitMemory,
        files: &[String],
    ) -> Result<String, SummarizeError> {
        Ok(fallback_diagram(files))
    }
}
