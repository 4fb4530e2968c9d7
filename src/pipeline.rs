/// History generation pipeline
///
/// Drives the full run: load commits, partition into groups, compute each
/// group's cumulative diff, summarize, persist, then rebuild the
/// project-level aggregates. Groups are processed strictly one at a time in
/// chronological order.
///
/// Failure policy: only repository and configuration errors abort the run.
/// Diff errors degrade to a placeholder text, summarizer errors degrade to
/// the local fallback record (converted here, at the single call site), and
/// persistence errors mark the group as failed and the run continues.
use crate::aggregator;
use crate::config::Config;
use crate::error::GitMemoryError;
use crate::git::{CommitGroup, GitWalker, diff_line_count, group_commits};
use crate::store::{GroupMeta, HistoryStore};
use crate::summarizer::{Summarizer, fallback_diagram, fallback_memory, fallback_project_memory};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Outcome of processing one commit group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Artifacts were computed and persisted
    Processed,
    /// The group was already complete on disk; nothing recomputed
    SkippedExisting,
    /// The cumulative diff fell below the configured line threshold;
    /// nothing was written and the summarizer was not invoked
    SkippedBelowThreshold,
    /// Persisting the group's artifacts failed; the run continued
    Failed,
}

/// Statistics accumulated over one pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Non-merge commits found in the repository
    pub total_commits: usize,
    /// Groups the history was partitioned into
    pub total_groups: usize,
    /// Groups processed and persisted this run
    pub processed: usize,
    /// Groups skipped because they were already complete on disk
    pub skipped_existing: usize,
    /// Groups skipped because their diff fell below the line threshold
    pub skipped_below_threshold: usize,
    /// Groups whose persistence failed
    pub failed: usize,
    /// Wall-clock duration of the run
    pub elapsed_seconds: f64,
}

impl RunStats {
    fn record(&mut self, outcome: GroupOutcome) {
        match outcome {
            GroupOutcome::Processed => self.processed += 1,
            GroupOutcome::SkippedExisting => self.skipped_existing += 1,
            GroupOutcome::SkippedBelowThreshold => self.skipped_below_threshold += 1,
            GroupOutcome::Failed => self.failed += 1,
        }
    }
}

/// The history generation pipeline
pub struct Pipeline {
    config: Config,
    summarizer: Box<dyn Summarizer>,
}

impl Pipeline {
    pub fn new(config: Config, summarizer: Box<dyn Summarizer>) -> Self {
        Self { config, summarizer }
    }

    /// Run the full pipeline against a repository
    ///
    /// Returns run statistics; fails only on repository or store-root errors
    /// raised before group processing begins.
    pub async fn run(&self, repo_path: &Path) -> Result<RunStats, GitMemoryError> {
        let started = Instant::now();

        let walker = GitWalker::open(repo_path)?;
        let commits = walker.load_commits()?;

        let mut stats = RunStats {
            total_commits: commits.len(),
            ..RunStats::default()
        };

        let groups = group_commits(commits, self.config.min_commits);
        stats.total_groups = groups.len();
        tracing::info!(
            "Partitioned {} commits into {} group(s) of at least {}",
            stats.total_commits,
            stats.total_groups,
            self.config.min_commits
        );

        let store = HistoryStore::open(repo_path.join(&self.config.history_dir_name))?;

        for (i, group) in groups.iter().enumerate() {
            let outcome = self.process_group(&walker, &store, group).await;
            tracing::debug!(
                "Group {}/{} ({}): {:?}",
                i + 1,
                groups.len(),
                &group.representative_id()[..7],
                outcome
            );
            stats.record(outcome);
        }

        self.aggregate(&store, stats.total_commits).await?;

        stats.elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            "Run complete: {} processed, {} already present, {} below threshold, {} failed",
            stats.processed,
            stats.skipped_existing,
            stats.skipped_below_threshold,
            stats.failed
        );
        Ok(stats)
    }

    /// Process a single commit group
    async fn process_group(
        &self,
        walker: &GitWalker,
        store: &HistoryStore,
        group: &CommitGroup,
    ) -> GroupOutcome {
        let rep_id = group.representative_id();

        if store.is_complete(rep_id) {
            return GroupOutcome::SkippedExisting;
        }

        let oldest = group.oldest();
        let newest = group.newest();

        // The diff is computed before the threshold check; its line count is
        // the filter input.
        let diff_text = match walker.range_diff(oldest.first_parent(), &newest.hash) {
            Ok(diff) => diff,
            Err(e) => {
                tracing::warn!(
                    "Diff computation failed for group {}, substituting placeholder: {:#}",
                    &rep_id[..7],
                    e
                );
                placeholder_diff(group)
            }
        };
        let diff_lines = diff_line_count(&diff_text);

        if let Some(min) = self.config.min_diff_lines
            && diff_lines < min
        {
            tracing::debug!(
                "Group {} has {} diff lines, below threshold {}",
                &rep_id[..7],
                diff_lines,
                min
            );
            return GroupOutcome::SkippedBelowThreshold;
        }

        let memory = match self
            .summarizer
            .summarize(&diff_text, &oldest.summary, rep_id)
            .await
        {
            Ok(memory) => memory,
            Err(e) => {
                tracing::warn!(
                    "Summarization failed for group {}, using fallback: {}",
                    &rep_id[..7],
                    e
                );
                fallback_memory(&oldest.summary, diff_lines)
            }
        };

        let files = walker.list_files(&newest.hash).unwrap_or_default();
        let diagram = match self.summarizer.diagram(&memory, &files).await {
            Ok(diagram) => diagram,
            Err(e) => {
                tracing::warn!(
                    "Diagram generation failed for group {}, using fallback: {}",
                    &rep_id[..7],
                    e
                );
                fallback_diagram(&files)
            }
        };

        let meta = GroupMeta {
            representative_id: rep_id.to_string(),
            newest_hash: newest.hash.clone(),
            message: oldest.summary.clone(),
            oldest_timestamp: oldest.timestamp,
            commit_count: group.len(),
            diff_lines,
            memory,
        };

        match store.persist_group(&meta, &diff_text, &diagram) {
            Ok(()) => GroupOutcome::Processed,
            Err(e) => {
                tracing::warn!("Failed to persist group {}: {}", &rep_id[..7], e);
                GroupOutcome::Failed
            }
        }
    }

    /// Rebuild the project-level aggregates from everything on disk
    async fn aggregate(
        &self,
        store: &HistoryStore,
        total_commits: usize,
    ) -> Result<(), GitMemoryError> {
        let metas = store.list_complete_groups()?;
        let memories: Vec<_> = metas.iter().map(|m| m.memory.clone()).collect();

        let project_memory = if memories.is_empty() {
            fallback_project_memory(&memories, total_commits)
        } else {
            match self.summarizer.aggregate(&memories, total_commits).await {
                Ok(project) => project,
                Err(e) => {
                    tracing::warn!("Project memory aggregation failed, using fallback: {}", e);
                    fallback_project_memory(&memories, total_commits)
                }
            }
        };

        aggregator::write_aggregates(store, &project_memory)?;
        Ok(())
    }
}

/// Synthesized one-line diff text used when the diff operation itself fails
fn placeholder_diff(group: &CommitGroup) -> String {
    let oldest = group.oldest();
    if oldest.first_parent().is_none() {
        format!("Initial commit: {}\n", oldest.summary)
    } else {
        format!("Changes from commit: {}\n", oldest.summary)
    }
}
