/// On-disk history store
///
/// One subdirectory per processed commit group, keyed by the group's oldest
/// commit hash, holding `diff.patch`, `memory.md` and `structure.mmd`. A
/// `group.json` metadata file is written last and doubles as the completion
/// marker: a directory without it is treated as an interrupted write and
/// reprocessed. The metadata records the oldest commit's timestamp so the
/// aggregator can enumerate groups in chronological order.
use crate::error::{GitMemoryError, StoreError};
use crate::memory::{CommitMemory, format_timestamp};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-group completion marker and metadata file
pub const GROUP_META_FILE: &str = "group.json";

/// Metadata persisted for one completed commit group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMeta {
    /// Hash of the group's oldest commit; also the directory name
    pub representative_id: String,
    /// Hash of the group's newest commit
    pub newest_hash: String,
    /// One-line message of the oldest commit
    pub message: String,
    /// Timestamp of the oldest commit (epoch seconds); aggregation order key
    pub oldest_timestamp: i64,
    /// Number of commits in the group
    pub commit_count: usize,
    /// Line count of the group's cumulative diff
    pub diff_lines: usize,
    /// Structured memory record for the group
    pub memory: CommitMemory,
}

impl GroupMeta {
    /// Abbreviated representative hash for rendered headings
    pub fn short_id(&self) -> &str {
        &self.representative_id[..self.representative_id.len().min(7)]
    }
}

/// Store for per-group and project-level history artifacts
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    /// Open the store, creating its root directory if needed
    pub fn open(root: PathBuf) -> Result<Self, GitMemoryError> {
        fs::create_dir_all(&root).map_err(|e| StoreError::CreateFailed {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { root })
    }

    /// The store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a group has been fully persisted
    ///
    /// Checks the completion marker, not directory presence: a directory
    /// whose marker is missing was interrupted mid-write and must be redone.
    pub fn is_complete(&self, representative_id: &str) -> bool {
        self.root
            .join(representative_id)
            .join(GROUP_META_FILE)
            .is_file()
    }

    /// Persist all artifacts for one group
    ///
    /// `group.json` is written only after the three artifacts succeed, so a
    /// crash mid-group cannot masquerade as a completed group. Stale partial
    /// files from an earlier interrupted run are overwritten.
    pub fn persist_group(
        &self,
        meta: &GroupMeta,
        diff_text: &str,
        diagram: &str,
    ) -> Result<(), GitMemoryError> {
        let dir = self.root.join(&meta.representative_id);
        fs::create_dir_all(&dir).map_err(|e| StoreError::CreateFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        write_artifact(&dir.join("diff.patch"), diff_text)?;
        write_artifact(&dir.join("memory.md"), &render_group_memory(meta))?;
        write_artifact(&dir.join("structure.mmd"), diagram)?;

        let meta_json = serde_json::to_string_pretty(meta)
            .map_err(|e| GitMemoryError::other(format!("Failed to serialize group metadata: {}", e)))?;
        write_artifact(&dir.join(GROUP_META_FILE), &meta_json)?;

        tracing::debug!(
            "Persisted group {} ({} commits)",
            meta.short_id(),
            meta.commit_count
        );
        Ok(())
    }

    /// Read the diff text of a completed group
    pub fn read_diff(&self, representative_id: &str) -> Result<String, GitMemoryError> {
        let path = self.root.join(representative_id).join("diff.patch");
        fs::read_to_string(&path)
            .map_err(|e| {
                StoreError::ReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Read the structure diagram of a completed group
    pub fn read_diagram(&self, representative_id: &str) -> Result<String, GitMemoryError> {
        let path = self.root.join(representative_id).join("structure.mmd");
        fs::read_to_string(&path)
            .map_err(|e| {
                StoreError::ReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    /// Enumerate all completed groups in chronological order
    ///
    /// Order is by the oldest commit's timestamp (ties broken by hash), never
    /// by the lexical order of directory names. Directories without a
    /// parseable marker are skipped with a warning.
    pub fn list_complete_groups(&self) -> Result<Vec<GroupMeta>, GitMemoryError> {
        let mut groups = Vec::new();

        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::ReadFailed {
            path: self.root.display().to_string(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadFailed {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })?;

            let meta_path = entry.path().join(GROUP_META_FILE);
            if !meta_path.is_file() {
                continue;
            }

            match read_meta(&meta_path) {
                Ok(meta) => groups.push(meta),
                Err(e) => {
                    tracing::warn!("Skipping unreadable group metadata {:?}: {}", meta_path, e);
                }
            }
        }

        groups.sort_by(|a, b| {
            (a.oldest_timestamp, &a.representative_id)
                .cmp(&(b.oldest_timestamp, &b.representative_id))
        });

        Ok(groups)
    }

    /// Write a project-level aggregate file at the store root
    pub fn write_aggregate(&self, name: &str, content: &str) -> Result<(), GitMemoryError> {
        write_artifact(&self.root.join(name), content)
    }
}

fn write_artifact(path: &Path, content: &str) -> Result<(), GitMemoryError> {
    fs::write(path, content)
        .map_err(|e| {
            StoreError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
}

fn read_meta(path: &Path) -> Result<GroupMeta, GitMemoryError> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| {
        StoreError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Render one group's memory.md content
fn render_group_memory(meta: &GroupMeta) -> String {
    format!(
        "# {} — {}\n\n*{} — {} commit{}*\n\n{}",
        meta.short_id(),
        meta.message,
        format_timestamp(meta.oldest_timestamp),
        meta.commit_count,
        if meta.commit_count == 1 { "" } else { "s" },
        meta.memory.to_markdown()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::fallback_memory;
    use tempfile::tempdir;

    fn make_meta(rep: &str, timestamp: i64) -> GroupMeta {
        GroupMeta {
            representative_id: rep.to_string(),
            newest_hash: "f".repeat(40),
            message: "Add feature".to_string(),
            oldest_timestamp: timestamp,
            commit_count: 2,
            diff_lines: 12,
            memory: fallback_memory("Add feature", 12),
        }
    }

    #[test]
    fn test_open_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(".history");
        let store = HistoryStore::open(root.clone()).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root);
    }

    #[test]
    fn test_persist_and_complete() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();
        let meta = make_meta(&"a".repeat(40), 100);

        assert!(!store.is_complete(&meta.representative_id));

        store
            .persist_group(&meta, "+diff line\n", "graph TD\n")
            .unwrap();

        assert!(store.is_complete(&meta.representative_id));

        let group_dir = store.root().join(&meta.representative_id);
        assert!(group_dir.join("diff.patch").is_file());
        assert!(group_dir.join("memory.md").is_file());
        assert!(group_dir.join("structure.mmd").is_file());
        assert!(group_dir.join(GROUP_META_FILE).is_file());

        let memory_md = fs::read_to_string(group_dir.join("memory.md")).unwrap();
        assert!(memory_md.contains("Add feature"));
        assert!(memory_md.contains("2 commits"));
    }

    #[test]
    fn test_directory_without_marker_is_incomplete() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();

        // Simulate an interrupted run: directory and diff exist, no marker
        let rep = "b".repeat(40);
        let group_dir = store.root().join(&rep);
        fs::create_dir_all(&group_dir).unwrap();
        fs::write(group_dir.join("diff.patch"), "partial").unwrap();

        assert!(!store.is_complete(&rep));
        assert!(store.list_complete_groups().unwrap().is_empty());
    }

    #[test]
    fn test_list_complete_groups_chronological() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();

        // Lexical order of hashes deliberately disagrees with timestamps
        let newer = make_meta(&"1".repeat(40), 300);
        let older = make_meta(&"9".repeat(40), 100);
        store.persist_group(&newer, "", "graph TD\n").unwrap();
        store.persist_group(&older, "", "graph TD\n").unwrap();

        let groups = store.list_complete_groups().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].representative_id, "9".repeat(40));
        assert_eq!(groups[1].representative_id, "1".repeat(40));
    }

    #[test]
    fn test_corrupt_marker_is_skipped() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();

        let good = make_meta(&"c".repeat(40), 100);
        store.persist_group(&good, "", "graph TD\n").unwrap();

        let bad_dir = store.root().join("d".repeat(40));
        fs::create_dir_all(&bad_dir).unwrap();
        fs::write(bad_dir.join(GROUP_META_FILE), "not json").unwrap();

        let groups = store.list_complete_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].representative_id, "c".repeat(40));
    }

    #[test]
    fn test_read_diff_roundtrip() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();
        let meta = make_meta(&"e".repeat(40), 100);

        store
            .persist_group(&meta, "+added\n-removed\n", "graph TD\n")
            .unwrap();

        assert_eq!(
            store.read_diff(&meta.representative_id).unwrap(),
            "+added\n-removed\n"
        );
        assert_eq!(
            store.read_diagram(&meta.representative_id).unwrap(),
            "graph TD\n"
        );
    }

    #[test]
    fn test_write_aggregate() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();
        store.write_aggregate("memory.md", "# Project Memory\n").unwrap();
        assert_eq!(
            fs::read_to_string(store.root().join("memory.md")).unwrap(),
            "# Project Memory\n"
        );
    }
}
