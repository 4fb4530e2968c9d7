/// Project-level artifact aggregation
///
/// Rebuilds `memory.md`, `history.md` and `structure.mmd` at the history
/// root from whatever completed groups currently exist on disk. Groups are
/// concatenated in chronological commit order as reported by the store. The
/// three files are written on every run, with explicit placeholders when no
/// groups exist, so callers never have to distinguish "not run" from "run
/// with zero groups" by file absence.
use crate::error::GitMemoryError;
use crate::memory::{ProjectMemory, format_timestamp};
use crate::store::{GroupMeta, HistoryStore};

/// Placeholder written into aggregates when no groups have been processed
pub const NO_HISTORY_PLACEHOLDER: &str = "_No history has been generated yet._";

/// Write all three project-level files from the store's completed groups
///
/// Returns the number of group sections written.
pub fn write_aggregates(
    store: &HistoryStore,
    project_memory: &ProjectMemory,
) -> Result<usize, GitMemoryError> {
    let groups = store.list_complete_groups()?;

    store.write_aggregate("memory.md", &render_memory(&groups, project_memory))?;
    store.write_aggregate("history.md", &render_history(store, &groups)?)?;
    store.write_aggregate("structure.mmd", &render_structure(store, &groups)?)?;

    tracing::info!(
        "Aggregated {} group(s) into project-level files",
        groups.len()
    );
    Ok(groups.len())
}

fn group_heading(meta: &GroupMeta) -> String {
    format!(
        "## Group {} — {}\n\n*{} — {} commit{}*\n\n",
        meta.short_id(),
        meta.message,
        format_timestamp(meta.oldest_timestamp),
        meta.commit_count,
        if meta.commit_count == 1 { "" } else { "s" },
    )
}

fn render_memory(groups: &[GroupMeta], project_memory: &ProjectMemory) -> String {
    let mut out = String::from("# Project Memory\n\n");

    if groups.is_empty() {
        out.push_str(NO_HISTORY_PLACEHOLDER);
        out.push('\n');
        return out;
    }

    out.push_str(&project_memory.to_markdown());
    out.push_str("---\n\n");

    for (i, meta) in groups.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n\n");
        }
        out.push_str(&group_heading(meta));
        out.push_str(&meta.memory.to_markdown());
        out.push('\n');
    }

    out
}

fn render_history(
    store: &HistoryStore,
    groups: &[GroupMeta],
) -> Result<String, GitMemoryError> {
    let mut out = String::from("# Project History\n\n");

    if groups.is_empty() {
        out.push_str(NO_HISTORY_PLACEHOLDER);
        out.push('\n');
        return Ok(out);
    }

    for (i, meta) in groups.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n\n");
        }
        out.push_str(&group_heading(meta));

        let diff = store.read_diff(&meta.representative_id)?;
        out.push_str("```diff\n");
        out.push_str(&diff);
        if !diff.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("```\n\n");
    }

    Ok(out)
}

fn render_structure(
    store: &HistoryStore,
    groups: &[GroupMeta],
) -> Result<String, GitMemoryError> {
    // Only the most recent group's diagram, not a merge of all of them
    match groups.last() {
        Some(meta) => store.read_diagram(&meta.representative_id),
        None => Ok("graph TD\n    %% No history has been generated yet\n".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::{fallback_memory, fallback_project_memory};
    use std::fs;
    use tempfile::tempdir;

    fn make_meta(rep: &str, timestamp: i64, message: &str) -> GroupMeta {
        GroupMeta {
            representative_id: rep.to_string(),
            newest_hash: "f".repeat(40),
            message: message.to_string(),
            oldest_timestamp: timestamp,
            commit_count: 1,
            diff_lines: 3,
            memory: fallback_memory(message, 3),
        }
    }

    fn count_sections(content: &str) -> usize {
        content.matches("## Group ").count()
    }

    #[test]
    fn test_zero_groups_writes_placeholders() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();

        let project = fallback_project_memory(&[], 0);
        let written = write_aggregates(&store, &project).unwrap();
        assert_eq!(written, 0);

        let memory = fs::read_to_string(store.root().join("memory.md")).unwrap();
        let history = fs::read_to_string(store.root().join("history.md")).unwrap();
        let structure = fs::read_to_string(store.root().join("structure.mmd")).unwrap();

        assert!(memory.contains(NO_HISTORY_PLACEHOLDER));
        assert!(history.contains(NO_HISTORY_PLACEHOLDER));
        assert!(structure.starts_with("graph TD"));
    }

    #[test]
    fn test_one_section_per_group() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();

        for (i, rep) in ["a", "b", "c"].iter().enumerate() {
            let meta = make_meta(&rep.repeat(40), 100 + i as i64, &format!("commit {}", i));
            store
                .persist_group(&meta, &format!("+line {}\n", i), "graph TD\n")
                .unwrap();
        }

        let metas = store.list_complete_groups().unwrap();
        let memories: Vec<_> = metas.iter().map(|m| m.memory.clone()).collect();
        let project = fallback_project_memory(&memories, 3);

        let written = write_aggregates(&store, &project).unwrap();
        assert_eq!(written, 3);

        let memory = fs::read_to_string(store.root().join("memory.md")).unwrap();
        let history = fs::read_to_string(store.root().join("history.md")).unwrap();

        assert_eq!(count_sections(&memory), 3);
        assert_eq!(count_sections(&history), 3);
        assert!(history.contains("+line 0"));
        assert!(history.contains("+line 2"));
    }

    #[test]
    fn test_sections_follow_commit_order_not_hash_order() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join(".history")).unwrap();

        // "9..." sorts after "1..." lexically but is the older commit
        let older = make_meta(&"9".repeat(40), 100, "first change");
        let newer = make_meta(&"1".repeat(40), 200, "second change");
        store.persist_group(&newer, "+new\n", "graph TD\n    n\n").unwrap();
        store.persist_group(&older, "+old\n", "graph TD\n    o\n").unwrap();

        let project = fallback_project_memory(&[], 2);
        write_aggregates(&store, &project).unwrap();

        let memory = fs::read_to_string(store.root().join("memory.md")).unwrap();
        let first = memory.find("first change").unwrap();
        let second = memory.find("second change").unwrap();
        assert!(first < second, "older group renders first");

        // structure.mmd carries only the most recent group's diagram
        let structure = fs::read_to_string(store.root().join("structure.mmd")).unwrap();
        assert_eq!(structure, "graph TD\n    n\n");
    }
}
