use crate::git::walker::CommitInfo;

/// An ordered, contiguous, non-empty run of commits treated as one unit of
/// diffing and summarization
///
/// Commits are stored oldest to newest. The group's representative id (its
/// on-disk directory name) is the hash of its oldest commit.
#[derive(Debug, Clone)]
pub struct CommitGroup {
    commits: Vec<CommitInfo>,
}

impl CommitGroup {
    /// Build a group from a non-empty slice of commits, oldest first
    fn new(commits: Vec<CommitInfo>) -> Self {
        debug_assert!(!commits.is_empty(), "commit groups are never empty");
        Self { commits }
    }

    /// Hash of the oldest commit, used as the group's directory name
    pub fn representative_id(&self) -> &str {
        &self.oldest().hash
    }

    /// The oldest commit in the group
    pub fn oldest(&self) -> &CommitInfo {
        &self.commits[0]
    }

    /// The newest commit in the group
    pub fn newest(&self) -> &CommitInfo {
        &self.commits[self.commits.len() - 1]
    }

    /// Number of commits in the group
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// All commits, oldest first
    pub fn commits(&self) -> &[CommitInfo] {
        &self.commits
    }
}

/// Partition a chronologically ordered commit sequence into contiguous groups
///
/// Each group holds `min_size` commits except possibly the last, which takes
/// whatever remains. The concatenation of all groups, in order, reconstructs
/// the input sequence exactly. An empty sequence yields no groups.
pub fn group_commits(commits: Vec<CommitInfo>, min_size: usize) -> Vec<CommitGroup> {
    assert!(min_size >= 1, "group size must be at least 1");

    let mut groups = Vec::with_capacity(commits.len().div_ceil(min_size));
    let mut current = Vec::with_capacity(min_size);

    for commit in commits {
        current.push(commit);
        if current.len() == min_size {
            groups.push(CommitGroup::new(std::mem::take(&mut current)));
        }
    }

    // The final group may be smaller than min_size, never larger
    if !current.is_empty() {
        groups.push(CommitGroup::new(current));
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_commit(n: usize) -> CommitInfo {
        let hash = format!("{:040x}", n);
        CommitInfo {
            short_hash: hash.chars().take(7).collect(),
            hash,
            summary: format!("commit {}", n),
            author_name: "Test Author".to_string(),
            timestamp: 1_700_000_000 + n as i64,
            parent_hashes: if n == 0 {
                vec![]
            } else {
                vec![format!("{:040x}", n - 1)]
            },
        }
    }

    fn make_commits(count: usize) -> Vec<CommitInfo> {
        (0..count).map(make_commit).collect()
    }

    #[test]
    fn test_empty_sequence_yields_no_groups() {
        let groups = group_commits(Vec::new(), 3);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        let groups = group_commits(make_commits(6), 3);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 3);
    }

    #[test]
    fn test_final_group_may_be_smaller() {
        let groups = group_commits(make_commits(7), 3);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].len(), 1);
    }

    #[test]
    fn test_group_count_is_ceiling() {
        for n in 0..20 {
            for g in 1..6 {
                let groups = group_commits(make_commits(n), g);
                assert_eq!(groups.len(), n.div_ceil(g), "n={} g={}", n, g);
            }
        }
    }

    #[test]
    fn test_min_size_larger_than_sequence() {
        let groups = group_commits(make_commits(3), 10);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn test_partition_reconstructs_sequence() {
        let commits = make_commits(10);
        let expected: Vec<String> = commits.iter().map(|c| c.hash.clone()).collect();

        let groups = group_commits(commits, 4);
        let actual: Vec<String> = groups
            .iter()
            .flat_map(|g| g.commits().iter().map(|c| c.hash.clone()))
            .collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_representative_is_oldest() {
        let groups = group_commits(make_commits(3), 2);
        assert_eq!(groups[0].representative_id(), format!("{:040x}", 0));
        assert_eq!(groups[1].representative_id(), format!("{:040x}", 2));
    }

    #[test]
    fn test_representatives_are_unique() {
        let groups = group_commits(make_commits(9), 2);
        let mut ids: Vec<&str> = groups.iter().map(|g| g.representative_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), groups.len());
    }

    #[test]
    fn test_oldest_and_newest() {
        let groups = group_commits(make_commits(5), 5);
        let group = &groups[0];
        assert_eq!(group.oldest().summary, "commit 0");
        assert_eq!(group.newest().summary, "commit 4");
    }
}
