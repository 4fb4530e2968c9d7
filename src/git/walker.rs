use crate::error::{GitMemoryError, RepositoryError};
use anyhow::{Context, Result};
use git2::{DiffOptions, Repository, Sort};
use std::path::{Path, PathBuf};

/// The well-known hash of the empty tree, used as the diff base for a
/// history's very first commit (which has no parent).
pub const EMPTY_TREE_HASH: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Information about a git commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Full commit SHA hash (40 characters)
    pub hash: String,
    /// Abbreviated hash (first 7 characters)
    pub short_hash: String,
    /// First line of the commit message
    pub summary: String,
    /// Author's name
    pub author_name: String,
    /// Commit timestamp (Unix epoch seconds)
    pub timestamp: i64,
    /// SHA hashes of parent commits
    pub parent_hashes: Vec<String>,
}

impl CommitInfo {
    /// Hash of the first parent, if any
    pub fn first_parent(&self) -> Option<&str> {
        self.parent_hashes.first().map(String::as_str)
    }
}

/// Git repository walker for loading commit history and computing range diffs
pub struct GitWalker {
    repo: Repository,
    repo_path: PathBuf,
}

// git2::Repository does not implement Debug, so derive is unavailable
impl std::fmt::Debug for GitWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitWalker")
            .field("repo_path", &self.repo_path)
            .finish_non_exhaustive()
    }
}

impl GitWalker {
    /// Open a git repository at the given path
    ///
    /// Bare repositories are rejected: there is no working history to track
    /// a `.history` directory against.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GitMemoryError> {
        let path = path.as_ref();

        let repo = Repository::open(path)
            .map_err(|_| RepositoryError::NotARepository(path.display().to_string()))?;

        if repo.is_bare() {
            return Err(RepositoryError::Bare(path.display().to_string()).into());
        }

        let repo_path = path.to_path_buf();
        tracing::info!("Opened git repository at: {}", repo_path.display());

        Ok(Self { repo, repo_path })
    }

    /// Get the repository root path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Check if repository has any commits
    pub fn has_commits(&self) -> bool {
        self.repo.head().is_ok()
    }

    /// Load the full linear commit history, oldest to newest
    ///
    /// Merge commits (more than one parent) are excluded. An empty repository
    /// yields an empty vector rather than an error.
    pub fn load_commits(&self) -> Result<Vec<CommitInfo>, GitMemoryError> {
        if !self.has_commits() {
            tracing::warn!("Repository has no commits yet");
            return Ok(Vec::new());
        }

        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| RepositoryError::WalkFailed(e.to_string()))?;
        revwalk
            .set_sorting(Sort::TIME | Sort::REVERSE)
            .map_err(|e| RepositoryError::WalkFailed(e.to_string()))?;
        revwalk
            .push_head()
            .map_err(|e| RepositoryError::WalkFailed(e.to_string()))?;

        let mut commits = Vec::new();

        for oid in revwalk {
            let oid = oid.map_err(|e| RepositoryError::WalkFailed(e.to_string()))?;
            let commit =
                self.repo
                    .find_commit(oid)
                    .map_err(|e| RepositoryError::CommitLoadFailed {
                        hash: oid.to_string(),
                        reason: e.to_string(),
                    })?;

            // Skip merge commits
            if commit.parent_count() > 1 {
                tracing::debug!("Skipping merge commit: {}", commit.id());
                continue;
            }

            commits.push(Self::extract_commit_info(&commit));

            if commits.len() % 50 == 0 {
                tracing::debug!("Loaded {} commits", commits.len());
            }
        }

        tracing::info!("Loaded {} non-merge commits", commits.len());
        Ok(commits)
    }

    /// Extract commit metadata
    fn extract_commit_info(commit: &git2::Commit) -> CommitInfo {
        let hash = commit.id().to_string();
        let short_hash: String = hash.chars().take(7).collect();
        let summary = commit.summary().unwrap_or("").to_string();
        let author_name = commit.author().name().unwrap_or("Unknown").to_string();
        let timestamp = commit.time().seconds();
        let parent_hashes: Vec<String> = commit.parents().map(|p| p.id().to_string()).collect();

        CommitInfo {
            hash,
            short_hash,
            summary,
            author_name,
            timestamp,
            parent_hashes,
        }
    }

    /// Compute the unified diff between two points in history
    ///
    /// `base` is the hash of the commit whose tree forms the old side.
    /// `None` or [`EMPTY_TREE_HASH`] diff against the empty tree (the first
    /// commit in a history has no parent). `newest` is the commit whose tree
    /// forms the new side.
    pub fn range_diff(&self, base: Option<&str>, newest: &str) -> Result<String> {
        let new_tree = self.commit_tree(newest)?;
        let old_tree = match base {
            Some(hash) if hash != EMPTY_TREE_HASH => Some(self.commit_tree(hash)?),
            _ => None,
        };

        let mut diff_opts = DiffOptions::new();
        diff_opts
            .context_lines(3)
            .interhunk_lines(0)
            .ignore_whitespace(false);

        let diff = self
            .repo
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut diff_opts))
            .context("Failed to compute tree diff")?;

        let mut diff_content = String::new();

        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            // Skip binary files
            if line.origin() == 'B' {
                return true;
            }

            // Only valid UTF-8 makes it into the patch text
            if let Ok(content) = std::str::from_utf8(line.content()) {
                match line.origin() {
                    '+' | '-' | ' ' => {
                        diff_content.push(line.origin());
                        diff_content.push_str(content);
                    }
                    'F' | 'H' => {
                        diff_content.push_str(content);
                    }
                    _ => {}
                }
            } else {
                tracing::debug!("Skipping diff line with invalid UTF-8");
            }

            true
        })
        .context("Failed to render diff")?;

        Ok(diff_content)
    }

    /// List the file paths present in the tree of a commit, sorted
    ///
    /// Used for the locally synthesized structure diagram.
    pub fn list_files(&self, commit_hash: &str) -> Result<Vec<String>> {
        let tree = self.commit_tree(commit_hash)?;
        let mut files = Vec::new();

        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                files.push(format!("{}{}", dir, name));
            }
            git2::TreeWalkResult::Ok
        })
        .context("Failed to walk commit tree")?;

        files.sort();
        Ok(files)
    }

    fn commit_tree(&self, hash: &str) -> Result<git2::Tree<'_>> {
        let oid = git2::Oid::from_str(hash)
            .with_context(|| format!("Invalid commit hash: {}", hash))?;
        let commit = self
            .repo
            .find_commit(oid)
            .with_context(|| format!("Commit not found: {}", hash))?;
        commit.tree().context("Failed to load commit tree")
    }
}

/// Count the lines of a diff text
///
/// An empty diff has zero lines; this is the input for the minimum-diff-lines
/// threshold filter.
pub fn diff_line_count(diff_text: &str) -> usize {
    if diff_text.is_empty() {
        0
    } else {
        diff_text.lines().count()
    }
}
