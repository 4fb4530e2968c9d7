/// Centralized error types for git-memory using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use thiserror::Error;

/// Main error type for the history generation pipeline
#[derive(Error, Debug)]
pub enum GitMemoryError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

/// Errors related to opening and reading the git repository
///
/// These are the only fatal errors in the pipeline: if the repository cannot
/// be opened or walked, no group processing is attempted.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Repository is bare (no working history to walk): {0}")]
    Bare(String),

    #[error("Failed to walk commit history: {0}")]
    WalkFailed(String),

    #[error("Failed to load commit {hash}: {reason}")]
    CommitLoadFailed { hash: String, reason: String },
}

/// Errors from the external AI summarizer
///
/// Deliberately not a variant of [`GitMemoryError`]: the pipeline converts
/// every summarizer failure to the deterministic local fallback record, so
/// these never cross the run boundary.
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("No API key configured for provider '{0}'")]
    MissingApiKey(String),

    #[error("Unknown model provider: {0}")]
    UnknownProvider(String),

    #[error("Request to summarizer failed: {0}")]
    RequestFailed(String),

    #[error("Summarizer returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Failed to parse summarizer response: {0}")]
    MalformedResponse(String),
}

/// Errors writing to or reading from the on-disk history store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create history directory '{path}': {reason}")]
    CreateFailed { path: String, reason: String },

    #[error("Failed to write artifact '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to read '{path}': {reason}")]
    ReadFailed { path: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

// Conversion from anyhow::Error to GitMemoryError
impl From<anyhow::Error> for GitMemoryError {
    fn from(err: anyhow::Error) -> Self {
        GitMemoryError::Other(format!("{:#}", err))
    }
}

impl GitMemoryError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        GitMemoryError::Other(msg.into())
    }

    /// Check whether this error aborts the whole run
    ///
    /// Only repository and configuration errors are fatal; summarizer and
    /// store errors are absorbed per group by the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GitMemoryError::Repository(_) | GitMemoryError::Config(_)
        )
    }
}
