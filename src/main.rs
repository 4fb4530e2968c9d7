use anyhow::Result;
use clap::Parser;
use git_memory::config::Config;
use git_memory::pipeline::Pipeline;
use git_memory::summarizer::{LocalSummarizer, OpenAiSummarizer, Summarizer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// AI-powered commit-by-commit memory and structure tracking for Git projects
#[derive(Parser, Debug)]
#[command(name = "git-memory", version, about)]
struct Cli {
    /// Path to the Git repository
    repo_path: PathBuf,

    /// Model provider (openai, openrouter, local)
    #[arg(long, env = "GIT_MEMORY_PROVIDER")]
    model_provider: Option<String>,

    /// Model name (e.g., gpt-4o)
    #[arg(long, env = "GIT_MEMORY_MODEL")]
    model: Option<String>,

    /// Minimum number of commits per group
    #[arg(long, env = "GIT_MEMORY_MIN_COMMITS")]
    min_commits: Option<usize>,

    /// Minimum number of diff lines for a group to be processed
    #[arg(long, env = "GIT_MEMORY_MIN_DIFF_LINES")]
    min_diff_lines: Option<usize>,

    /// Name of the history directory created inside the repository
    #[arg(long)]
    history_dir: Option<String>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the AI provider and use the deterministic local summarizer
    #[arg(long)]
    no_ai: bool,
}

impl Cli {
    /// Assemble the run configuration: CLI > environment > file > defaults
    fn into_config(self) -> Result<(Config, PathBuf)> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env_overrides();

        if let Some(provider) = self.model_provider {
            config.model_provider = provider;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(min_commits) = self.min_commits {
            config.min_commits = min_commits;
        }
        if let Some(min_diff_lines) = self.min_diff_lines {
            config.min_diff_lines = Some(min_diff_lines);
        }
        if let Some(history_dir) = self.history_dir {
            config.history_dir_name = history_dir;
        }
        // A bool flag can only turn the setting on; its absence must not
        // clobber a config file's no_ai = true
        if self.no_ai {
            config.no_ai = true;
        }

        config.validate()?;
        Ok((config, self.repo_path))
    }
}

fn build_summarizer(config: &Config) -> Box<dyn Summarizer> {
    if config.no_ai {
        tracing::info!("AI summarization disabled, using local fallback summarizer");
        return Box::new(LocalSummarizer);
    }

    match OpenAiSummarizer::from_config(config) {
        Ok(summarizer) => Box::new(summarizer),
        Err(e) => {
            // Missing credentials degrade quality, never run completion
            tracing::warn!("AI summarizer unavailable ({}), using local fallback", e);
            Box::new(LocalSummarizer)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let (config, repo_path) = match cli.into_config() {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "git-memory v{}\nProcessing repository: {}\nModel: {}/{}\nMin diff lines: {}",
        env!("CARGO_PKG_VERSION"),
        repo_path.display(),
        config.model_provider,
        config.model,
        config
            .min_diff_lines
            .map(|n| n.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );

    let summarizer = build_summarizer(&config);
    let pipeline = Pipeline::new(config, summarizer);

    match pipeline.run(&repo_path).await {
        Ok(stats) => {
            println!(
                "\nDone in {:.1}s: {} of {} group(s) processed, {} already present, \
                 {} below diff threshold, {} failed",
                stats.elapsed_seconds,
                stats.processed,
                stats.total_groups,
                stats.skipped_existing,
                stats.skipped_below_threshold,
                stats.failed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\nError: {}", e);
            ExitCode::FAILURE
        }
    }
}
