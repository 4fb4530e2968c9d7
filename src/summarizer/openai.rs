use crate::config::Config;
use crate::error::SummarizeError;
use crate::memory::{CommitMemory, ProjectMemory};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Summarizer;

/// Maximum diff characters sent to the provider per request
const MAX_DIFF_CHARS: usize = 12_000;

const SUMMARIZE_SYSTEM_PROMPT: &str = "You are a senior engineer documenting a project's history. \
Given a git diff and commit message, respond with a JSON object with keys \
\"added\", \"removed\", \"changed\" (arrays of {\"description\", \"files\", \"impact\"} \
where impact is \"minor\", \"moderate\" or \"major\"), \"summary\" (one paragraph) \
and \"technical_details\" (notable implementation details).";

const AGGREGATE_SYSTEM_PROMPT: &str = "You are a senior engineer documenting a project's history. \
Given a series of commit group memories in chronological order, respond with a JSON object \
with keys \"major_features\", \"architecture_evolution\", \"key_decisions\", \"next_steps\" \
(arrays of strings) and \"current_state\" (one paragraph).";

const DIAGRAM_SYSTEM_PROMPT: &str = "You generate Mermaid diagrams. Given a project's file \
listing and the latest change summary, respond with only Mermaid 'graph TD' source describing \
the project structure and its main features. No prose, no code fences.";

/// Summarizer backed by an OpenAI-compatible chat completions endpoint
///
/// Supports the `openai`, `openrouter` and `local` provider presets; any of
/// them can be redirected with an explicit base URL. The HTTP client enforces
/// a bounded timeout; retries are not attempted, the caller degrades to the
/// fallback record on any error.
#[derive(Debug)]
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiSummarizer {
    /// Build a summarizer from the run configuration
    pub fn from_config(config: &Config) -> Result<Self, SummarizeError> {
        let base_url = match config.api_base.clone() {
            Some(base) => base,
            None => match config.model_provider.as_str() {
                "openai" => "https://api.openai.com/v1".to_string(),
                "openrouter" => "https://openrouter.ai/api/v1".to_string(),
                "local" => "http://localhost:11434/v1".to_string(),
                other => return Err(SummarizeError::UnknownProvider(other.to_string())),
            },
        };

        // Local endpoints run without credentials
        let api_key = config.api_key.clone();
        if api_key.is_none() && config.model_provider != "local" {
            return Err(SummarizeError::MissingApiKey(
                config.model_provider.clone(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SummarizeError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
        })
    }

    /// Send one chat completion request and return the message content
    async fn chat(&self, system: &str, user: String, json: bool) -> Result<String, SummarizeError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            response_format: json.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SummarizeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| SummarizeError::MalformedResponse("no choices in response".to_string()))
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(
        &self,
        diff_text: &str,
        commit_message: &str,
        commit_id: &str,
    ) -> Result<CommitMemory, SummarizeError> {
        let mut diff = diff_text.to_string();
        if diff.len() > MAX_DIFF_CHARS {
            diff.truncate(MAX_DIFF_CHARS);
            diff.push_str("\n\n[... diff truncated ...]");
            tracing::warn!("Truncated large diff for commit group {}", commit_id);
        }

        let user = format!(
            "Commit: {}\nMessage: {}\n\nDiff:\n{}",
            commit_id, commit_message, diff
        );

        let content = self.chat(SUMMARIZE_SYSTEM_PROMPT, user, true).await?;
        serde_json::from_str(&content).map_err(|e| SummarizeError::MalformedResponse(e.to_string()))
    }

    async fn aggregate(
        &self,
        memories: &[CommitMemory],
        total_commits: usize,
    ) -> Result<ProjectMemory, SummarizeError> {
        let rendered = memories
            .iter()
            .enumerate()
            .map(|(i, m)| format!("Group {}:\n{}", i + 1, m.to_markdown()))
            .collect::<Vec<_>>()
            .join("\n---\n");

        let user = format!(
            "Project history ({} commits, {} groups):\n\n{}",
            total_commits,
            memories.len(),
            rendered
        );

        let content = self.chat(AGGREGATE_SYSTEM_PROMPT, user, true).await?;
        serde_json::from_str(&content).map_err(|e| SummarizeError::MalformedResponse(e.to_string()))
    }

    async fn diagram(
        &self,
        memory: &CommitMemory,
        files: &[String],
    ) -> Result<String, SummarizeError> {
        let user = format!(
            "Latest change summary:\n{}\n\nFiles:\n{}",
            memory.summary,
            files.join("\n")
        );

        let content = self.chat(DIAGRAM_SYSTEM_PROMPT, user, false).await?;
        Ok(strip_code_fences(&content))
    }
}

/// Remove Markdown code fences some models wrap diagrams in
fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the fence language tag line and the trailing fence
    let rest = rest.strip_prefix("mermaid").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .trim_end_matches('`')
        .trim()
        .to_string()
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}
