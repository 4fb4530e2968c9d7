/// Artifact data model for commit memories and project-level aggregation
///
/// These types are the structured output contract with the AI summarizer and
/// the shape persisted (rendered as Markdown) into the history store.
use serde::{Deserialize, Serialize};

/// How significant a single change is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    #[default]
    Minor,
    Moderate,
    Major,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Minor => "minor",
            Impact::Moderate => "moderate",
            Impact::Major => "major",
        }
    }
}

/// One described change within a commit group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    /// Human-readable description of the change
    pub description: String,
    /// Files involved in the change
    #[serde(default)]
    pub files: Vec<String>,
    /// Significance of the change
    #[serde(default)]
    pub impact: Impact,
}

/// Structured memory record for one commit group
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommitMemory {
    /// Things the group added
    #[serde(default)]
    pub added: Vec<Change>,
    /// Things the group removed
    #[serde(default)]
    pub removed: Vec<Change>,
    /// Things the group changed
    #[serde(default)]
    pub changed: Vec<Change>,
    /// One-paragraph natural language summary
    #[serde(default)]
    pub summary: String,
    /// Notable implementation details
    #[serde(default)]
    pub technical_details: String,
}

/// Project-level memory aggregated across all commit groups
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectMemory {
    #[serde(default)]
    pub major_features: Vec<String>,
    #[serde(default)]
    pub architecture_evolution: Vec<String>,
    #[serde(default)]
    pub key_decisions: Vec<String>,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

fn render_changes(out: &mut String, heading: &str, changes: &[Change]) {
    if changes.is_empty() {
        return;
    }
    out.push_str("### ");
    out.push_str(heading);
    out.push('\n');
    for change in changes {
        out.push_str("- ");
        out.push_str(&change.description);
        out.push_str(" (");
        out.push_str(change.impact.as_str());
        out.push(')');
        if !change.files.is_empty() {
            out.push_str(" — `");
            out.push_str(&change.files.join("`, `"));
            out.push('`');
        }
        out.push('\n');
    }
    out.push('\n');
}

impl CommitMemory {
    /// Render the memory as Markdown, without any surrounding group header
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        if !self.summary.is_empty() {
            out.push_str(&self.summary);
            out.push_str("\n\n");
        }

        render_changes(&mut out, "Added", &self.added);
        render_changes(&mut out, "Removed", &self.removed);
        render_changes(&mut out, "Changed", &self.changed);

        if !self.technical_details.is_empty() {
            out.push_str("### Technical Details\n");
            out.push_str(&self.technical_details);
            out.push('\n');
        }

        out
    }
}

fn render_list(out: &mut String, heading: &str, items: &[String]) {
    out.push_str("## ");
    out.push_str(heading);
    out.push('\n');
    if items.is_empty() {
        out.push_str("_None recorded._\n");
    } else {
        for item in items {
            out.push_str("- ");
            out.push_str(item);
            out.push('\n');
        }
    }
    out.push('\n');
}

impl ProjectMemory {
    /// Render the project memory as Markdown
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        render_list(&mut out, "Major Features", &self.major_features);
        render_list(
            &mut out,
            "Architecture Evolution",
            &self.architecture_evolution,
        );
        render_list(&mut out, "Key Decisions", &self.key_decisions);

        out.push_str("## Current State\n");
        if self.current_state.is_empty() {
            out.push_str("_Unknown._\n");
        } else {
            out.push_str(&self.current_state);
            out.push('\n');
        }
        out.push('\n');

        render_list(&mut out, "Next Steps", &self.next_steps);

        out
    }
}

/// Format an epoch-seconds commit timestamp for rendered Markdown
pub fn format_timestamp(epoch_secs: i64) -> String {
    chrono::DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}
