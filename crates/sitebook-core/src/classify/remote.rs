//! Classifier that delegates to a language model behind an OpenAI-compatible
//! chat-completions endpoint (Ollama, vLLM, OpenAI, ...).
//!
//! The model is asked to answer with a bare JSON object:
//!
//! ```text
//! {"category": "repair", "action": "Patch ceiling crack in garage"}
//! ```
//!
//! Requests are made once; there is no retry.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sitebook_store::models::NoteCategory;

use super::trait_def::NoteClassifier;
use super::types::{Classification, SiteNote};

/// Connection settings for [`RemoteClassifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Server root, without the `/v1/...` path.
    pub base_url: String,
    pub model: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &str = "llama3.1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// The JSON object the model is instructed to produce.
#[derive(Debug, Deserialize)]
struct Verdict {
    category: String,
    #[serde(default)]
    action: Option<String>,
}

pub struct RemoteClassifier {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub const NAME: &str = "remote";

    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// System prompt listing the allowed categories.
pub fn system_prompt() -> String {
    let categories: Vec<String> = NoteCategory::ALL
        .iter()
        .map(|c| format!("- {c}: {}", c.default_action()))
        .collect();
    format!(
        "You triage site notes for a drywall subcontractor.\n\
         Pick exactly one category for the note and a short follow-up action.\n\
         Categories (with their usual action):\n{}\n\
         Reply with only a JSON object: {{\"category\": \"<category>\", \"action\": \"<action>\"}}",
        categories.join("\n")
    )
}

/// Extract a [`Classification`] from the model's reply text.
///
/// Accepts the JSON object bare or inside a Markdown code fence. An empty or
/// missing action falls back to the category's default.
pub fn parse_verdict(content: &str) -> Result<Classification> {
    let json = strip_code_fence(content);
    let verdict: Verdict = serde_json::from_str(json)
        .with_context(|| format!("model reply is not a JSON verdict: {content:?}"))?;

    let category = verdict
        .category
        .trim()
        .to_lowercase()
        .parse::<NoteCategory>()
        .with_context(|| format!("model returned unknown category {:?}", verdict.category))?;

    let action = verdict
        .action
        .map(|a| a.trim().to_owned())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| category.default_action().to_owned());

    Ok(Classification {
        category,
        action,
        classifier: RemoteClassifier::NAME.to_owned(),
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

#[async_trait]
impl NoteClassifier for RemoteClassifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn classify(&self, note: &SiteNote) -> Result<Classification> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Lot {} in {}: {}", note.lot, note.community, note.text),
                },
            ],
            temperature: 0.0,
        };

        let url = self.endpoint();
        debug!(%url, model = %self.config.model, lot = %note.lot, "sending note to model");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .with_context(|| format!("classification request to {url} failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("classification API error ({status}): {error_text}");
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("failed to decode classification response")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("classification response has no message content")?;

        parse_verdict(&content)
    }
}
