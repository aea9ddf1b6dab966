//! HTTP client for the generative-text API.
//!
//! Talks to a Gemini-style `generateContent` endpoint with a fixed prompt
//! template and JSON response mode, then parses the returned text as a
//! JSON array of task strings. Uses reqwest with JSON serialization.

use crate::suggest::{SuggestError, SuggestResult, TaskSuggester};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the generative-text provider.
#[derive(Debug, Clone)]
pub struct SuggesterConfig {
    pub api_base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl SuggesterConfig {
    /// Production defaults with the caller-supplied API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking HTTP implementation of [`TaskSuggester`].
pub struct HttpTaskSuggester {
    client: Client,
    config: SuggesterConfig,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl HttpTaskSuggester {
    /// Builds the client; fails only when the HTTP stack cannot be set up.
    pub fn try_new(config: SuggesterConfig) -> Result<Self, SuggestError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| SuggestError::Http(err.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_base_url, self.config.model, self.config.api_key
        )
    }
}

impl TaskSuggester for HttpTaskSuggester {
    fn suggest_subtasks(&self, title: &str, description: &str) -> SuggestResult {
        let started_at = Instant::now();
        let prompt = breakdown_prompt(title, description);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response = self.client.post(self.endpoint_url()).json(&body).send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            warn!(
                "event=suggest_request module=suggest status=error duration_ms={} http_status={}",
                started_at.elapsed().as_millis(),
                status.as_u16()
            );
            return Err(SuggestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateContentResponse = response.json()?;
        let titles = parse_task_titles(&candidate_text(&payload))?;
        info!(
            "event=suggest_request module=suggest status=ok duration_ms={} task_count={}",
            started_at.elapsed().as_millis(),
            titles.len()
        );
        Ok(titles)
    }
}

/// Prompt template shared with the original product wording; the response
/// contract is "only a JSON array of strings".
fn breakdown_prompt(title: &str, description: &str) -> String {
    format!(
        "Break down the following goal into 3-5 actionable sub-tasks. \
         Return only a JSON array of strings. \
         Goal: \"{title}\" Description: \"{description}\""
    )
}

fn candidate_text(payload: &GenerateContentResponse) -> String {
    payload
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Parses the model's text payload into non-empty task titles.
fn parse_task_titles(text: &str) -> SuggestResult {
    let titles: Vec<String> = serde_json::from_str(text)
        .map_err(|err| SuggestError::MalformedResponse(format!("expected JSON array of strings: {err}")))?;

    let titles: Vec<String> = titles
        .into_iter()
        .map(|title| title.trim().to_string())
        .collect();
    if titles.is_empty() {
        return Err(SuggestError::MalformedResponse(
            "provider returned an empty task list".to_string(),
        ));
    }
    if titles.iter().any(String::is_empty) {
        return Err(SuggestError::MalformedResponse(
            "provider returned an empty task title".to_string(),
        ));
    }
    Ok(titles)
}
