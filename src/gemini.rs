//! Gemini `generateContent` client for scenario drafting.
//!
//! The prompt already asks for a bare JSON object; the text of the first candidate
//! goes through `draft::parse_draft`, which tolerates fences or prose around it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::{DraftProvider, Prompts};
use crate::draft::{parse_draft, DraftError, DraftGenerator, DraftRequest, ScenarioDraft};
use crate::util::fill_template;

const PROVIDER: &str = "gemini";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SAFETY_CATEGORIES: [&str; 4] = [
  "HARM_CATEGORY_HARASSMENT",
  "HARM_CATEGORY_HATE_SPEECH",
  "HARM_CATEGORY_SEXUALLY_EXPLICIT",
  "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Clone)]
pub struct Gemini {
  client: reqwest::Client,
  api_key: String,
  base_url: String,
  model: String,
}

impl Gemini {
  /// GEMINI_API_KEY (or GOOGLE_AI_API_KEY) enables the client; GEMINI_MODEL and
  /// GEMINI_BASE_URL override the defaults.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY")
      .or_else(|_| std::env::var("GOOGLE_AI_API_KEY"))
      .ok()
      .filter(|k| !k.trim().is_empty())?;
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());
    let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| BASE_URL.into());
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;
    Some(Self { client, api_key, base_url, model })
  }

  fn build_request(prompt: String) -> GenerateContentRequest {
    GenerateContentRequest {
      contents: vec![Content { role: "user".into(), parts: vec![Part { text: prompt }] }],
      generation_config: GenerationConfig {
        temperature: 0.7,
        top_k: 40,
        top_p: 0.95,
        max_output_tokens: 2048,
      },
      safety_settings: SAFETY_CATEGORIES
        .iter()
        .map(|c| SafetySetting { category: (*c).into(), threshold: "BLOCK_ONLY_HIGH".into() })
        .collect(),
    }
  }

  #[instrument(level = "info", skip(self, body), fields(model = %self.model))]
  async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, DraftError> {
    let url = format!(
      "{}/{model}:generateContent?key={api_key}",
      self.base_url.trim_end_matches('/'),
      model = self.model,
      api_key = self.api_key
    );

    let response = self.client.post(url).json(body).send().await
      // reqwest errors include the URL, which carries the key
      .map_err(|e| DraftError::Http { provider: PROVIDER, message: e.without_url().to_string() })?;

    if !response.status().is_success() {
      let status = response.status();
      let body_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
      return Err(map_http_error(status, body_text));
    }

    let parsed: GenerateContentResponse = response.json().await
      .map_err(|e| DraftError::Unavailable(format!("unreadable Gemini response: {}", e.without_url())))?;
    extract_text_response(parsed)
  }
}

/// Prompt for one draft request.
pub fn prompt_for(prompts: &Prompts, req: &DraftRequest) -> String {
  let grade_line = req.grade.as_deref()
    .map(|g| format!("이 토론은 {g} 학생들을 대상으로 합니다."))
    .unwrap_or_default();
  let subject_line = req.subject.as_deref()
    .map(|s| format!("이 토론은 {s} 교과와 연계됩니다."))
    .unwrap_or_default();
  fill_template(
    &prompts.gemini_template,
    &[("topic", &req.topic), ("grade_line", &grade_line), ("subject_line", &subject_line)],
  )
}

#[async_trait]
impl DraftGenerator for Gemini {
  fn provider(&self) -> DraftProvider {
    DraftProvider::Gemini
  }

  #[instrument(level = "info", skip(self, prompts, req), fields(topic_len = req.topic.len(), model = %self.model))]
  async fn generate(&self, prompts: &Prompts, req: &DraftRequest) -> Result<ScenarioDraft, DraftError> {
    let request = Self::build_request(prompt_for(prompts, req));
    let start = std::time::Instant::now();
    let text = match self.send_request(&request).await {
      Ok(t) => t,
      Err(e) => {
        error!(elapsed = ?start.elapsed(), error = %e, "Gemini call failed during draft generation");
        return Err(e);
      }
    };
    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Gemini response received");
    parse_draft(&text)
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  generation_config: GenerationConfig,
  safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content {
  role: String,
  parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
  text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  temperature: f32,
  top_k: u32,
  top_p: f32,
  max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
  category: String,
  threshold: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
  #[serde(default)]
  parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
  text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
  error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: Option<String>,
  status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, DraftError> {
  response
    .candidates
    .and_then(|candidates| candidates.into_iter().next())
    .and_then(|candidate| candidate.content)
    .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| DraftError::Unavailable("Gemini returned no text in the response candidates".into()))
}

fn map_http_error(status: StatusCode, body: String) -> DraftError {
  let message = serde_json::from_str::<ErrorWrapper>(&body)
    .map(|wrapper| {
      let status_text = wrapper.error.status.unwrap_or_default();
      let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
      if status_text.is_empty() { msg } else { format!("{status_text}: {msg}") }
    })
    .unwrap_or_else(|_| body.clone());
  DraftError::Api { provider: PROVIDER, status: status.as_u16(), message }
}
