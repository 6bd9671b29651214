//! Minimal OpenAI client for scenario drafting.
//!
//! We only call chat.completions with `response_format = json_object` and hand the
//! returned text to `draft::parse_draft`. Calls are instrumented and log the model,
//! latency and response size (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::{DraftProvider, Prompts};
use crate::draft::{parse_draft, DraftError, DraftGenerator, DraftRequest, ScenarioDraft};
use crate::util::fill_template;

const PROVIDER: &str = "openai";

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion. Returns the raw message text.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json(&self, system: &str, user: &str, temperature: f32) -> Result<String, DraftError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "debate-tutor/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await
      .map_err(|e| DraftError::Http { provider: PROVIDER, message: e.to_string() })?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(DraftError::Api { provider: PROVIDER, status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse = res.json().await
      .map_err(|e| DraftError::Unavailable(format!("unreadable OpenAI response: {e}")))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .filter(|t| !t.trim().is_empty())
      .ok_or_else(|| DraftError::Unavailable("OpenAI returned no content".into()))
  }
}

/// User prompt for one draft request.
pub fn user_prompt(prompts: &Prompts, req: &DraftRequest) -> String {
  let grade_line = req.grade.as_deref().map(|g| format!("대상 학년: {g}")).unwrap_or_default();
  let subject_line = req.subject.as_deref().map(|s| format!("관련 교과: {s}")).unwrap_or_default();
  fill_template(
    &prompts.openai_user_template,
    &[("topic", &req.topic), ("grade_line", &grade_line), ("subject_line", &subject_line)],
  )
}

#[async_trait]
impl DraftGenerator for OpenAI {
  fn provider(&self) -> DraftProvider {
    DraftProvider::OpenAi
  }

  #[instrument(level = "info", skip(self, prompts, req), fields(topic_len = req.topic.len(), model = %self.model))]
  async fn generate(&self, prompts: &Prompts, req: &DraftRequest) -> Result<ScenarioDraft, DraftError> {
    let user = user_prompt(prompts, req);
    let start = std::time::Instant::now();
    let result = self.chat_json(&prompts.openai_system, &user, 0.5).await;
    let elapsed = start.elapsed();

    let text = match result {
      Ok(t) => {
        info!(?elapsed, response_len = t.len(), "Model response received successfully");
        t
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during draft generation");
        return Err(e);
      }
    };
    parse_draft(&text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_prompt_fills_optional_lines() {
    let prompts = Prompts::default();
    let req = DraftRequest { topic: "교복 착용".into(), grade: Some("5-6학년".into()), subject: None };
    let out = user_prompt(&prompts, &req);
    assert!(out.contains("\"교복 착용\""));
    assert!(out.contains("대상 학년: 5-6학년"));
    assert!(!out.contains("관련 교과"));
    assert!(!out.contains("{grade_line}"));
  }

  #[test]
  fn request_asks_for_json_object() {
    let req = ChatCompletionRequest {
      model: "gpt-4o".into(),
      messages: vec![ChatMessageReq { role: "user".into(), content: "hi".into() }],
      temperature: 0.5,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["response_format"]["type"], "json_object");
    assert_eq!(v["messages"][0]["role"], "user");
  }

  #[test]
  fn openai_error_body_is_unwrapped() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Incorrect API key provided"));
    assert_eq!(extract_openai_error("<html>bad gateway</html>"), None);
  }
}
