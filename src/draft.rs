//! AI-drafted scenario content: the provider seam, response parsing and shape checks.
//!
//! Providers return free text that should contain one JSON object. We take the
//! outermost `{ ... }` block (this also strips markdown fences and any prose the
//! model wrapped around it), parse it, and reject drafts missing any required field.
//! A rejected draft is never patched up with defaults.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::{DraftProvider, Prompts};
use crate::domain::ScenarioDetails;
use crate::util::trunc_for_log;

pub const REQUIRED_FIELDS: [&str; 7] = [
  "title", "topic", "background", "proArguments", "conArguments", "teacherTips", "expectedOutcomes",
];

#[derive(Debug, Error)]
pub enum DraftError {
  #[error("{0} draft provider is not configured")]
  Disabled(&'static str),
  #[error("{provider} request failed: {message}")]
  Http { provider: &'static str, message: String },
  #[error("{provider} returned HTTP {status}: {message}")]
  Api { provider: &'static str, status: u16, message: String },
  #[error("draft unavailable: {0}")]
  Unavailable(String),
  #[error("draft is missing required fields: {}", .missing.join(", "))]
  Incomplete { missing: Vec<String>, partial: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRequest {
  pub topic: String,
  pub grade: Option<String>,
  pub subject: Option<String>,
}

/// A validated draft. Required fields are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDraft {
  pub title: String,
  pub topic: String,
  pub keywords: Vec<String>,
  pub grade: Option<String>,
  pub subject: Option<String>,
  pub background: String,
  pub pro_arguments: Vec<String>,
  pub con_arguments: Vec<String>,
  pub teacher_tips: String,
  pub key_questions: Vec<String>,
  pub materials: Vec<String>,
  pub expected_outcomes: Vec<String>,
}

impl ScenarioDraft {
  pub fn details(&self) -> ScenarioDetails {
    fn some_vec(v: &[String]) -> Option<Vec<String>> {
      if v.is_empty() { None } else { Some(v.to_vec()) }
    }
    ScenarioDetails {
      background: Some(self.background.clone()),
      pro_arguments: Some(self.pro_arguments.clone()),
      con_arguments: Some(self.con_arguments.clone()),
      teacher_tips: Some(self.teacher_tips.clone()),
      key_questions: some_vec(&self.key_questions),
      materials: some_vec(&self.materials),
      expected_outcomes: Some(self.expected_outcomes.clone()),
    }
  }
}

#[async_trait]
pub trait DraftGenerator: Send + Sync {
  fn provider(&self) -> DraftProvider;
  async fn generate(&self, prompts: &Prompts, request: &DraftRequest) -> Result<ScenarioDraft, DraftError>;
}

/// The configured providers plus the preferred one.
#[derive(Clone, Default)]
pub struct Drafters {
  pub openai: Option<Arc<dyn DraftGenerator>>,
  pub gemini: Option<Arc<dyn DraftGenerator>>,
  pub preferred: Option<DraftProvider>,
}

impl Drafters {
  pub fn is_empty(&self) -> bool {
    self.openai.is_none() && self.gemini.is_none()
  }

  fn get(&self, provider: DraftProvider) -> Option<&Arc<dyn DraftGenerator>> {
    match provider {
      DraftProvider::OpenAi => self.openai.as_ref(),
      DraftProvider::Gemini => self.gemini.as_ref(),
    }
  }

  /// An explicitly requested provider must be configured; otherwise the preferred
  /// one is tried first, then OpenAI, then Gemini.
  pub fn pick(&self, requested: Option<DraftProvider>) -> Result<Arc<dyn DraftGenerator>, DraftError> {
    if let Some(p) = requested {
      return self.get(p).cloned().ok_or(DraftError::Disabled(p.as_str()));
    }
    self.preferred
      .and_then(|p| self.get(p))
      .or(self.openai.as_ref())
      .or(self.gemini.as_ref())
      .cloned()
      .ok_or(DraftError::Disabled("any"))
  }
}

fn json_block() -> Option<&'static Regex> {
  static RE: OnceLock<Option<Regex>> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").ok()).as_ref()
}

/// Outermost `{ ... }` span of a model response, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
  json_block()?.find(text).map(|m| m.as_str())
}

fn is_blank(v: Option<&serde_json::Value>) -> bool {
  use serde_json::Value;
  match v {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.trim().is_empty(),
    Some(Value::Array(a)) => a.is_empty(),
    Some(Value::Object(o)) => o.is_empty(),
    Some(_) => false,
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
  One(String),
  Many(Vec<String>),
}

impl OneOrMany {
  fn into_vec(self) -> Vec<String> {
    match self {
      OneOrMany::One(s) => vec![s],
      OneOrMany::Many(v) => v,
    }
  }

  fn joined(self) -> String {
    self.into_vec().join(", ")
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
  title: String,
  topic: String,
  #[serde(default)] keywords: Option<OneOrMany>,
  #[serde(default)] grade: Option<String>,
  #[serde(default)] subject: Option<OneOrMany>,
  background: String,
  pro_arguments: OneOrMany,
  con_arguments: OneOrMany,
  teacher_tips: String,
  #[serde(default)] key_questions: Option<OneOrMany>,
  #[serde(default)] materials: Option<OneOrMany>,
  expected_outcomes: OneOrMany,
}

/// Parse and validate raw provider text into a draft.
pub fn parse_draft(text: &str) -> Result<ScenarioDraft, DraftError> {
  let Some(raw) = extract_json_object(text) else {
    warn!(target: "scenario", preview = %trunc_for_log(text, 120), "No JSON object in AI response");
    return Err(DraftError::Unavailable("no JSON object found in the AI response".into()));
  };
  let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
    warn!(target: "scenario", preview = %trunc_for_log(raw, 120), error = %e, "AI response is not valid JSON");
    DraftError::Unavailable(format!("JSON parse error: {e}"))
  })?;
  let Some(obj) = value.as_object() else {
    return Err(DraftError::Unavailable("AI response is not a JSON object".into()));
  };

  let missing: Vec<String> = REQUIRED_FIELDS
    .iter()
    .filter(|f| is_blank(obj.get(**f)))
    .map(|f| f.to_string())
    .collect();
  if !missing.is_empty() {
    return Err(DraftError::Incomplete { missing, partial: value });
  }

  let r: RawDraft = serde_json::from_value(value)
    .map_err(|e| DraftError::Unavailable(format!("unexpected draft shape: {e}")))?;

  Ok(ScenarioDraft {
    title: r.title.trim().to_string(),
    topic: r.topic.trim().to_string(),
    keywords: r.keywords.map(OneOrMany::into_vec).unwrap_or_default(),
    grade: r.grade.filter(|g| !g.trim().is_empty()),
    subject: r.subject.map(OneOrMany::joined).filter(|s| !s.is_empty()),
    background: r.background,
    pro_arguments: r.pro_arguments.into_vec(),
    con_arguments: r.con_arguments.into_vec(),
    teacher_tips: r.teacher_tips,
    key_questions: r.key_questions.map(OneOrMany::into_vec).unwrap_or_default(),
    materials: r.materials.map(OneOrMany::into_vec).unwrap_or_default(),
    expected_outcomes: r.expected_outcomes.into_vec(),
  })
}
