//! Configuration: optional TOML file (prompts, storage, draft provider) plus env overrides.
//!
//! See `TutorConfig`, `Prompts` and `StorageConfig` for the expected schema:
//!
//! ```toml
//! [storage]
//! backend = "documents"        # memory | documents | local
//! path = "./data/scenarios"
//!
//! [draft]
//! provider = "gemini"          # openai | gemini
//!
//! [prompts]
//! openai_system = "..."
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub storage: Option<StorageConfig>,
  #[serde(default)]
  pub draft: DraftSettings,
}

#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
  #[default]
  Memory,
  Documents,
  Local,
}

impl FromStr for StorageBackend {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "memory" => Ok(Self::Memory),
      "documents" | "document" | "db" => Ok(Self::Documents),
      "local" | "file" => Ok(Self::Local),
      other => Err(format!("unknown storage backend `{other}`")),
    }
  }
}

fn default_storage_path() -> PathBuf {
  PathBuf::from("./data/scenarios")
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
  #[serde(default)]
  pub backend: StorageBackend,
  #[serde(default = "default_storage_path")]
  pub path: PathBuf,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self { backend: StorageBackend::default(), path: default_storage_path() }
  }
}

impl StorageConfig {
  /// File settings (if any), then STORAGE_BACKEND / STORAGE_PATH on top.
  pub fn resolve(from_file: Option<StorageConfig>) -> Self {
    let mut cfg = from_file.unwrap_or_default();
    if let Ok(raw) = std::env::var("STORAGE_BACKEND") {
      match raw.parse() {
        Ok(backend) => cfg.backend = backend,
        Err(e) => warn!(target: "debate_tutor", error = %e, "Ignoring STORAGE_BACKEND"),
      }
    }
    if let Ok(path) = std::env::var("STORAGE_PATH") {
      cfg.path = PathBuf::from(path);
    }
    cfg
  }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DraftProvider {
  #[serde(alias = "open_ai")]
  OpenAi,
  Gemini,
}

impl FromStr for DraftProvider {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "openai" | "open_ai" | "gpt" => Ok(Self::OpenAi),
      "gemini" | "google" => Ok(Self::Gemini),
      other => Err(format!("unknown draft provider `{other}`")),
    }
  }
}

impl DraftProvider {
  pub fn as_str(&self) -> &'static str {
    match self {
      DraftProvider::OpenAi => "openai",
      DraftProvider::Gemini => "gemini",
    }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DraftSettings {
  /// Preferred provider when a request does not name one. DRAFT_PROVIDER overrides.
  #[serde(default)]
  pub provider: Option<DraftProvider>,
}

impl DraftSettings {
  pub fn resolve_provider(&self) -> Option<DraftProvider> {
    match std::env::var("DRAFT_PROVIDER") {
      Ok(raw) => match raw.parse() {
        Ok(p) => Some(p),
        Err(e) => {
          warn!(target: "debate_tutor", error = %e, "Ignoring DRAFT_PROVIDER");
          self.provider
        }
      },
      Err(_) => self.provider,
    }
  }
}

/// Prompts sent to the draft providers. Placeholders: `{topic}`, `{grade_line}`, `{subject_line}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub openai_system: String,
  pub openai_user_template: String,
  pub gemini_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      openai_system: "당신은 초등학교 토론 교육을 위한 전문가입니다. \
        경기초등토론교육모형에 맞는 토론 시나리오를 생성해 주세요. \
        응답은 JSON 형식으로 제공해야 하며, 누락된 필드 없이 모든 요구되는 필드를 포함해야 합니다. \
        특히 background, proArguments, conArguments, teacherTips, expectedOutcomes는 반드시 포함해야 합니다.".into(),
      openai_user_template: "다음 주제에 대한 토론 시나리오를 만들어주세요: \"{topic}\"\n\
        {grade_line}\n{subject_line}\n\n\
        다음 정보를 JSON 형식으로 포함해주세요 (모든 필드는 반드시 포함되어야 합니다):\n\
        1. \"title\": 토론의 명확한 주제\n\
        2. \"topic\": 토론 주장 형식 (예: \"A 해야 한다 vs 하면 안 된다\")\n\
        3. \"keywords\": 주요 키워드 (최대 5개 배열)\n\
        4. \"grade\": 추천 학년 (예: \"5-6학년\")\n\
        5. \"subject\": 관련 교과목 (최대 3개 배열)\n\
        6. \"background\": 토론 배경 설명 (300자 내외)\n\
        7. \"proArguments\": 찬성측 주요 논점 3가지 (배열)\n\
        8. \"conArguments\": 반대측 주요 논점 3가지 (배열)\n\
        9. \"teacherTips\": 교사용 지도 팁 (300자 내외)\n\
        10. \"keyQuestions\": 핵심 질문 5개 (배열)\n\
        11. \"expectedOutcomes\": 기대 학습 성과 4-5개 (배열)\n\
        12. \"materials\": 준비물 목록 (배열)\n\n\
        초등학생 수준에 맞게 이해하기 쉬운 내용으로, 반드시 한국어로 작성해 주세요. \
        학년이나 교과가 없으면 주제에 가장 적합한 학년과 교과를 추천해 주세요.".into(),
      gemini_template: "당신은 초등학교 토론 교육 전문가입니다. 다음 주제에 대한 토론 시나리오를 만들어주세요:\n\n\
        \"{topic}\"\n\n{grade_line}\n{subject_line}\n\n\
        답변은 반드시 JSON 형식으로 다음 구조를 따라야 합니다:\n\
        {\n  \"title\": \"토론 주제의 제목\",\n  \"topic\": \"찬성 vs 반대 형식의 토론 논제\",\n\
          \"background\": \"토론 배경 설명 (200-300자)\",\n  \"keywords\": [\"관련 키워드 5-7개\"],\n\
          \"proArguments\": [\"찬성 측 논거 1\", \"찬성 측 논거 2\", \"찬성 측 논거 3\"],\n\
          \"conArguments\": [\"반대 측 논거 1\", \"반대 측 논거 2\", \"반대 측 논거 3\"],\n\
          \"teacherTips\": \"교사를 위한 지도 팁 (200-300자)\",\n\
          \"keyQuestions\": [\"핵심 질문 1\", \"핵심 질문 2\", \"핵심 질문 3\"],\n\
          \"grade\": \"권장 학년 범위 (예: '5-6학년')\",\n  \"subject\": \"관련 교과목\",\n\
          \"materials\": [\"필요한 준비물 1\", \"필요한 준비물 2\"],\n\
          \"expectedOutcomes\": [\"기대 학습 성과 1\", \"기대 학습 성과 2\", \"기대 학습 성과 3\"]\n}\n\n\
        답변에는 반드시 유효한 JSON만 포함되어야 합니다. 다른 설명이나 서문은 모두 제외해주세요.".into(),
    }
  }
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TutorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "debate_tutor", %path, "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "debate_tutor", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "debate_tutor", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_full_toml() {
    let cfg: TutorConfig = toml::from_str(r#"
      [storage]
      backend = "local"
      path = "/tmp/tutor/scenarios.json"

      [draft]
      provider = "gemini"

      [prompts]
      openai_system = "custom system"
    "#).unwrap();

    assert_eq!(cfg.storage, Some(StorageConfig {
      backend: StorageBackend::Local,
      path: PathBuf::from("/tmp/tutor/scenarios.json"),
    }));
    assert_eq!(cfg.draft.provider, Some(DraftProvider::Gemini));
    assert_eq!(cfg.prompts.openai_system, "custom system");
    // unspecified prompts keep their defaults
    assert!(cfg.prompts.gemini_template.contains("{topic}"));
  }

  #[test]
  fn empty_toml_is_all_defaults() {
    let cfg: TutorConfig = toml::from_str("").unwrap();
    assert!(cfg.storage.is_none());
    assert!(cfg.draft.provider.is_none());
    assert!(cfg.prompts.openai_user_template.contains("{grade_line}"));
  }

  #[test]
  fn backend_and_provider_names() {
    assert_eq!("Documents".parse::<StorageBackend>(), Ok(StorageBackend::Documents));
    assert_eq!("file".parse::<StorageBackend>(), Ok(StorageBackend::Local));
    assert!("mongo".parse::<StorageBackend>().is_err());
    assert_eq!("OpenAI".parse::<DraftProvider>(), Ok(DraftProvider::OpenAi));
    assert_eq!(DraftProvider::Gemini.as_str(), "gemini");
  }
}
