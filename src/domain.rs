//! Domain models: activities, the three fixed stages, scenarios and their edit payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timed classroom task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id: String,
  pub title: String,
  pub duration_minutes: u32,
  #[serde(default)] pub description: String,
  #[serde(default)] pub teacher_prompts: Vec<String>,
}

/// An ordered, named group of activities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSection {
  pub id: String,
  pub title: String,
  #[serde(default)] pub activities: Vec<Activity>,
}

impl StageSection {
  pub fn total_minutes(&self) -> u32 {
    self.activities.iter().map(|a| a.duration_minutes).sum()
  }
}

/// Identity of one of the three pedagogical stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKey {
  /// 다름과 마주하기
  Stage1,
  /// 다름을 이해하기
  Stage2,
  /// 다름과 공존하기
  Stage3,
}

impl StageKey {
  pub const ALL: [StageKey; 3] = [StageKey::Stage1, StageKey::Stage2, StageKey::Stage3];
}

/// The closed set of three stages, in fixed order.
///
/// Scaler and walker only ever see the ordered sequence (`iter` / `to_vec`),
/// so nothing downstream depends on there being exactly three.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stages {
  pub stage1: StageSection,
  pub stage2: StageSection,
  pub stage3: StageSection,
}

impl Stages {
  pub fn get(&self, key: StageKey) -> &StageSection {
    match key {
      StageKey::Stage1 => &self.stage1,
      StageKey::Stage2 => &self.stage2,
      StageKey::Stage3 => &self.stage3,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &StageSection> {
    StageKey::ALL.into_iter().map(move |k| self.get(k))
  }

  pub fn to_vec(&self) -> Vec<StageSection> {
    self.iter().cloned().collect()
  }

  /// Rebuild from an ordered sequence. Returns None unless there are exactly three stages.
  pub fn from_vec(stages: Vec<StageSection>) -> Option<Self> {
    let [stage1, stage2, stage3]: [StageSection; 3] = stages.try_into().ok()?;
    Some(Self { stage1, stage2, stage3 })
  }

  pub fn activity_count(&self) -> usize {
    self.iter().map(|s| s.activities.len()).sum()
  }

  pub fn total_minutes(&self) -> u32 {
    self.iter().map(StageSection::total_minutes).sum()
  }
}

/// Supplementary lesson material, usually sourced from an AI draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDetails {
  #[serde(default, skip_serializing_if = "Option::is_none")] pub background: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub pro_arguments: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub con_arguments: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub teacher_tips: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub key_questions: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub materials: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub expected_outcomes: Option<Vec<String>>,
}

/// A persisted debate lesson plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
  pub id: String,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub topic: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub grade: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub subject: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub keywords: Option<Vec<String>>,
  pub total_duration_minutes: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub group_count: Option<u32>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub stages: Stages,
  #[serde(default)] pub ai_generated: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub scenario_details: Option<ScenarioDetails>,
}

impl Scenario {
  /// Overwrite every field the patch carries and bump `updated_at`.
  /// `id` and `created_at` are never touched.
  pub fn apply(&mut self, patch: ScenarioPatch, now: DateTime<Utc>) {
    let ScenarioPatch {
      title, topic, grade, subject, keywords, total_duration_minutes,
      group_count, stages, ai_generated, scenario_details,
    } = patch;

    if let Some(v) = title { self.title = v; }
    if let Some(v) = topic { self.topic = Some(v); }
    if let Some(v) = grade { self.grade = Some(v); }
    if let Some(v) = subject { self.subject = Some(v); }
    if let Some(v) = keywords { self.keywords = Some(v); }
    if let Some(v) = total_duration_minutes { self.total_duration_minutes = v; }
    if let Some(v) = group_count { self.group_count = Some(v); }
    if let Some(v) = stages { self.stages = v; }
    if let Some(v) = ai_generated { self.ai_generated = v; }
    if let Some(v) = scenario_details { self.scenario_details = Some(v); }
    self.updated_at = now;
  }
}

/// Create-form payload. Stages are never supplied by the client; they come from the scaler.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
  pub title: String,
  pub total_duration_minutes: u32,
  #[serde(default)] pub group_count: Option<u32>,
  #[serde(default)] pub topic: Option<String>,
  #[serde(default)] pub grade: Option<String>,
  #[serde(default)] pub subject: Option<String>,
  #[serde(default)] pub keywords: Option<Vec<String>>,
  #[serde(default)] pub ai_generated: bool,
  #[serde(default)] pub scenario_details: Option<ScenarioDetails>,
}

/// Edit payload: every provided field overwrites the stored one.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPatch {
  #[serde(default)] pub title: Option<String>,
  #[serde(default)] pub topic: Option<String>,
  #[serde(default)] pub grade: Option<String>,
  #[serde(default)] pub subject: Option<String>,
  #[serde(default)] pub keywords: Option<Vec<String>>,
  #[serde(default)] pub total_duration_minutes: Option<u32>,
  #[serde(default)] pub group_count: Option<u32>,
  #[serde(default)] pub stages: Option<Stages>,
  #[serde(default)] pub ai_generated: Option<bool>,
  #[serde(default)] pub scenario_details: Option<ScenarioDetails>,
}
