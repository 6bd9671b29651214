//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Scenario CRUD with validation (create scales the base template)
//!   - Filtered listing
//!   - Template previews
//!   - AI draft generation with suggested duration and group count

use chrono::Utc;
use rand::{seq::SliceRandom, Rng};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Scenario, ScenarioInput, ScenarioPatch, Stages};
use crate::draft::DraftRequest;
use crate::error::AppError;
use crate::protocol::{DraftIn, DraftOut, ListQuery, ResourceSummary, ScaledTemplateOut, TemplateOut, TopicsOut};
use crate::scaler::scale_template_with_report;
use crate::state::AppState;
use crate::template::{find_resource, Resource, GRADE_OPTIONS, RESOURCES, SAMPLE_TOPICS, SUBJECT_OPTIONS};
use crate::util::non_blank;

pub const MIN_TOTAL_MINUTES: u32 = 10;
/// Upper bound of the lesson length a teacher can plan.
pub const MAX_TOTAL_MINUTES: u32 = 300;

fn validate_title(title: &str) -> Result<String, AppError> {
  let t = title.trim();
  if t.is_empty() {
    return Err(AppError::Validation("시나리오 제목을 입력해 주세요.".into()));
  }
  Ok(t.to_string())
}

fn validate_total(total: u32) -> Result<u32, AppError> {
  if total < MIN_TOTAL_MINUTES {
    return Err(AppError::Validation(format!("토론 시간은 최소 {MIN_TOTAL_MINUTES}분 이상이어야 합니다.")));
  }
  if total > MAX_TOTAL_MINUTES {
    return Err(AppError::Validation(format!("토론 시간은 최대 {MAX_TOTAL_MINUTES}분까지 설정할 수 있습니다.")));
  }
  Ok(total)
}

fn validate_stages(stages: &Stages) -> Result<(), AppError> {
  for stage in stages.iter() {
    if stage.activities.is_empty() {
      return Err(AppError::Validation(format!("단계 `{}`에 활동이 없습니다.", stage.id)));
    }
    if let Some(a) = stage.activities.iter().find(|a| a.duration_minutes == 0) {
      return Err(AppError::Validation(format!("활동 `{}`의 시간은 1분 이상이어야 합니다.", a.id)));
    }
  }
  Ok(())
}

#[instrument(level = "info", skip(state, input), fields(total = input.total_duration_minutes))]
pub async fn create_scenario(state: &AppState, input: ScenarioInput) -> Result<Scenario, AppError> {
  let title = validate_title(&input.title)?;
  let total = validate_total(input.total_duration_minutes)?;
  let (stages, report) = scale_template_with_report(&state.template, total)?;

  let now = Utc::now();
  let scenario = Scenario {
    id: Uuid::new_v4().to_string(),
    title,
    topic: non_blank(input.topic.as_deref()),
    grade: non_blank(input.grade.as_deref()),
    subject: non_blank(input.subject.as_deref()),
    keywords: input.keywords,
    total_duration_minutes: total,
    group_count: input.group_count,
    created_at: now,
    updated_at: now,
    stages,
    ai_generated: input.ai_generated,
    scenario_details: input.scenario_details,
  };

  let stored = state.store.create(scenario).await?;
  info!(
    target: "scenario",
    id = %stored.id,
    total,
    scaled = report.scaled_minutes,
    drift = report.drift(),
    within_bound = report.within_bound(),
    ai_generated = stored.ai_generated,
    "Scenario created"
  );
  Ok(stored)
}

/// Apply a partial edit. Stages are taken as given and never rescaled.
#[instrument(level = "info", skip(state, patch), fields(%id))]
pub async fn update_scenario(state: &AppState, id: &str, mut patch: ScenarioPatch) -> Result<Scenario, AppError> {
  if let Some(title) = &patch.title {
    patch.title = Some(validate_title(title)?);
  }
  if let Some(total) = patch.total_duration_minutes {
    validate_total(total)?;
  }
  if let Some(stages) = &patch.stages {
    validate_stages(stages)?;
  }

  let updated = state.store
    .update(id, patch)
    .await?
    .ok_or_else(|| AppError::NotFound(id.to_string()))?;
  info!(target: "scenario", id = %updated.id, "Scenario updated");
  Ok(updated)
}

#[instrument(level = "debug", skip(state), fields(%id))]
pub async fn get_scenario(state: &AppState, id: &str) -> Result<Scenario, AppError> {
  state.store
    .get_by_id(id)
    .await?
    .ok_or_else(|| AppError::NotFound(id.to_string()))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn delete_scenario(state: &AppState, id: &str) -> Result<(), AppError> {
  if !state.store.delete(id).await? {
    return Err(AppError::NotFound(id.to_string()));
  }
  info!(target: "scenario", %id, "Scenario deleted");
  Ok(())
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
  haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

fn matches_filter(s: &Scenario, search: Option<&str>, grade: Option<&str>, subject: Option<&str>) -> bool {
  if let Some(q) = search {
    let background = s.scenario_details.as_ref().and_then(|d| d.background.as_deref());
    let hit = contains_ci(Some(s.title.as_str()), q) || contains_ci(s.topic.as_deref(), q) || contains_ci(background, q);
    if !hit {
      return false;
    }
  }
  if let Some(g) = grade {
    if !contains_ci(s.grade.as_deref(), g) {
      return false;
    }
  }
  if let Some(sub) = subject {
    if !contains_ci(s.subject.as_deref(), sub) {
      return false;
    }
  }
  true
}

/// All scenarios matching the filter, most recently created first.
#[instrument(level = "debug", skip(state))]
pub async fn list_scenarios(state: &AppState, filter: &ListQuery) -> Result<Vec<Scenario>, AppError> {
  let lower = |v: &Option<String>| non_blank(v.as_deref()).map(|s| s.to_lowercase());
  let (search, grade, subject) = (lower(&filter.search), lower(&filter.grade), lower(&filter.subject));

  let all = state.store.list_all().await?;
  let total = all.len();
  let out: Vec<Scenario> = all
    .into_iter()
    .filter(|s| matches_filter(s, search.as_deref(), grade.as_deref(), subject.as_deref()))
    .collect();
  info!(target: "scenario", total, matched = out.len(), "Scenarios listed");
  Ok(out)
}

pub fn base_template(state: &AppState) -> TemplateOut {
  TemplateOut {
    total_minutes: state.template.total_minutes(),
    activity_count: state.template.activity_count(),
    stages: state.template.clone(),
  }
}

/// Scaled copy of the base template; nothing is stored.
#[instrument(level = "debug", skip(state))]
pub fn preview_template(state: &AppState, total_minutes: u32) -> Result<ScaledTemplateOut, AppError> {
  let total = validate_total(total_minutes)?;
  let (stages, report) = scale_template_with_report(&state.template, total)?;
  Ok(ScaledTemplateOut {
    target_minutes: report.target_minutes,
    total_minutes: report.scaled_minutes,
    drift_minutes: report.drift(),
    max_drift_minutes: report.max_drift(),
    stages,
  })
}

pub fn topics() -> TopicsOut {
  TopicsOut {
    topics: SAMPLE_TOPICS.to_vec(),
    grades: GRADE_OPTIONS.to_vec(),
    subjects: SUBJECT_OPTIONS.to_vec(),
  }
}

pub fn resources() -> Vec<ResourceSummary> {
  RESOURCES
    .iter()
    .map(|r| ResourceSummary { id: r.id, title: r.title, description: r.description })
    .collect()
}

pub fn resource(id: &str) -> Result<&'static Resource, AppError> {
  find_resource(id).ok_or_else(|| AppError::ResourceNotFound(id.to_string()))
}

/// Given topic, or a random sample one.
pub fn pick_topic<R: Rng>(rng: &mut R, topic: Option<&str>) -> String {
  non_blank(topic)
    .or_else(|| SAMPLE_TOPICS.choose(rng).map(|t| t.to_string()))
    .unwrap_or_default()
}

/// Suggested (duration minutes, group count) for a fresh draft.
pub fn suggest_setup<R: Rng>(rng: &mut R) -> (u32, u32) {
  (rng.gen_range(60..=120), rng.gen_range(2..=6))
}

#[instrument(level = "info", skip(state, req), fields(provider = ?req.provider, has_topic = req.topic.is_some()))]
pub async fn generate_draft(state: &AppState, req: DraftIn) -> Result<DraftOut, AppError> {
  let generator = state.drafters.pick(req.provider)?;

  // ThreadRng is !Send; keep it out of the await below.
  let (topic, (duration, groups)) = {
    let mut rng = rand::thread_rng();
    (pick_topic(&mut rng, req.topic.as_deref()), suggest_setup(&mut rng))
  };

  let request = DraftRequest {
    topic,
    grade: non_blank(req.grade.as_deref()),
    subject: non_blank(req.subject.as_deref()),
  };
  let draft = match generator.generate(&state.prompts, &request).await {
    Ok(d) => d,
    Err(e) => {
      warn!(target: "scenario", provider = generator.provider().as_str(), error = %e, "Draft generation failed");
      return Err(e.into());
    }
  };
  info!(target: "scenario", provider = generator.provider().as_str(), title = %draft.title, "Draft generated");

  Ok(DraftOut {
    provider: generator.provider(),
    scenario_details: draft.details(),
    draft,
    suggested_duration_minutes: duration,
    suggested_group_count: groups,
  })
}
