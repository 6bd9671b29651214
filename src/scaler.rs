//! Time-proportional scaling of a stage template to a teacher-chosen total.
//!
//! Every activity is scaled independently: `round(base * target / base_total)`,
//! rounding half away from zero (`f64::round`), then clamped to at least one minute.
//! The scaled sum is therefore only approximately the target. It drifts by at most
//! half a minute per activity plus whatever the clamp added, and is never rebalanced.

use thiserror::Error;

use crate::domain::{StageSection, Stages};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleError {
  #[error("invalid template: {0}")]
  InvalidTemplate(String),
  #[error("invalid target total: {0} minutes (must be positive)")]
  InvalidTarget(u32),
}

/// How far a scaled template landed from its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleReport {
  pub target_minutes: u32,
  pub scaled_minutes: u32,
  pub activities: usize,
  /// Minutes added by the one-minute floor.
  pub clamped_minutes: u32,
}

impl ScaleReport {
  pub fn drift(&self) -> i64 {
    i64::from(self.scaled_minutes) - i64::from(self.target_minutes)
  }

  pub fn max_drift(&self) -> f64 {
    self.activities as f64 * 0.5 + f64::from(self.clamped_minutes)
  }

  pub fn within_bound(&self) -> bool {
    (self.drift().abs() as f64) <= self.max_drift()
  }
}

fn validate(stages: &[StageSection]) -> Result<u32, ScaleError> {
  if stages.is_empty() {
    return Err(ScaleError::InvalidTemplate("template has no stages".into()));
  }
  if let Some(empty) = stages.iter().find(|s| s.activities.is_empty()) {
    return Err(ScaleError::InvalidTemplate(format!("stage `{}` has no activities", empty.id)));
  }
  let base_total: u32 = stages.iter().map(StageSection::total_minutes).sum();
  if base_total == 0 {
    return Err(ScaleError::InvalidTemplate("base total duration is zero".into()));
  }
  Ok(base_total)
}

/// Scale an ordered stage sequence and report the resulting drift.
pub fn scale_stages_with_report(
  stages: &[StageSection],
  target_total_minutes: u32,
) -> Result<(Vec<StageSection>, ScaleReport), ScaleError> {
  if target_total_minutes == 0 {
    return Err(ScaleError::InvalidTarget(target_total_minutes));
  }
  let base_total = validate(stages)?;
  let ratio = f64::from(target_total_minutes) / f64::from(base_total);

  let mut scaled = stages.to_vec();
  let mut report = ScaleReport {
    target_minutes: target_total_minutes,
    scaled_minutes: 0,
    activities: 0,
    clamped_minutes: 0,
  };

  for activity in scaled.iter_mut().flat_map(|s| s.activities.iter_mut()) {
    let rounded = (f64::from(activity.duration_minutes) * ratio).round() as u32;
    let minutes = rounded.max(1);
    report.clamped_minutes += minutes - rounded;
    report.scaled_minutes += minutes;
    report.activities += 1;
    activity.duration_minutes = minutes;
  }

  Ok((scaled, report))
}

/// Scale the fixed three-stage template. The input is left untouched.
pub fn scale_template_with_report(
  template: &Stages,
  target_total_minutes: u32,
) -> Result<(Stages, ScaleReport), ScaleError> {
  let (scaled, report) = scale_stages_with_report(&template.to_vec(), target_total_minutes)?;
  let stages = Stages::from_vec(scaled)
    .ok_or_else(|| ScaleError::InvalidTemplate("expected exactly three stages".into()))?;
  Ok((stages, report))
}
