//! Session navigation over a scaled template.
//!
//! The walker is a cursor `(stage, activity)` over an ordered list of stages.
//! `advance` and `retreat` are total: they never fail, and at the edges they
//! either stay put (retreat at the start) or report completion (advance at the end).
//! Only `current` can fail, and only for a template with an empty stage.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Activity, StageSection, Stages};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
  #[error("cursor ({stage}, {activity}) is out of range for this template")]
  OutOfRange { stage: usize, activity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
  pub stage_index: usize,
  pub activity_index: usize,
}

/// Outcome of `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
  Moved(Cursor),
  /// Already on the last activity of the last stage; the cursor did not move.
  Complete,
}

/// One-based position summary, e.g. "stage 1/3, activity 2/4".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
  pub stage: usize,
  pub stage_count: usize,
  pub activity: usize,
  pub activity_count: usize,
  pub is_first: bool,
  pub is_last: bool,
}

#[derive(Debug, Clone)]
pub struct SessionWalker {
  stages: Vec<StageSection>,
  cursor: Cursor,
}

impl SessionWalker {
  pub fn new(stages: Vec<StageSection>) -> Self {
    Self { stages, cursor: Cursor::default() }
  }

  pub fn from_stages(stages: &Stages) -> Self {
    Self::new(stages.to_vec())
  }

  pub fn cursor(&self) -> Cursor {
    self.cursor
  }

  pub fn stage_count(&self) -> usize {
    self.stages.len()
  }

  /// Number of activities in the current stage.
  pub fn activity_count(&self) -> usize {
    self.stages.get(self.cursor.stage_index).map_or(0, |s| s.activities.len())
  }

  pub fn is_first(&self) -> bool {
    self.cursor == Cursor::default()
  }

  pub fn is_last(&self) -> bool {
    self.cursor.stage_index + 1 >= self.stage_count() && self.at_stage_end()
  }

  fn at_stage_end(&self) -> bool {
    self.cursor.activity_index + 1 >= self.activity_count()
  }

  fn last_index_of(&self, stage_index: usize) -> usize {
    self.stages
      .get(stage_index)
      .map_or(0, |s| s.activities.len().saturating_sub(1))
  }

  pub fn current(&self) -> Result<(&StageSection, &Activity), WalkError> {
    let Cursor { stage_index, activity_index } = self.cursor;
    let out_of_range = WalkError::OutOfRange { stage: stage_index, activity: activity_index };
    let stage = self.stages.get(stage_index).ok_or(out_of_range.clone())?;
    let activity = stage.activities.get(activity_index).ok_or(out_of_range)?;
    Ok((stage, activity))
  }

  pub fn advance(&mut self) -> Advance {
    if !self.at_stage_end() {
      self.cursor.activity_index += 1;
    } else if self.cursor.stage_index + 1 < self.stage_count() {
      self.cursor.stage_index += 1;
      self.cursor.activity_index = 0;
    } else {
      return Advance::Complete;
    }
    Advance::Moved(self.cursor)
  }

  /// Step back one activity. Returns false when already at the first activity.
  pub fn retreat(&mut self) -> bool {
    if self.cursor.activity_index > 0 {
      self.cursor.activity_index -= 1;
    } else if self.cursor.stage_index > 0 {
      self.cursor.stage_index -= 1;
      self.cursor.activity_index = self.last_index_of(self.cursor.stage_index);
    } else {
      return false;
    }
    true
  }

  pub fn progress(&self) -> Progress {
    Progress {
      stage: self.cursor.stage_index + 1,
      stage_count: self.stage_count(),
      activity: self.cursor.activity_index + 1,
      activity_count: self.activity_count(),
      is_first: self.is_first(),
      is_last: self.is_last(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scaler::tests::scale_template;
  use crate::template::default_stage_template;

  fn stage(id: &str, n: usize) -> StageSection {
    StageSection {
      id: id.into(),
      title: id.into(),
      activities: (0..n)
        .map(|i| Activity {
          id: format!("{id}-{i}"),
          title: format!("{id} #{i}"),
          duration_minutes: 5,
          description: String::new(),
          teacher_prompts: vec![],
        })
        .collect(),
    }
  }

  fn at(stage_index: usize, activity_index: usize) -> Cursor {
    Cursor { stage_index, activity_index }
  }

  #[test]
  fn advance_visits_every_activity_once_in_order() {
    let template = default_stage_template();
    let mut walker = SessionWalker::from_stages(&template);

    let expected: Vec<String> = template
      .iter()
      .flat_map(|s| s.activities.iter().map(|a| a.id.clone()))
      .collect();

    let mut visited = vec![walker.current().unwrap().1.id.clone()];
    while let Advance::Moved(_) = walker.advance() {
      visited.push(walker.current().unwrap().1.id.clone());
    }
    assert_eq!(visited, expected);
    assert_eq!(walker.cursor(), at(2, 1));
  }

  #[test]
  fn advance_at_end_is_idempotent() {
    let mut walker = SessionWalker::new(vec![stage("a", 1), stage("b", 2)]);
    while walker.advance() != Advance::Complete {}
    let end = walker.cursor();
    for _ in 0..3 {
      assert_eq!(walker.advance(), Advance::Complete);
      assert_eq!(walker.cursor(), end);
    }
    assert!(walker.is_last());
  }

  #[test]
  fn retreat_at_start_is_noop() {
    let mut walker = SessionWalker::new(vec![stage("a", 2)]);
    assert!(!walker.retreat());
    assert!(!walker.retreat());
    assert_eq!(walker.cursor(), at(0, 0));
    assert!(walker.is_first());
  }

  #[test]
  fn retreat_crosses_stage_boundary_to_last_activity() {
    let mut walker = SessionWalker::new(vec![stage("a", 3), stage("b", 2)]);
    for _ in 0..3 {
      walker.advance();
    }
    assert_eq!(walker.cursor(), at(1, 0));
    assert!(walker.retreat());
    assert_eq!(walker.cursor(), at(0, 2));
  }

  #[test]
  fn advance_then_retreat_round_trips() {
    let mut walker = SessionWalker::from_stages(&default_stage_template());
    loop {
      let before = walker.cursor();
      match walker.advance() {
        Advance::Moved(_) => {
          let after = walker.cursor();
          assert!(walker.retreat());
          assert_eq!(walker.cursor(), before);
          walker.advance();
          assert_eq!(walker.cursor(), after);
        }
        Advance::Complete => {
          assert_eq!(walker.cursor(), before);
          break;
        }
      }
    }
  }

  #[test]
  fn single_activity_completes_immediately() {
    let mut walker = SessionWalker::new(vec![stage("only", 1)]);
    assert!(walker.is_first() && walker.is_last());
    assert_eq!(walker.advance(), Advance::Complete);
    assert_eq!(walker.current().unwrap().1.id, "only-0");
  }

  #[test]
  fn current_fails_on_malformed_templates() {
    let walker = SessionWalker::new(vec![]);
    assert_eq!(walker.current().unwrap_err(), WalkError::OutOfRange { stage: 0, activity: 0 });

    let mut walker = SessionWalker::new(vec![stage("a", 1), stage("empty", 0)]);
    assert!(walker.current().is_ok());
    assert!(matches!(walker.advance(), Advance::Moved(_)));
    assert!(walker.current().is_err());
    // still total: no panic, and the end is reached
    assert_eq!(walker.advance(), Advance::Complete);
    assert!(walker.retreat());
    assert_eq!(walker.cursor(), at(0, 0));
  }

  #[test]
  fn progress_is_one_based() {
    let scaled = scale_template(&default_stage_template(), 90).unwrap();
    let mut walker = SessionWalker::from_stages(&scaled);
    walker.advance();
    let p = walker.progress();
    assert_eq!((p.stage, p.stage_count, p.activity, p.activity_count), (1, 3, 2, 4));
    assert!(!p.is_first && !p.is_last);
    assert_eq!(walker.current().unwrap().1.duration_minutes, 8);
  }
}
