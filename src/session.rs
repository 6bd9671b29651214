//! One live classroom session: a walker over the scenario's stages plus the
//! countdown for the current activity.
//!
//! Every operation returns the server messages it produces, so the socket loop
//! only has to send them. The countdown is reseeded whenever the cursor moves and
//! never advances the walker on its own.

use crate::domain::Scenario;
use crate::protocol::{ServerWsMessage, StageOut};
use crate::timer::{Countdown, TimerEvent};
use crate::walker::{Advance, SessionWalker, WalkError};

#[derive(Debug)]
pub struct Session {
  scenario_id: String,
  walker: SessionWalker,
  timer: Countdown,
}

impl Session {
  /// Fails when the scenario's first stage has no activities.
  pub fn open(scenario: &Scenario) -> Result<Self, WalkError> {
    let walker = SessionWalker::from_stages(&scenario.stages);
    let minutes = walker.current()?.1.duration_minutes;
    Ok(Self { scenario_id: scenario.id.clone(), walker, timer: Countdown::from_minutes(minutes) })
  }

  pub fn scenario_id(&self) -> &str {
    &self.scenario_id
  }

  pub fn timer_running(&self) -> bool {
    self.timer.is_running()
  }

  fn reseed(&mut self) {
    let minutes = self.walker.current().map(|(_, a)| a.duration_minutes).unwrap_or(0);
    self.timer.reseed(minutes);
  }

  /// Current stage, activity, progress and timer.
  pub fn activity(&self) -> ServerWsMessage {
    match self.walker.current() {
      Ok((stage, activity)) => ServerWsMessage::Activity {
        scenario_id: self.scenario_id.clone(),
        stage: StageOut { id: stage.id.clone(), title: stage.title.clone() },
        activity: activity.clone(),
        progress: self.walker.progress(),
        timer: self.timer.snapshot(),
      },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    }
  }

  pub fn next(&mut self) -> Vec<ServerWsMessage> {
    match self.walker.advance() {
      Advance::Moved(_) => {
        self.reseed();
        vec![self.activity()]
      }
      Advance::Complete => {
        self.timer.pause();
        vec![ServerWsMessage::SessionComplete { scenario_id: self.scenario_id.clone() }]
      }
    }
  }

  /// At the first activity this just repeats the current state.
  pub fn previous(&mut self) -> Vec<ServerWsMessage> {
    if self.walker.retreat() {
      self.reseed();
    }
    vec![self.activity()]
  }

  pub fn toggle_timer(&mut self) -> Vec<ServerWsMessage> {
    self.timer.toggle();
    vec![ServerWsMessage::Timer { timer: self.timer.snapshot() }]
  }

  pub fn reset_timer(&mut self) -> Vec<ServerWsMessage> {
    self.timer.reset();
    vec![ServerWsMessage::Timer { timer: self.timer.snapshot() }]
  }

  /// One elapsed second.
  pub fn tick(&mut self) -> Vec<ServerWsMessage> {
    let event = self.timer.tick(1);
    let mut out = vec![ServerWsMessage::Timer { timer: self.timer.snapshot() }];
    if event == Some(TimerEvent::Expired) {
      let activity_id = self.walker.current().map(|(_, a)| a.id.clone()).unwrap_or_default();
      out.push(ServerWsMessage::TimerExpired { activity_id });
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Activity, StageSection, Stages};
  use crate::store::test_support::{at, scenario};

  fn kinds(msgs: &[ServerWsMessage]) -> Vec<String> {
    msgs.iter()
      .map(|m| serde_json::to_value(m).unwrap()["type"].as_str().unwrap_or_default().to_string())
      .collect()
  }

  fn tiny() -> Scenario {
    let act = |id: &str, min: u32| Activity {
      id: id.into(),
      title: id.into(),
      duration_minutes: min,
      description: String::new(),
      teacher_prompts: vec![],
    };
    let stage = |id: &str, acts: Vec<Activity>| StageSection { id: id.into(), title: id.into(), activities: acts };
    let mut s = scenario("tiny", at(0));
    s.stages = Stages {
      stage1: stage("s1", vec![act("a", 1), act("b", 2)]),
      stage2: stage("s2", vec![act("c", 3)]),
      stage3: stage("s3", vec![act("d", 1)]),
    };
    s
  }

  #[test]
  fn opens_on_first_activity_with_paused_timer() {
    let s = Session::open(&tiny()).unwrap();
    let v = serde_json::to_value(s.activity()).unwrap();
    assert_eq!(v["type"], "activity");
    assert_eq!(v["scenarioId"], "tiny");
    assert_eq!(v["activity"]["id"], "a");
    assert_eq!(v["progress"]["isFirst"], true);
    assert_eq!(v["timer"]["remainingSeconds"], 60);
    assert_eq!(v["timer"]["running"], false);
  }

  #[test]
  fn empty_first_stage_cannot_open() {
    let mut sc = tiny();
    sc.stages.stage1.activities.clear();
    assert!(Session::open(&sc).is_err());
  }

  #[test]
  fn moving_reseeds_timer() {
    let mut s = Session::open(&tiny()).unwrap();
    s.toggle_timer();
    s.tick();
    let v = serde_json::to_value(&s.next()[0]).unwrap();
    assert_eq!(v["activity"]["id"], "b");
    assert_eq!(v["timer"]["remainingSeconds"], 120);
    assert_eq!(v["timer"]["running"], false);

    let v = serde_json::to_value(&s.next()[0]).unwrap();
    assert_eq!(v["stage"]["id"], "s2");
    assert_eq!(v["timer"]["remainingSeconds"], 180);

    let v = serde_json::to_value(&s.previous()[0]).unwrap();
    assert_eq!(v["activity"]["id"], "b");
    assert_eq!(v["timer"]["remainingSeconds"], 120);
  }

  #[test]
  fn previous_at_start_repeats_current() {
    let mut s = Session::open(&tiny()).unwrap();
    let v = serde_json::to_value(&s.previous()[0]).unwrap();
    assert_eq!(v["activity"]["id"], "a");
  }

  #[test]
  fn walking_off_the_end_completes_and_stays() {
    let mut s = Session::open(&tiny()).unwrap();
    for _ in 0..3 {
      assert_eq!(kinds(&s.next()), vec!["activity"]);
    }
    assert_eq!(kinds(&s.next()), vec!["session_complete"]);
    assert_eq!(kinds(&s.next()), vec!["session_complete"]);
    let v = serde_json::to_value(s.activity()).unwrap();
    assert_eq!(v["activity"]["id"], "d");
    assert_eq!(v["progress"]["isLast"], true);
  }

  #[test]
  fn expiry_is_reported_once_without_advancing() {
    let mut s = Session::open(&tiny()).unwrap();
    s.toggle_timer();
    let mut expired = 0;
    for _ in 0..75 {
      let msgs = s.tick();
      expired += kinds(&msgs).iter().filter(|k| *k == "timer_expired").count();
    }
    assert_eq!(expired, 1);
    assert!(!s.timer_running());
    let v = serde_json::to_value(s.activity()).unwrap();
    assert_eq!(v["activity"]["id"], "a");

    let v = serde_json::to_value(&s.reset_timer()[0]).unwrap();
    assert_eq!(v["timer"]["remainingSeconds"], 60);
  }
}
