//! Per-activity countdown used by live sessions.
//!
//! The countdown does not own a clock: the session loop calls `tick` once per
//! elapsed second while it is running. Expiry is reported once, after which the
//! countdown stays paused at zero until reset or reseeded.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
  Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
  pub remaining_seconds: u32,
  pub total_seconds: u32,
  pub running: bool,
  pub display: String,
  /// Under 30 seconds left; the UI highlights the clock.
  pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
  total: u32,
  remaining: u32,
  running: bool,
}

impl Countdown {
  pub fn from_minutes(minutes: u32) -> Self {
    let total = minutes.saturating_mul(60);
    Self { total, remaining: total, running: false }
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  pub fn start(&mut self) {
    if self.remaining > 0 {
      self.running = true;
    }
  }

  pub fn pause(&mut self) {
    self.running = false;
  }

  pub fn toggle(&mut self) {
    if self.running { self.pause() } else { self.start() }
  }

  pub fn reset(&mut self) {
    self.remaining = self.total;
    self.running = false;
  }

  /// Seed for a different activity; always paused.
  pub fn reseed(&mut self, minutes: u32) {
    *self = Self::from_minutes(minutes);
  }

  pub fn tick(&mut self, seconds: u32) -> Option<TimerEvent> {
    if !self.running {
      return None;
    }
    self.remaining = self.remaining.saturating_sub(seconds);
    if self.remaining == 0 {
      self.running = false;
      return Some(TimerEvent::Expired);
    }
    None
  }

  pub fn display(&self) -> String {
    format_mm_ss(self.remaining)
  }

  pub fn snapshot(&self) -> TimerSnapshot {
    TimerSnapshot {
      remaining_seconds: self.remaining,
      total_seconds: self.total,
      running: self.running,
      display: self.display(),
      warning: self.remaining < 30,
    }
  }
}

pub fn format_mm_ss(seconds: u32) -> String {
  format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seeded_from_minutes_and_paused() {
    let c = Countdown::from_minutes(8);
    assert_eq!(c.remaining, 480);
    assert!(!c.is_running());
    assert_eq!(c.display(), "08:00");
  }

  #[test]
  fn ticks_only_while_running() {
    let mut c = Countdown::from_minutes(1);
    assert_eq!(c.tick(10), None);
    assert_eq!(c.remaining, 60);
    c.toggle();
    assert_eq!(c.tick(15), None);
    assert_eq!(c.display(), "00:45");
    c.toggle();
    assert_eq!(c.tick(15), None);
    assert_eq!(c.remaining, 45);
  }

  #[test]
  fn expires_exactly_once() {
    let mut c = Countdown::from_minutes(1);
    c.start();
    let events: Vec<_> = (0..90).filter_map(|_| c.tick(1)).collect();
    assert_eq!(events, vec![TimerEvent::Expired]);
    assert_eq!(c.remaining, 0);
    assert!(!c.is_running());
    // cannot restart at zero without a reset
    c.start();
    assert!(!c.is_running());
  }

  #[test]
  fn reset_restores_seed() {
    let mut c = Countdown::from_minutes(2);
    c.start();
    c.tick(100);
    c.reset();
    assert_eq!(c.remaining, 120);
    assert!(!c.is_running());
    c.reseed(3);
    assert_eq!(c.snapshot().total_seconds, 180);
  }

  #[test]
  fn snapshot_warns_under_thirty_seconds() {
    let mut c = Countdown::from_minutes(1);
    c.start();
    c.tick(30);
    assert!(!c.snapshot().warning);
    c.tick(1);
    assert!(c.snapshot().warning);
    assert_eq!(format_mm_ss(605), "10:05");
  }
}
