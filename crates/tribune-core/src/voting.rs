//! Best-player voting: window state machine, rejections and tallies.
//!
//! A match's window is `Closed` until an admin opens it, and closes again when
//! the admin turns it off or its deadline passes. There is no background
//! clock: the deadline is evaluated when a vote is cast or results are read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Identity;

// ─── Window ──────────────────────────────────────────────────────────────────

/// The admin-controlled switch plus an optional deadline, as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VotingWindow {
  pub open:     bool,
  pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingState {
  Open,
  Closed,
}

impl VotingWindow {
  pub fn opened(deadline: Option<DateTime<Utc>>) -> Self { Self { open: true, deadline } }

  pub fn closed() -> Self { Self::default() }

  /// Effective state at `now`. A window past its deadline is closed even if
  /// the switch is still on; the deadline instant itself is already closed.
  pub fn state_at(&self, now: DateTime<Utc>) -> VotingState {
    match (self.open, self.deadline) {
      (false, _) => VotingState::Closed,
      (true, Some(deadline)) if now >= deadline => VotingState::Closed,
      (true, _) => VotingState::Open,
    }
  }
}

// ─── Casting ─────────────────────────────────────────────────────────────────

/// Why a vote was not recorded. None of these is a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteRejection {
  /// The window is switched off or past its deadline.
  WindowClosed,
  /// The chosen player is in neither lineup of the match.
  InvalidSelection,
  /// This identity already has a vote for the match.
  AlreadyVoted,
}

impl VoteRejection {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::WindowClosed => "window_closed",
      Self::InvalidSelection => "invalid_selection",
      Self::AlreadyVoted => "already_voted",
    }
  }
}

/// Input to [`crate::League::cast_vote`].
#[derive(Debug, Clone)]
pub struct CastVote {
  pub match_id:     Uuid,
  pub player_id:    Uuid,
  pub identity:     Identity,
  /// Free-text name offered on the anonymous path; ignored for accounts.
  pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastOutcome {
  pub accepted: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reason:   Option<VoteRejection>,
}

impl CastOutcome {
  pub fn accepted() -> Self { Self { accepted: true, reason: None } }

  pub fn rejected(reason: VoteRejection) -> Self { Self { accepted: false, reason: Some(reason) } }
}

/// Display names are trimmed and capped; blank names are dropped.
pub const MAX_DISPLAY_NAME_CHARS: usize = 60;

pub fn clean_display_name(raw: Option<&str>) -> Option<String> {
  let trimmed = raw?.trim();
  if trimmed.is_empty() {
    return None;
  }
  Some(trimmed.chars().take(MAX_DISPLAY_NAME_CHARS).collect())
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A vote row as handed to the store. `cast_at` is set by the caller so the
/// row and the window check share one clock reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVote {
  pub match_id:     Uuid,
  pub player_id:    Uuid,
  pub identity:     Identity,
  pub display_name: Option<String>,
  pub cast_at:      DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
  pub vote_id:      Uuid,
  pub match_id:     Uuid,
  pub player_id:    Uuid,
  pub identity:     Identity,
  pub display_name: Option<String>,
  pub cast_at:      DateTime<Utc>,
}

/// Result of an insert-if-absent against a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted,
  /// A row for the same key already existed; nothing was written.
  Duplicate,
}

// ─── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
  pub player_id:   Uuid,
  pub player_name: String,
  pub votes:       u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResults {
  pub match_id:     Uuid,
  pub state:        VotingState,
  pub deadline:     Option<DateTime<Utc>>,
  /// Descending by votes, then player name in byte order.
  pub tally:        Vec<VoteTally>,
  pub total_votes:  u64,
  /// The player the requesting identity voted for, if any.
  pub voted_for:    Option<Uuid>,
}

/// Sort a tally into its published order.
pub fn order_tally(tally: &mut [VoteTally]) {
  tally.sort_by(|a, b| {
    b.votes
      .cmp(&a.votes)
      .then_with(|| a.player_name.as_bytes().cmp(b.player_name.as_bytes()))
      .then_with(|| a.player_id.cmp(&b.player_id))
  });
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  #[test]
  fn default_window_is_closed() {
    assert_eq!(VotingWindow::default().state_at(Utc::now()), VotingState::Closed);
  }

  #[test]
  fn open_without_deadline_stays_open() {
    let w = VotingWindow::opened(None);
    assert_eq!(w.state_at(Utc::now() + Duration::days(365)), VotingState::Open);
  }

  #[test]
  fn deadline_closes_an_open_window() {
    let now = Utc::now();
    let w = VotingWindow::opened(Some(now));
    assert_eq!(w.state_at(now - Duration::seconds(1)), VotingState::Open);
    assert_eq!(w.state_at(now), VotingState::Closed);
    assert_eq!(w.state_at(now + Duration::minutes(5)), VotingState::Closed);
  }

  #[test]
  fn closed_switch_ignores_future_deadline() {
    let w = VotingWindow { open: false, deadline: Some(Utc::now() + Duration::hours(1)) };
    assert_eq!(w.state_at(Utc::now()), VotingState::Closed);
  }

  #[test]
  fn display_names_are_trimmed_and_capped() {
    assert_eq!(clean_display_name(Some("  Ana  ")).as_deref(), Some("Ana"));
    assert_eq!(clean_display_name(Some("   ")), None);
    assert_eq!(clean_display_name(None), None);
    let long = "x".repeat(200);
    assert_eq!(clean_display_name(Some(&long)).unwrap().chars().count(), MAX_DISPLAY_NAME_CHARS);
  }

  #[test]
  fn tally_orders_by_votes_then_name() {
    let mk = |name: &str, votes| VoteTally { player_id: Uuid::new_v4(), player_name: name.into(), votes };
    let mut t = vec![mk("Cy", 2), mk("Ana", 5), mk("Bo", 2)];
    order_tally(&mut t);
    let names: Vec<&str> = t.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, ["Ana", "Bo", "Cy"]);
  }
}
