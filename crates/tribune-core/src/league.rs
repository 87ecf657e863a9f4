//! League entities as seen by the derivation core.
//!
//! Championships, teams, players and matches are owned by the surrounding
//! CRUD system. The core reads them through [`crate::store::ResultStore`] and
//! never mutates them, except for the voting window on a match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::voting::VotingWindow;

// ─── Reference entities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Championship {
  pub championship_id: Uuid,
  pub name:            String,
  pub season:          Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
  pub team_id:         Uuid,
  pub championship_id: Uuid,
  pub name:            String,
  /// Group inside the championship (e.g. "A"), if the format uses groups.
  pub group_name:      Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
  pub player_id: Uuid,
  pub name:      String,
  /// The team the player is currently registered with. Historic events keep
  /// their own team attribution.
  pub team_id:   Option<Uuid>,
}

// ─── Match lifecycle ─────────────────────────────────────────────────────────

/// Lifecycle of a match. `Finished` is the only state that feeds standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
  Scheduled,
  InProgress,
  Finished,
  Postponed,
  Cancelled,
  WalkOver,
}

impl MatchStatus {
  /// Whether the owning workflow may move a match from `self` to `next`.
  ///
  /// A postponed match can be rescheduled; every other terminal state is
  /// final.
  pub fn can_transition_to(self, next: MatchStatus) -> bool {
    use MatchStatus::*;
    matches!(
      (self, next),
      (Scheduled, InProgress)
        | (InProgress, Finished)
        | (Scheduled | InProgress, Postponed | Cancelled | WalkOver)
        | (Postponed, Scheduled)
    )
  }
}

/// A match row with its participants, score and voting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
  pub match_id:        Uuid,
  pub championship_id: Uuid,
  pub home_team_id:    Uuid,
  pub away_team_id:    Uuid,
  pub home_score:      Option<u32>,
  pub away_score:      Option<u32>,
  pub status:          MatchStatus,
  pub kickoff_at:      Option<DateTime<Utc>>,
  pub featured:        bool,
  pub voting:          VotingWindow,
}

impl Match {
  /// The final score, if the match is finished and both sides are recorded.
  pub fn final_score(&self) -> Option<(u32, u32)> {
    match (self.status, self.home_score, self.away_score) {
      (MatchStatus::Finished, Some(h), Some(a)) => Some((h, a)),
      _ => None,
    }
  }
}

/// Input for scheduling a match. Scores, status and voting window start at
/// their defaults.
#[derive(Debug, Clone)]
pub struct NewMatch {
  pub championship_id: Uuid,
  pub home_team_id:    Uuid,
  pub away_team_id:    Uuid,
  pub kickoff_at:      Option<DateTime<Utc>>,
  pub featured:        bool,
}

/// A finished-or-not match projected for standings, with team names resolved
/// so the calculator needs no further lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
  pub match_id:   Uuid,
  pub status:     MatchStatus,
  pub home:       TeamRef,
  pub away:       TeamRef,
  pub home_score: Option<u32>,
  pub away_score: Option<u32>,
}

/// The identifying bits of a team carried along with derived rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamRef {
  pub team_id:    Uuid,
  pub name:       String,
  pub group_name: Option<String>,
}

// ─── Match events ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Goal,
  OwnGoal,
  PenaltyGoal,
  YellowCard,
  SecondYellow,
  RedCard,
  SubstitutionIn,
  SubstitutionOut,
}

impl EventKind {
  /// Counts toward the scorer's own tally. Own goals do not.
  pub fn credits_scorer(self) -> bool { matches!(self, Self::Goal | Self::PenaltyGoal) }

  pub fn is_yellow(self) -> bool { matches!(self, Self::YellowCard) }

  /// A second yellow is a sending-off and is counted as a red card.
  pub fn is_red(self) -> bool { matches!(self, Self::RedCard | Self::SecondYellow) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
  First,
  Second,
  ExtraFirst,
  ExtraSecond,
  Penalties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEvent {
  pub event_id:  Uuid,
  pub match_id:  Uuid,
  pub player_id: Uuid,
  /// Team the player represented in this match.
  pub team_id:   Uuid,
  pub kind:      EventKind,
  pub minute:    Option<u16>,
  pub half:      Half,
}

#[derive(Debug, Clone)]
pub struct NewMatchEvent {
  pub match_id:  Uuid,
  pub player_id: Uuid,
  pub team_id:   Uuid,
  pub kind:      EventKind,
  pub minute:    Option<u16>,
  pub half:      Half,
}

impl NewMatchEvent {
  /// An event without a minute, in the first half.
  pub fn new(match_id: Uuid, player_id: Uuid, team_id: Uuid, kind: EventKind) -> Self {
    Self { match_id, player_id, team_id, kind, minute: None, half: Half::First }
  }
}

/// A match event joined with the names the aggregators need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
  pub match_id:        Uuid,
  pub championship_id: Uuid,
  pub player_id:       Uuid,
  pub player_name:     String,
  pub team:            TeamRef,
  pub kind:            EventKind,
}

// ─── Lineups ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupEntry {
  pub match_id:     Uuid,
  pub team_id:      Uuid,
  pub player_id:    Uuid,
  pub starter:      bool,
  pub shirt_number: Option<u8>,
  pub position:     Option<String>,
}

/// One lineup row for a player, with the championship and team it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appearance {
  pub match_id:        Uuid,
  pub championship_id: Uuid,
  pub team:            TeamRef,
  pub kickoff_at:      Option<DateTime<Utc>>,
}

// ─── Fan messages ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub message_id: Uuid,
  pub author:     String,
  pub body:       String,
  pub posted_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lifecycle_allows_the_happy_path() {
    assert!(MatchStatus::Scheduled.can_transition_to(MatchStatus::InProgress));
    assert!(MatchStatus::InProgress.can_transition_to(MatchStatus::Finished));
  }

  #[test]
  fn lifecycle_rejects_reopening_a_finished_match() {
    for next in [
      MatchStatus::Scheduled,
      MatchStatus::InProgress,
      MatchStatus::Postponed,
      MatchStatus::Cancelled,
    ] {
      assert!(!MatchStatus::Finished.can_transition_to(next), "{next:?}");
    }
  }

  #[test]
  fn postponed_match_can_be_rescheduled_only() {
    assert!(MatchStatus::Postponed.can_transition_to(MatchStatus::Scheduled));
    assert!(!MatchStatus::Postponed.can_transition_to(MatchStatus::Finished));
  }

  #[test]
  fn scheduled_match_cannot_skip_to_finished() {
    assert!(!MatchStatus::Scheduled.can_transition_to(MatchStatus::Finished));
  }

  #[test]
  fn second_yellow_counts_as_red() {
    assert!(EventKind::SecondYellow.is_red());
    assert!(!EventKind::SecondYellow.is_yellow());
    assert!(!EventKind::OwnGoal.credits_scorer());
    assert!(EventKind::PenaltyGoal.credits_scorer());
  }
}
