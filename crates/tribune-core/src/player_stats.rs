//! Per-player summary across one or all championships.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::league::{Appearance, EventKind, EventRecord, Player, TeamRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRow {
  pub player_id:       Uuid,
  pub player_name:     String,
  /// Set only when the summary is scoped to a single championship.
  pub championship_id: Option<Uuid>,
  /// Set only when the summary is scoped to a single championship.
  pub team:            Option<TeamRef>,
  pub matches_played:  u32,
  /// Goals credited to the player, penalties included.
  pub goals:           u32,
  pub penalty_goals:   u32,
  pub own_goals:       u32,
  pub yellow_cards:    u32,
  /// Straight reds and second yellows.
  pub red_cards:       u32,
}

/// Build the summary row for `player`.
///
/// `appearances` and `events` may cover more than `championship`; rows outside
/// the filter are skipped here. Matches played counts distinct lineup matches
/// only, so an event without a lineup row still counts toward its tally but
/// not toward appearances.
pub fn summarize(
  player: &Player,
  championship: Option<Uuid>,
  appearances: &[Appearance],
  events: &[EventRecord],
) -> StatsRow {
  let in_scope = |c: Uuid| championship.is_none_or(|want| want == c);

  let appearances: Vec<&Appearance> = appearances
    .iter()
    .filter(|a| in_scope(a.championship_id))
    .collect();
  let events: Vec<&EventRecord> = events
    .iter()
    .filter(|e| e.player_id == player.player_id && in_scope(e.championship_id))
    .collect();

  let matches_played = appearances
    .iter()
    .map(|a| a.match_id)
    .collect::<HashSet<_>>()
    .len() as u32;

  let mut row = StatsRow {
    player_id: player.player_id,
    player_name: player.name.clone(),
    championship_id: championship,
    team: None,
    matches_played,
    goals: 0,
    penalty_goals: 0,
    own_goals: 0,
    yellow_cards: 0,
    red_cards: 0,
  };

  for ev in &events {
    match ev.kind {
      EventKind::Goal => row.goals += 1,
      EventKind::PenaltyGoal => {
        row.goals += 1;
        row.penalty_goals += 1;
      }
      EventKind::OwnGoal => row.own_goals += 1,
      EventKind::YellowCard => row.yellow_cards += 1,
      EventKind::SecondYellow | EventKind::RedCard => row.red_cards += 1,
      EventKind::SubstitutionIn | EventKind::SubstitutionOut => {}
    }
  }

  if championship.is_some() {
    row.team = appearances
      .iter()
      .max_by_key(|a| a.kickoff_at)
      .map(|a| a.team.clone())
      .or_else(|| events.first().map(|e| e.team.clone()));
  }

  row
}
