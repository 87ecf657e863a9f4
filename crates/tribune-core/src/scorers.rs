//! Top-scorer table derived from match events.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::league::{EventKind, EventRecord, TeamRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerRow {
  pub player_id:     Uuid,
  pub player_name:   String,
  /// The team recorded on the scoring events, not the player's current club.
  pub team:          TeamRef,
  pub goals:         u32,
  pub penalty_goals: u32,
  pub yellow_cards:  u32,
  pub red_cards:     u32,
}

/// Rank players of one championship by goals.
///
/// Goals and penalty goals count; own goals never do. A player who scored for
/// two teams in the same championship gets one row per team. Card counts are
/// gathered from the same events so that they can break ties, but a player
/// with cards and no goals does not appear.
pub fn rank(events: &[EventRecord]) -> Vec<ScorerRow> {
  let mut rows: HashMap<(Uuid, Uuid), ScorerRow> = HashMap::new();

  for ev in events {
    let row = rows
      .entry((ev.player_id, ev.team.team_id))
      .or_insert_with(|| ScorerRow {
        player_id:     ev.player_id,
        player_name:   ev.player_name.clone(),
        team:          ev.team.clone(),
        goals:         0,
        penalty_goals: 0,
        yellow_cards:  0,
        red_cards:     0,
      });

    if ev.kind.credits_scorer() {
      row.goals += 1;
      if ev.kind == EventKind::PenaltyGoal {
        row.penalty_goals += 1;
      }
    } else if ev.kind.is_yellow() {
      row.yellow_cards += 1;
    } else if ev.kind.is_red() {
      row.red_cards += 1;
    }
  }

  let mut ranked: Vec<ScorerRow> = rows.into_values().filter(|r| r.goals > 0).collect();
  ranked.sort_by(rank_order);
  ranked
}

fn rank_order(a: &ScorerRow, b: &ScorerRow) -> Ordering {
  b.goals
    .cmp(&a.goals)
    .then_with(|| a.yellow_cards.cmp(&b.yellow_cards))
    .then_with(|| a.red_cards.cmp(&b.red_cards))
    .then_with(|| a.player_name.as_bytes().cmp(b.player_name.as_bytes()))
    .then_with(|| a.player_id.cmp(&b.player_id))
    .then_with(|| a.team.team_id.cmp(&b.team.team_id))
}
