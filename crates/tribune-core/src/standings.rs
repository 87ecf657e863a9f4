//! Standings: the per-team ranking table derived from finished matches.
//!
//! Rows are built fresh on every call and never stored. Goal difference and
//! points are computed from the accumulated counters, never persisted.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::league::{MatchStatus, MatchSummary, TeamRef};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// One row of the derived table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
  pub championship_id: Uuid,
  pub team:            TeamRef,
  pub played:          u32,
  pub wins:            u32,
  pub draws:           u32,
  pub losses:          u32,
  pub goals_for:       u32,
  pub goals_against:   u32,
  pub goal_difference: i64,
  pub points:          u32,
}

/// A named slice of the table. `group_name` is `None` for teams without a
/// group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStandings {
  pub group_name: Option<String>,
  pub rows:       Vec<Standing>,
}

#[derive(Default)]
struct Tally {
  played:        u32,
  wins:          u32,
  draws:         u32,
  losses:        u32,
  goals_for:     u32,
  goals_against: u32,
}

impl Tally {
  fn record(&mut self, scored: u32, conceded: u32) {
    self.played += 1;
    self.goals_for += scored;
    self.goals_against += conceded;
    match scored.cmp(&conceded) {
      Ordering::Greater => self.wins += 1,
      Ordering::Less => self.losses += 1,
      Ordering::Equal => self.draws += 1,
    }
  }
}

/// Compute the flat ranked table for one championship.
///
/// Only matches with status [`MatchStatus::Finished`] and both scores present
/// contribute. Teams without a contributing match do not appear.
pub fn compute(championship_id: Uuid, matches: &[MatchSummary]) -> Vec<Standing> {
  let mut tallies: HashMap<Uuid, (TeamRef, Tally)> = HashMap::new();

  for m in matches {
    if m.status != MatchStatus::Finished {
      continue;
    }
    let (Some(home), Some(away)) = (m.home_score, m.away_score) else {
      continue;
    };

    tallies
      .entry(m.home.team_id)
      .or_insert_with(|| (m.home.clone(), Tally::default()))
      .1
      .record(home, away);
    tallies
      .entry(m.away.team_id)
      .or_insert_with(|| (m.away.clone(), Tally::default()))
      .1
      .record(away, home);
  }

  let mut rows: Vec<Standing> = tallies
    .into_values()
    .map(|(team, t)| Standing {
      championship_id,
      team,
      played: t.played,
      wins: t.wins,
      draws: t.draws,
      losses: t.losses,
      goals_for: t.goals_for,
      goals_against: t.goals_against,
      goal_difference: i64::from(t.goals_for) - i64::from(t.goals_against),
      points: t.wins * POINTS_FOR_WIN + t.draws * POINTS_FOR_DRAW,
    })
    .collect();

  rows.sort_by(rank_order);
  rows
}

/// Split the ranked table into groups, each ranked with the same comparator.
///
/// Named groups come first in byte order of their names; teams without a group
/// form a trailing unnamed group.
pub fn compute_grouped(
  championship_id: Uuid,
  matches: &[MatchSummary],
) -> Vec<GroupStandings> {
  let mut groups: Vec<GroupStandings> = Vec::new();

  // `compute` already ranks; a stable partition keeps that order per group.
  for row in compute(championship_id, matches) {
    match groups.iter_mut().find(|g| g.group_name == row.team.group_name) {
      Some(g) => g.rows.push(row),
      None => groups.push(GroupStandings {
        group_name: row.team.group_name.clone(),
        rows:       vec![row],
      }),
    }
  }

  groups.sort_by(|a, b| match (&a.group_name, &b.group_name) {
    (Some(x), Some(y)) => x.as_bytes().cmp(y.as_bytes()),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  });
  groups
}

/// Points, goal difference and goals scored descending, then team name in
/// byte order. The team id settles two distinct teams sharing a name.
fn rank_order(a: &Standing, b: &Standing) -> Ordering {
  b.points
    .cmp(&a.points)
    .then_with(|| b.goal_difference.cmp(&a.goal_difference))
    .then_with(|| b.goals_for.cmp(&a.goals_for))
    .then_with(|| a.team.name.as_bytes().cmp(b.team.name.as_bytes()))
    .then_with(|| a.team.team_id.cmp(&b.team.team_id))
}
