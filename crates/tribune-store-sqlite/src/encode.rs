//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, enums
//! snake_case strings, and identities their `account:`/`address:` keys.

use chrono::{DateTime, Utc};
use tribune_core::{
  identity::Identity,
  league::{
    Appearance, EventKind, EventRecord, Half, LineupEntry, Match, MatchStatus,
    MatchSummary, Message, Player, TeamRef,
  },
  voting::{Vote, VoteTally, VotingWindow},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Scores ───────────────────────────────────────────────────────────────────

fn decode_score(v: Option<i64>) -> Option<u32> { v.and_then(|n| u32::try_from(n).ok()) }

// ─── MatchStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: MatchStatus) -> &'static str {
  match s {
    MatchStatus::Scheduled => "scheduled",
    MatchStatus::InProgress => "in_progress",
    MatchStatus::Finished => "finished",
    MatchStatus::Postponed => "postponed",
    MatchStatus::Cancelled => "cancelled",
    MatchStatus::WalkOver => "walk_over",
  }
}

pub fn decode_status(s: &str) -> Result<MatchStatus> {
  match s {
    "scheduled" => Ok(MatchStatus::Scheduled),
    "in_progress" => Ok(MatchStatus::InProgress),
    "finished" => Ok(MatchStatus::Finished),
    "postponed" => Ok(MatchStatus::Postponed),
    "cancelled" => Ok(MatchStatus::Cancelled),
    "walk_over" => Ok(MatchStatus::WalkOver),
    other => Err(Error::UnknownValue { column: "status", value: other.to_string() }),
  }
}

// ─── EventKind ────────────────────────────────────────────────────────────────

pub fn encode_kind(k: EventKind) -> &'static str {
  match k {
    EventKind::Goal => "goal",
    EventKind::OwnGoal => "own_goal",
    EventKind::PenaltyGoal => "penalty_goal",
    EventKind::YellowCard => "yellow_card",
    EventKind::SecondYellow => "second_yellow",
    EventKind::RedCard => "red_card",
    EventKind::SubstitutionIn => "substitution_in",
    EventKind::SubstitutionOut => "substitution_out",
  }
}

pub fn decode_kind(s: &str) -> Result<EventKind> {
  match s {
    "goal" => Ok(EventKind::Goal),
    "own_goal" => Ok(EventKind::OwnGoal),
    "penalty_goal" => Ok(EventKind::PenaltyGoal),
    "yellow_card" => Ok(EventKind::YellowCard),
    "second_yellow" => Ok(EventKind::SecondYellow),
    "red_card" => Ok(EventKind::RedCard),
    "substitution_in" => Ok(EventKind::SubstitutionIn),
    "substitution_out" => Ok(EventKind::SubstitutionOut),
    other => Err(Error::UnknownValue { column: "kind", value: other.to_string() }),
  }
}

// ─── Half ─────────────────────────────────────────────────────────────────────

pub fn encode_half(h: Half) -> &'static str {
  match h {
    Half::First => "first",
    Half::Second => "second",
    Half::ExtraFirst => "extra_first",
    Half::ExtraSecond => "extra_second",
    Half::Penalties => "penalties",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of a `matches` row.
pub struct RawMatch {
  pub match_id:        String,
  pub championship_id: String,
  pub home_team_id:    String,
  pub away_team_id:    String,
  pub home_score:      Option<i64>,
  pub away_score:      Option<i64>,
  pub status:          String,
  pub kickoff_at:      Option<String>,
  pub featured:        bool,
  pub voting_open:     bool,
  pub voting_deadline: Option<String>,
}

impl RawMatch {
  pub const COLUMNS: &'static str = "match_id, championship_id, home_team_id, away_team_id,
     home_score, away_score, status, kickoff_at, featured,
     voting_open, voting_deadline";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_id:        row.get(0)?,
      championship_id: row.get(1)?,
      home_team_id:    row.get(2)?,
      away_team_id:    row.get(3)?,
      home_score:      row.get(4)?,
      away_score:      row.get(5)?,
      status:          row.get(6)?,
      kickoff_at:      row.get(7)?,
      featured:        row.get(8)?,
      voting_open:     row.get(9)?,
      voting_deadline: row.get(10)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      match_id:        decode_uuid(&self.match_id)?,
      championship_id: decode_uuid(&self.championship_id)?,
      home_team_id:    decode_uuid(&self.home_team_id)?,
      away_team_id:    decode_uuid(&self.away_team_id)?,
      home_score:      decode_score(self.home_score),
      away_score:      decode_score(self.away_score),
      status:          decode_status(&self.status)?,
      kickoff_at:      decode_opt_dt(self.kickoff_at)?,
      featured:        self.featured,
      voting:          VotingWindow {
        open:     self.voting_open,
        deadline: decode_opt_dt(self.voting_deadline)?,
      },
    })
  }
}

/// Raw columns of a team joined onto another row.
pub struct RawTeam {
  pub team_id:    String,
  pub name:       String,
  pub group_name: Option<String>,
}

impl RawTeam {
  pub fn into_team_ref(self) -> Result<TeamRef> {
    Ok(TeamRef {
      team_id:    decode_uuid(&self.team_id)?,
      name:       self.name,
      group_name: self.group_name,
    })
  }
}

/// A finished match joined with both teams.
pub struct RawMatchSummary {
  pub match_id:   String,
  pub status:     String,
  pub home:       RawTeam,
  pub away:       RawTeam,
  pub home_score: Option<i64>,
  pub away_score: Option<i64>,
}

impl RawMatchSummary {
  pub fn into_summary(self) -> Result<MatchSummary> {
    Ok(MatchSummary {
      match_id:   decode_uuid(&self.match_id)?,
      status:     decode_status(&self.status)?,
      home:       self.home.into_team_ref()?,
      away:       self.away.into_team_ref()?,
      home_score: decode_score(self.home_score),
      away_score: decode_score(self.away_score),
    })
  }
}

/// An event joined with its match, player and team.
pub struct RawEventRecord {
  pub match_id:        String,
  pub championship_id: String,
  pub player_id:       String,
  pub player_name:     String,
  pub team:            RawTeam,
  pub kind:            String,
}

impl RawEventRecord {
  pub const SELECT: &'static str = "SELECT
       e.match_id, m.championship_id, e.player_id, p.name,
       t.team_id, t.name, t.group_name, e.kind
     FROM match_events e
     JOIN matches m ON m.match_id  = e.match_id
     JOIN players p ON p.player_id = e.player_id
     JOIN teams   t ON t.team_id   = e.team_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_id:        row.get(0)?,
      championship_id: row.get(1)?,
      player_id:       row.get(2)?,
      player_name:     row.get(3)?,
      team:            RawTeam {
        team_id:    row.get(4)?,
        name:       row.get(5)?,
        group_name: row.get(6)?,
      },
      kind:            row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<EventRecord> {
    Ok(EventRecord {
      match_id:        decode_uuid(&self.match_id)?,
      championship_id: decode_uuid(&self.championship_id)?,
      player_id:       decode_uuid(&self.player_id)?,
      player_name:     self.player_name,
      team:            self.team.into_team_ref()?,
      kind:            decode_kind(&self.kind)?,
    })
  }
}

pub struct RawAppearance {
  pub match_id:        String,
  pub championship_id: String,
  pub team:            RawTeam,
  pub kickoff_at:      Option<String>,
}

impl RawAppearance {
  pub fn into_appearance(self) -> Result<Appearance> {
    Ok(Appearance {
      match_id:        decode_uuid(&self.match_id)?,
      championship_id: decode_uuid(&self.championship_id)?,
      team:            self.team.into_team_ref()?,
      kickoff_at:      decode_opt_dt(self.kickoff_at)?,
    })
  }
}

pub struct RawLineupEntry {
  pub match_id:     String,
  pub team_id:      String,
  pub player_id:    String,
  pub starter:      bool,
  pub shirt_number: Option<i64>,
  pub position:     Option<String>,
}

impl RawLineupEntry {
  pub fn into_entry(self) -> Result<LineupEntry> {
    Ok(LineupEntry {
      match_id:     decode_uuid(&self.match_id)?,
      team_id:      decode_uuid(&self.team_id)?,
      player_id:    decode_uuid(&self.player_id)?,
      starter:      self.starter,
      shirt_number: self.shirt_number.and_then(|n| u8::try_from(n).ok()),
      position:     self.position,
    })
  }
}

pub struct RawPlayer {
  pub player_id: String,
  pub name:      String,
  pub team_id:   Option<String>,
}

impl RawPlayer {
  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      player_id: decode_uuid(&self.player_id)?,
      name:      self.name,
      team_id:   decode_opt_uuid(self.team_id)?,
    })
  }
}

pub struct RawVote {
  pub vote_id:      String,
  pub match_id:     String,
  pub player_id:    String,
  pub voter_key:    String,
  pub display_name: Option<String>,
  pub cast_at:      String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      vote_id:      decode_uuid(&self.vote_id)?,
      match_id:     decode_uuid(&self.match_id)?,
      player_id:    decode_uuid(&self.player_id)?,
      identity:     self.voter_key.parse::<Identity>()?,
      display_name: self.display_name,
      cast_at:      decode_dt(&self.cast_at)?,
    })
  }
}

pub struct RawVoteTally {
  pub player_id:   String,
  pub player_name: String,
  pub votes:       i64,
}

impl RawVoteTally {
  pub fn into_tally(self) -> Result<VoteTally> {
    Ok(VoteTally {
      player_id:   decode_uuid(&self.player_id)?,
      player_name: self.player_name,
      votes:       u64::try_from(self.votes).unwrap_or(0),
    })
  }
}

pub struct RawMessage {
  pub message_id: String,
  pub author:     String,
  pub body:       String,
  pub posted_at:  String,
}

impl RawMessage {
  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id: decode_uuid(&self.message_id)?,
      author:     self.author,
      body:       self.body,
      posted_at:  decode_dt(&self.posted_at)?,
    })
  }
}
