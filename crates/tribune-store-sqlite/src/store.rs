//! [`SqliteStore`]: the SQLite implementation of [`ResultStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tribune_core::{
  engagement::{LikeSummary, LikeToggle},
  identity::Identity,
  league::{
    Appearance, Championship, EventRecord, LineupEntry, Match, MatchEvent,
    MatchStatus, MatchSummary, Message, NewMatch, NewMatchEvent, Player, Team,
  },
  store::ResultStore,
  voting::{InsertOutcome, NewVote, Vote, VoteTally, VotingWindow},
};

use crate::{
  Error, Result,
  encode::{
    RawAppearance, RawEventRecord, RawLineupEntry, RawMatch, RawMatchSummary,
    RawMessage, RawPlayer, RawTeam, RawVote, RawVoteTally, decode_status,
    encode_dt, encode_half, encode_kind, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tribune result store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path.as_ref()).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.as_ref().display(), "result store opened");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn match_status(&self, match_id: Uuid) -> Result<Option<MatchStatus>> {
    let id_str = encode_uuid(match_id);
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT status FROM matches WHERE match_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;
    raw.as_deref().map(decode_status).transpose()
  }
}

// ─── Collaborator-side writes ────────────────────────────────────────────────
//
// These belong to the surrounding CRUD system. They live here so the store is
// usable on its own and so the derivation can be exercised end to end.

impl SqliteStore {
  pub async fn add_championship(
    &self,
    name: &str,
    season: Option<&str>,
  ) -> Result<Championship> {
    let championship = Championship {
      championship_id: Uuid::new_v4(),
      name:            name.to_string(),
      season:          season.map(str::to_string),
    };

    let id_str = encode_uuid(championship.championship_id);
    let name   = championship.name.clone();
    let season = championship.season.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO championships (championship_id, name, season) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, season],
        )?;
        Ok(())
      })
      .await?;

    Ok(championship)
  }

  pub async fn add_team(
    &self,
    championship_id: Uuid,
    name: &str,
    group_name: Option<&str>,
  ) -> Result<Team> {
    let team = Team {
      team_id: Uuid::new_v4(),
      championship_id,
      name: name.to_string(),
      group_name: group_name.map(str::to_string),
    };

    let id_str    = encode_uuid(team.team_id);
    let champ_str = encode_uuid(championship_id);
    let name      = team.name.clone();
    let group     = team.group_name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO teams (team_id, championship_id, name, group_name)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, champ_str, name, group],
        )?;
        Ok(())
      })
      .await?;

    Ok(team)
  }

  pub async fn add_player(&self, name: &str, team_id: Option<Uuid>) -> Result<Player> {
    let player = Player { player_id: Uuid::new_v4(), name: name.to_string(), team_id };

    let id_str   = encode_uuid(player.player_id);
    let name     = player.name.clone();
    let team_str = team_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO players (player_id, name, team_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, team_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(player)
  }

  pub async fn schedule_match(&self, input: NewMatch) -> Result<Match> {
    let m = Match {
      match_id:        Uuid::new_v4(),
      championship_id: input.championship_id,
      home_team_id:    input.home_team_id,
      away_team_id:    input.away_team_id,
      home_score:      None,
      away_score:      None,
      status:          MatchStatus::Scheduled,
      kickoff_at:      input.kickoff_at,
      featured:        input.featured,
      voting:          VotingWindow::closed(),
    };

    let id_str      = encode_uuid(m.match_id);
    let champ_str   = encode_uuid(m.championship_id);
    let home_str    = encode_uuid(m.home_team_id);
    let away_str    = encode_uuid(m.away_team_id);
    let status_str  = encode_status(m.status);
    let kickoff_str = m.kickoff_at.map(encode_dt);
    let featured    = m.featured;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO matches (
             match_id, championship_id, home_team_id, away_team_id,
             status, kickoff_at, featured
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, champ_str, home_str, away_str, status_str, kickoff_str, featured,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(m)
  }

  /// Move a match along its lifecycle.
  ///
  /// The update is conditional on the status that was validated, so a
  /// concurrent change is detected and re-validated instead of overwritten.
  pub async fn set_match_status(&self, match_id: Uuid, next: MatchStatus) -> Result<()> {
    loop {
      let current = self
        .match_status(match_id)
        .await?
        .ok_or(Error::MatchNotFound(match_id))?;

      if !current.can_transition_to(next) {
        return Err(tribune_core::Error::InvalidTransition { from: current, to: next }.into());
      }

      let id_str   = encode_uuid(match_id);
      let from_str = encode_status(current);
      let to_str   = encode_status(next);

      let changed = self
        .conn
        .call(move |conn| {
          Ok(conn.execute(
            "UPDATE matches SET status = ?3 WHERE match_id = ?1 AND status = ?2",
            rusqlite::params![id_str, from_str, to_str],
          )?)
        })
        .await?;

      if changed == 1 {
        return Ok(());
      }
    }
  }

  /// Record the score of a match without touching its status.
  pub async fn record_score(&self, match_id: Uuid, home: u32, away: u32) -> Result<()> {
    let id_str = encode_uuid(match_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE matches SET home_score = ?2, away_score = ?3 WHERE match_id = ?1",
          rusqlite::params![id_str, home, away],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::MatchNotFound(match_id));
    }
    Ok(())
  }

  /// Record a final score and move the match to `Finished`, passing through
  /// `InProgress` when it has not kicked off yet.
  ///
  /// Score and status are written together; a rejected call leaves the match
  /// untouched.
  pub async fn finish_match(&self, match_id: Uuid, home: u32, away: u32) -> Result<()> {
    let id_str       = encode_uuid(match_id);
    let finished     = encode_status(MatchStatus::Finished);
    let scheduled    = encode_status(MatchStatus::Scheduled);
    let in_progress  = encode_status(MatchStatus::InProgress);

    let (prior, changed): (Option<String>, usize) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let prior: Option<String> = tx
          .query_row(
            "SELECT status FROM matches WHERE match_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let changed = tx.execute(
          "UPDATE matches SET home_score = ?2, away_score = ?3, status = ?4
           WHERE match_id = ?1 AND status IN (?5, ?6)",
          rusqlite::params![id_str, home, away, finished, scheduled, in_progress],
        )?;
        tx.commit()?;
        Ok((prior, changed))
      })
      .await?;

    let Some(prior) = prior else {
      return Err(Error::MatchNotFound(match_id));
    };
    if changed == 0 {
      let from = decode_status(&prior)?;
      return Err(
        tribune_core::Error::InvalidTransition { from, to: MatchStatus::Finished }.into(),
      );
    }
    tracing::debug!(%match_id, home, away, "match finished");
    Ok(())
  }

  pub async fn record_event(&self, input: NewMatchEvent) -> Result<MatchEvent> {
    let event = MatchEvent {
      event_id:  Uuid::new_v4(),
      match_id:  input.match_id,
      player_id: input.player_id,
      team_id:   input.team_id,
      kind:      input.kind,
      minute:    input.minute,
      half:      input.half,
    };

    let id_str     = encode_uuid(event.event_id);
    let match_str  = encode_uuid(event.match_id);
    let player_str = encode_uuid(event.player_id);
    let team_str   = encode_uuid(event.team_id);
    let kind_str   = encode_kind(event.kind);
    let half_str   = encode_half(event.half);
    let minute     = event.minute;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO match_events (event_id, match_id, player_id, team_id, kind, minute, half)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, match_str, player_str, team_str, kind_str, minute, half_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  /// Delete an event. Nothing derived is cached, so there is nothing else to
  /// invalidate.
  pub async fn delete_event(&self, event_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(event_id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM match_events WHERE event_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  pub async fn add_lineup_entry(&self, entry: LineupEntry) -> Result<()> {
    let match_str  = encode_uuid(entry.match_id);
    let team_str   = encode_uuid(entry.team_id);
    let player_str = encode_uuid(entry.player_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lineups (match_id, team_id, player_id, starter, shirt_number, position)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            match_str,
            team_str,
            player_str,
            entry.starter,
            entry.shirt_number,
            entry.position,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn post_message(&self, author: &str, body: &str) -> Result<Message> {
    let message = Message {
      message_id: Uuid::new_v4(),
      author:     author.to_string(),
      body:       body.to_string(),
      posted_at:  Utc::now(),
    };

    let id_str = encode_uuid(message.message_id);
    let author = message.author.clone();
    let body   = message.body.clone();
    let at_str = encode_dt(message.posted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO messages (message_id, author, body, posted_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, author, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(message)
  }
}

// ─── ResultStore impl ────────────────────────────────────────────────────────

impl ResultStore for SqliteStore {
  type Error = Error;

  // ── Results ───────────────────────────────────────────────────────────────

  async fn finished_matches(&self, championship_id: Uuid) -> Result<Vec<MatchSummary>> {
    let champ_str = encode_uuid(championship_id);

    let raws: Vec<RawMatchSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             m.match_id, m.status,
             h.team_id, h.name, h.group_name,
             a.team_id, a.name, a.group_name,
             m.home_score, m.away_score
           FROM matches m
           JOIN teams h ON h.team_id = m.home_team_id
           JOIN teams a ON a.team_id = m.away_team_id
           WHERE m.championship_id = ?1
             AND m.status = 'finished'
           ORDER BY m.kickoff_at, m.match_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![champ_str], |row| {
            Ok(RawMatchSummary {
              match_id:   row.get(0)?,
              status:     row.get(1)?,
              home:       RawTeam {
                team_id:    row.get(2)?,
                name:       row.get(3)?,
                group_name: row.get(4)?,
              },
              away:       RawTeam {
                team_id:    row.get(5)?,
                name:       row.get(6)?,
                group_name: row.get(7)?,
              },
              home_score: row.get(8)?,
              away_score: row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatchSummary::into_summary).collect()
  }

  async fn championship_events(&self, championship_id: Uuid) -> Result<Vec<EventRecord>> {
    let champ_str = encode_uuid(championship_id);

    let raws: Vec<RawEventRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{}
           WHERE m.championship_id = ?1
             AND m.status = 'finished'
           ORDER BY m.kickoff_at, e.minute, e.event_id",
          RawEventRecord::SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![champ_str], RawEventRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEventRecord::into_record).collect()
  }

  async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    let id_str = encode_uuid(match_id);

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM matches WHERE match_id = ?1", RawMatch::COLUMNS);
        Ok(conn
          .query_row(&sql, rusqlite::params![id_str], RawMatch::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn match_lineup(&self, match_id: Uuid) -> Result<Vec<LineupEntry>> {
    let id_str = encode_uuid(match_id);

    let raws: Vec<RawLineupEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT match_id, team_id, player_id, starter, shirt_number, position
           FROM lineups
           WHERE match_id = ?1
           ORDER BY team_id, starter DESC, shirt_number",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawLineupEntry {
              match_id:     row.get(0)?,
              team_id:      row.get(1)?,
              player_id:    row.get(2)?,
              starter:      row.get(3)?,
              shirt_number: row.get(4)?,
              position:     row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLineupEntry::into_entry).collect()
  }

  // ── Players ───────────────────────────────────────────────────────────────

  async fn get_player(&self, player_id: Uuid) -> Result<Option<Player>> {
    let id_str = encode_uuid(player_id);

    let raw: Option<RawPlayer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT player_id, name, team_id FROM players WHERE player_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawPlayer {
                player_id: row.get(0)?,
                name:      row.get(1)?,
                team_id:   row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlayer::into_player).transpose()
  }

  async fn player_appearances(
    &self,
    player_id: Uuid,
    championship_id: Option<Uuid>,
  ) -> Result<Vec<Appearance>> {
    let player_str = encode_uuid(player_id);
    let champ_str  = championship_id.map(encode_uuid);

    let raws: Vec<RawAppearance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT l.match_id, m.championship_id, t.team_id, t.name, t.group_name, m.kickoff_at
           FROM lineups l
           JOIN matches m ON m.match_id = l.match_id
           JOIN teams   t ON t.team_id  = l.team_id
           WHERE l.player_id = ?1
             AND m.status = 'finished'
             AND (?2 IS NULL OR m.championship_id = ?2)
           ORDER BY m.kickoff_at, l.match_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![player_str, champ_str], |row| {
            Ok(RawAppearance {
              match_id:        row.get(0)?,
              championship_id: row.get(1)?,
              team:            RawTeam {
                team_id:    row.get(2)?,
                name:       row.get(3)?,
                group_name: row.get(4)?,
              },
              kickoff_at:      row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAppearance::into_appearance).collect()
  }

  async fn player_events(
    &self,
    player_id: Uuid,
    championship_id: Option<Uuid>,
  ) -> Result<Vec<EventRecord>> {
    let player_str = encode_uuid(player_id);
    let champ_str  = championship_id.map(encode_uuid);

    let raws: Vec<RawEventRecord> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{}
           WHERE e.player_id = ?1
             AND m.status = 'finished'
             AND (?2 IS NULL OR m.championship_id = ?2)
           ORDER BY m.kickoff_at, e.minute, e.event_id",
          RawEventRecord::SELECT
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![player_str, champ_str], RawEventRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEventRecord::into_record).collect()
  }

  // ── Voting ────────────────────────────────────────────────────────────────

  async fn set_voting_window(&self, match_id: Uuid, window: VotingWindow) -> Result<bool> {
    let id_str       = encode_uuid(match_id);
    let deadline_str = window.deadline.map(encode_dt);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE matches SET voting_open = ?2, voting_deadline = ?3 WHERE match_id = ?1",
          rusqlite::params![id_str, window.open, deadline_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn insert_vote(&self, vote: NewVote) -> Result<InsertOutcome> {
    let vote_id_str  = encode_uuid(Uuid::new_v4());
    let match_str    = encode_uuid(vote.match_id);
    let player_str   = encode_uuid(vote.player_id);
    let voter_key    = vote.identity.key();
    let display_name = vote.display_name;
    let at_str       = encode_dt(vote.cast_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO votes (vote_id, match_id, player_id, voter_key, display_name, cast_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (match_id, voter_key) DO NOTHING",
          rusqlite::params![vote_id_str, match_str, player_str, voter_key, display_name, at_str],
        )?)
      })
      .await?;

    Ok(if inserted == 1 { InsertOutcome::Inserted } else { InsertOutcome::Duplicate })
  }

  async fn delete_vote(&self, match_id: Uuid, identity: Identity) -> Result<bool> {
    let match_str = encode_uuid(match_id);
    let voter_key = identity.key();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM votes WHERE match_id = ?1 AND voter_key = ?2",
          rusqlite::params![match_str, voter_key],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn vote_tally(&self, match_id: Uuid) -> Result<Vec<VoteTally>> {
    let match_str = encode_uuid(match_id);

    let raws: Vec<RawVoteTally> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT v.player_id, p.name, COUNT(*)
           FROM votes v
           JOIN players p ON p.player_id = v.player_id
           WHERE v.match_id = ?1
           GROUP BY v.player_id, p.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![match_str], |row| {
            Ok(RawVoteTally {
              player_id:   row.get(0)?,
              player_name: row.get(1)?,
              votes:       row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVoteTally::into_tally).collect()
  }

  async fn find_vote(&self, match_id: Uuid, identity: Identity) -> Result<Option<Vote>> {
    let match_str = encode_uuid(match_id);
    let voter_key = identity.key();

    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT vote_id, match_id, player_id, voter_key, display_name, cast_at
             FROM votes
             WHERE match_id = ?1 AND voter_key = ?2",
            rusqlite::params![match_str, voter_key],
            |row| {
              Ok(RawVote {
                vote_id:      row.get(0)?,
                match_id:     row.get(1)?,
                player_id:    row.get(2)?,
                voter_key:    row.get(3)?,
                display_name: row.get(4)?,
                cast_at:      row.get(5)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVote::into_vote).transpose()
  }

  // ── Likes ─────────────────────────────────────────────────────────────────

  async fn get_message(&self, message_id: Uuid) -> Result<Option<Message>> {
    let id_str = encode_uuid(message_id);

    let raw: Option<RawMessage> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT message_id, author, body, posted_at FROM messages WHERE message_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawMessage {
                message_id: row.get(0)?,
                author:     row.get(1)?,
                body:       row.get(2)?,
                posted_at:  row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMessage::into_message).transpose()
  }

  async fn toggle_like(&self, message_id: Uuid, identity: Identity) -> Result<LikeToggle> {
    let id_str    = encode_uuid(message_id);
    let voter_key = identity.key();
    let at_str    = encode_dt(Utc::now());

    // Insert first; a no-op insert means the row already exists, so the
    // toggle is a delete. The immediate transaction takes the write lock up
    // front, so another process cannot slip in between the two statements.
    let liked = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
          "INSERT INTO likes (message_id, voter_key, liked_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (message_id, voter_key) DO NOTHING",
          rusqlite::params![id_str, voter_key, at_str],
        )?;
        if inserted == 0 {
          tx.execute(
            "DELETE FROM likes WHERE message_id = ?1 AND voter_key = ?2",
            rusqlite::params![id_str, voter_key],
          )?;
        }
        tx.commit()?;
        Ok(inserted == 1)
      })
      .await?;

    Ok(LikeToggle { message_id, liked })
  }

  async fn like_summary(
    &self,
    message_id: Uuid,
    identity: Option<Identity>,
  ) -> Result<LikeSummary> {
    let id_str    = encode_uuid(message_id);
    let voter_key = identity.map(|i| i.key());

    let (count, liked): (i64, bool) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COALESCE(SUM(voter_key = ?2), 0) > 0
           FROM likes
           WHERE message_id = ?1",
          rusqlite::params![id_str, voter_key],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(LikeSummary {
      message_id,
      count: u64::try_from(count).unwrap_or(0),
      liked,
    })
  }
}
