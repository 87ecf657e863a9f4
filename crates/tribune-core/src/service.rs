//! [`League`]: the request-time operations of the core, over any
//! [`ResultStore`].
//!
//! Nothing here caches. Every read pulls the current rows from the store and
//! recomputes, so there is no derived state to invalidate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  engagement::{LikeSummary, LikeToggle},
  identity::Identity,
  player_stats::{self, StatsRow},
  scorers::{self, ScorerRow},
  standings::{self, GroupStandings, Standing},
  store::ResultStore,
  voting::{
    CastOutcome, CastVote, InsertOutcome, NewVote, VoteRejection, VoteResults,
    VotingState, VotingWindow, clean_display_name, order_tally,
  },
};

pub struct League<S> {
  store: Arc<S>,
}

impl<S> Clone for League<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: ResultStore> League<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  // ── Derived tables ────────────────────────────────────────────────────

  /// Ranked table for a championship. Unknown or empty championships yield
  /// an empty table.
  pub async fn standings(&self, championship_id: Uuid) -> Result<Vec<Standing>> {
    let matches = self
      .store
      .finished_matches(championship_id)
      .await
      .map_err(Error::store)?;
    Ok(standings::compute(championship_id, &matches))
  }

  pub async fn grouped_standings(&self, championship_id: Uuid) -> Result<Vec<GroupStandings>> {
    let matches = self
      .store
      .finished_matches(championship_id)
      .await
      .map_err(Error::store)?;
    Ok(standings::compute_grouped(championship_id, &matches))
  }

  pub async fn top_scorers(&self, championship_id: Uuid) -> Result<Vec<ScorerRow>> {
    let events = self
      .store
      .championship_events(championship_id)
      .await
      .map_err(Error::store)?;
    Ok(scorers::rank(&events))
  }

  pub async fn player_stats(
    &self,
    player_id: Uuid,
    championship_id: Option<Uuid>,
  ) -> Result<StatsRow> {
    let player = self
      .store
      .get_player(player_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::PlayerNotFound(player_id))?;

    let appearances = self
      .store
      .player_appearances(player_id, championship_id)
      .await
      .map_err(Error::store)?;
    let events = self
      .store
      .player_events(player_id, championship_id)
      .await
      .map_err(Error::store)?;

    Ok(player_stats::summarize(&player, championship_id, &appearances, &events))
  }

  // ── Voting ────────────────────────────────────────────────────────────

  /// Cast a best-player vote, checked against the window, the lineups and
  /// the existing votes in that order.
  pub async fn cast_vote(&self, input: CastVote) -> Result<CastOutcome> {
    self.cast_vote_at(input, Utc::now()).await
  }

  /// [`Self::cast_vote`] with an explicit clock reading.
  pub async fn cast_vote_at(&self, input: CastVote, now: DateTime<Utc>) -> Result<CastOutcome> {
    let m = self
      .store
      .get_match(input.match_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MatchNotFound(input.match_id))?;

    let outcome = if m.voting.state_at(now) == VotingState::Closed {
      CastOutcome::rejected(VoteRejection::WindowClosed)
    } else if !self.in_lineup(input.match_id, input.player_id).await? {
      CastOutcome::rejected(VoteRejection::InvalidSelection)
    } else {
      let display_name = if input.identity.is_account() {
        None
      } else {
        clean_display_name(input.display_name.as_deref())
      };
      let vote = NewVote {
        match_id: input.match_id,
        player_id: input.player_id,
        identity: input.identity.clone(),
        display_name,
        cast_at: now,
      };
      match self.store.insert_vote(vote).await.map_err(Error::store)? {
        InsertOutcome::Inserted => CastOutcome::accepted(),
        InsertOutcome::Duplicate => CastOutcome::rejected(VoteRejection::AlreadyVoted),
      }
    };

    match outcome.reason {
      None => tracing::info!(
        match_id = %input.match_id,
        player_id = %input.player_id,
        identity = input.identity.kind(),
        "vote accepted"
      ),
      Some(reason) => tracing::debug!(
        match_id = %input.match_id,
        identity = input.identity.kind(),
        reason = reason.as_str(),
        "vote rejected"
      ),
    }
    Ok(outcome)
  }

  async fn in_lineup(&self, match_id: Uuid, player_id: Uuid) -> Result<bool> {
    let lineup = self.store.match_lineup(match_id).await.map_err(Error::store)?;
    Ok(lineup.iter().any(|e| e.player_id == player_id))
  }

  /// Tally, window state and, for a known caller, the caller's own choice.
  pub async fn vote_results(
    &self,
    match_id: Uuid,
    identity: Option<Identity>,
  ) -> Result<VoteResults> {
    self.vote_results_at(match_id, identity, Utc::now()).await
  }

  pub async fn vote_results_at(
    &self,
    match_id: Uuid,
    identity: Option<Identity>,
    now: DateTime<Utc>,
  ) -> Result<VoteResults> {
    let m = self
      .store
      .get_match(match_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MatchNotFound(match_id))?;

    let mut tally = self.store.vote_tally(match_id).await.map_err(Error::store)?;
    order_tally(&mut tally);

    let voted_for = match identity {
      Some(identity) => self
        .store
        .find_vote(match_id, identity)
        .await
        .map_err(Error::store)?
        .map(|v| v.player_id),
      None => None,
    };

    Ok(VoteResults {
      match_id,
      state: m.voting.state_at(now),
      deadline: m.voting.deadline,
      total_votes: tally.iter().map(|t| t.votes).sum(),
      tally,
      voted_for,
    })
  }

  /// Admin: replace the voting window of a match.
  pub async fn set_voting_window(&self, match_id: Uuid, window: VotingWindow) -> Result<()> {
    let found = self
      .store
      .set_voting_window(match_id, window)
      .await
      .map_err(Error::store)?;
    if !found {
      return Err(Error::MatchNotFound(match_id));
    }
    tracing::info!(
      match_id = %match_id,
      open = window.open,
      deadline = ?window.deadline,
      "voting window updated"
    );
    Ok(())
  }

  /// Admin: remove one identity's vote. Returns whether a vote existed.
  pub async fn retract_vote(&self, match_id: Uuid, identity: Identity) -> Result<bool> {
    let kind = identity.kind();
    let removed = self
      .store
      .delete_vote(match_id, identity)
      .await
      .map_err(Error::store)?;
    if removed {
      tracing::info!(match_id = %match_id, identity = kind, "vote retracted");
    }
    Ok(removed)
  }

  // ── Likes ─────────────────────────────────────────────────────────────

  pub async fn toggle_like(&self, message_id: Uuid, identity: Identity) -> Result<LikeToggle> {
    self.require_message(message_id).await?;
    let kind = identity.kind();
    let toggle = self
      .store
      .toggle_like(message_id, identity)
      .await
      .map_err(Error::store)?;
    tracing::debug!(message_id = %message_id, identity = kind, liked = toggle.liked, "like toggled");
    Ok(toggle)
  }

  pub async fn likes(&self, message_id: Uuid, identity: Option<Identity>) -> Result<LikeSummary> {
    self.require_message(message_id).await?;
    self
      .store
      .like_summary(message_id, identity)
      .await
      .map_err(Error::store)
  }

  async fn require_message(&self, message_id: Uuid) -> Result<()> {
    self
      .store
      .get_message(message_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::MessageNotFound(message_id))?;
    Ok(())
  }
}
