//! The `ResultStore` trait: everything the core reads from, and the few rows
//! it writes to, the durable league store.
//!
//! Implemented by storage backends (e.g. `tribune-store-sqlite`). The ledger
//! writes rely on the backend's own uniqueness constraints; implementations
//! must never emulate them with a read followed by a write.

use std::future::Future;

use uuid::Uuid;

use crate::{
  engagement::{LikeSummary, LikeToggle},
  identity::Identity,
  league::{Appearance, EventRecord, LineupEntry, Match, MatchSummary, Message, Player},
  voting::{InsertOutcome, NewVote, Vote, VoteTally, VotingWindow},
};

/// Abstraction over the league's result store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ResultStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Results ───────────────────────────────────────────────────────────

  /// Matches of a championship in the `Finished` state. Scores may still be
  /// missing; callers skip those. Unknown championships yield no rows.
  fn finished_matches(
    &self,
    championship_id: Uuid,
  ) -> impl Future<Output = Result<Vec<MatchSummary>, Self::Error>> + Send + '_;

  /// All events of finished matches in a championship.
  fn championship_events(
    &self,
    championship_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EventRecord>, Self::Error>> + Send + '_;

  fn get_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  fn match_lineup(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LineupEntry>, Self::Error>> + Send + '_;

  // ── Players ───────────────────────────────────────────────────────────

  fn get_player(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  /// Lineup rows for a player, optionally restricted to one championship.
  fn player_appearances(
    &self,
    player_id: Uuid,
    championship_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Appearance>, Self::Error>> + Send + '_;

  /// Events attributed to a player, optionally restricted to one
  /// championship.
  fn player_events(
    &self,
    player_id: Uuid,
    championship_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<EventRecord>, Self::Error>> + Send + '_;

  // ── Voting ────────────────────────────────────────────────────────────

  /// Replace a match's voting window. Returns `false` if the match does not
  /// exist.
  fn set_voting_window(
    &self,
    match_id: Uuid,
    window: VotingWindow,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert a vote unless one already exists for `(match_id, identity)`.
  /// Atomic: concurrent callers with the same key see exactly one
  /// [`InsertOutcome::Inserted`].
  fn insert_vote(
    &self,
    vote: NewVote,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Remove the vote for `(match_id, identity)`. Returns whether a row was
  /// deleted.
  fn delete_vote(
    &self,
    match_id: Uuid,
    identity: Identity,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Vote counts per player for a match, in any order.
  fn vote_tally(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Vec<VoteTally>, Self::Error>> + Send + '_;

  fn find_vote(
    &self,
    match_id: Uuid,
    identity: Identity,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  // ── Likes ─────────────────────────────────────────────────────────────

  fn get_message(
    &self,
    message_id: Uuid,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// Flip like membership for `(message_id, identity)` as one atomic step.
  fn toggle_like(
    &self,
    message_id: Uuid,
    identity: Identity,
  ) -> impl Future<Output = Result<LikeToggle, Self::Error>> + Send + '_;

  fn like_summary(
    &self,
    message_id: Uuid,
    identity: Option<Identity>,
  ) -> impl Future<Output = Result<LikeSummary, Self::Error>> + Send + '_;
}
