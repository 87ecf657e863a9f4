//! Best-player voting.

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use serde::Deserialize;
use tribune_core::{
  store::ResultStore,
  voting::{CastVote, VoteRejection},
};
use uuid::Uuid;

use crate::{AppState, caller::Caller, error::Error, etag::json_with_etag};

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub player_id:    Uuid,
  /// Only kept for anonymous voters.
  pub display_name: Option<String>,
}

/// `201` when recorded, `403` when the window is closed, `409` for a repeat
/// vote or a player outside the lineups. The body is the outcome in every
/// case.
pub async fn cast<S>(
  State(state): State<AppState<S>>,
  Path(match_id): Path<Uuid>,
  Caller(identity): Caller,
  Json(body): Json<VoteBody>,
) -> Result<Response, Error>
where
  S: ResultStore + Clone + 'static,
{
  let outcome = state
    .league
    .cast_vote(CastVote {
      match_id,
      player_id: body.player_id,
      identity,
      display_name: body.display_name,
    })
    .await?;

  let status = match outcome.reason {
    None => StatusCode::CREATED,
    Some(VoteRejection::WindowClosed) => StatusCode::FORBIDDEN,
    Some(VoteRejection::AlreadyVoted | VoteRejection::InvalidSelection) => StatusCode::CONFLICT,
  };
  Ok((status, Json(outcome)).into_response())
}

/// Tally and window state, plus the caller's own choice.
pub async fn results<S>(
  State(state): State<AppState<S>>,
  Path(match_id): Path<Uuid>,
  Caller(identity): Caller,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: ResultStore + Clone + 'static,
{
  let results = state.league.vote_results(match_id, Some(identity)).await?;
  json_with_etag(&headers, &results)
}
