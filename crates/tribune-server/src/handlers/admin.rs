//! Moderation routes, behind admin basic auth.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use tribune_core::{identity::Identity, store::ResultStore, voting::VotingWindow};
use uuid::Uuid;

use crate::{AppState, auth::Admin, error::Error};

/// Replace a match's voting window. Body: `{"open": bool, "deadline": rfc3339?}`.
pub async fn set_voting_window<S>(
  _admin: Admin,
  State(state): State<AppState<S>>,
  Path(match_id): Path<Uuid>,
  Json(window): Json<VotingWindow>,
) -> Result<StatusCode, Error>
where
  S: ResultStore + Clone + 'static,
{
  state.league.set_voting_window(match_id, window).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// Remove one voter's ballot, keyed by its `account:`/`address:` key.
pub async fn retract_vote<S>(
  _admin: Admin,
  State(state): State<AppState<S>>,
  Path((match_id, voter_key)): Path<(Uuid, String)>,
) -> Result<StatusCode, Error>
where
  S: ResultStore + Clone + 'static,
{
  let identity: Identity = voter_key
    .parse()
    .map_err(|e: tribune_core::identity::ParseIdentityError| Error::BadRequest(e.to_string()))?;

  if state.league.retract_vote(match_id, identity).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(Error::NotFound("vote"))
  }
}
