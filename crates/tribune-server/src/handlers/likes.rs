use axum::{
  Json,
  extract::{Path, State},
};
use tribune_core::{
  engagement::{LikeSummary, LikeToggle},
  store::ResultStore,
};
use uuid::Uuid;

use crate::{AppState, caller::Caller, error::Error};

pub async fn toggle<S>(
  State(state): State<AppState<S>>,
  Path(message_id): Path<Uuid>,
  Caller(identity): Caller,
) -> Result<Json<LikeToggle>, Error>
where
  S: ResultStore + Clone + 'static,
{
  Ok(Json(state.league.toggle_like(message_id, identity).await?))
}

pub async fn summary<S>(
  State(state): State<AppState<S>>,
  Path(message_id): Path<Uuid>,
  Caller(identity): Caller,
) -> Result<Json<LikeSummary>, Error>
where
  S: ResultStore + Clone + 'static,
{
  Ok(Json(state.league.likes(message_id, Some(identity)).await?))
}
