use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use tribune_core::{player_stats::StatsRow, store::ResultStore};
use uuid::Uuid;

use crate::{AppState, error::Error};

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
  /// Restrict the summary to one championship; omitted means career totals.
  pub championship_id: Option<Uuid>,
}

pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Path(player_id): Path<Uuid>,
  Query(query): Query<StatsQuery>,
) -> Result<Json<StatsRow>, Error>
where
  S: ResultStore + Clone + 'static,
{
  let row = state.league.player_stats(player_id, query.championship_id).await?;
  Ok(Json(row))
}
