//! Derived championship tables: standings and top scorers.

use axum::{
  extract::{Path, Query, State},
  http::HeaderMap,
  response::Response,
};
use serde::Deserialize;
use tribune_core::store::ResultStore;
use uuid::Uuid;

use crate::{AppState, error::Error, etag::json_with_etag};

#[derive(Debug, Default, Deserialize)]
pub struct StandingsQuery {
  #[serde(default)]
  pub grouped: bool,
}

pub async fn standings<S>(
  State(state): State<AppState<S>>,
  Path(championship_id): Path<Uuid>,
  Query(query): Query<StandingsQuery>,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: ResultStore + Clone + 'static,
{
  if query.grouped {
    let groups = state.league.grouped_standings(championship_id).await?;
    json_with_etag(&headers, &groups)
  } else {
    let table = state.league.standings(championship_id).await?;
    json_with_etag(&headers, &table)
  }
}

pub async fn scorers<S>(
  State(state): State<AppState<S>>,
  Path(championship_id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: ResultStore + Clone + 'static,
{
  let rows = state.league.top_scorers(championship_id).await?;
  json_with_etag(&headers, &rows)
}
