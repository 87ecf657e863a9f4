//! HTTP layer for the Tribune league core.
//!
//! Exposes an axum [`Router`] over the derived tables and the engagement
//! ledgers, backed by any [`ResultStore`].

pub mod auth;
pub mod caller;
pub mod error;
pub mod etag;
pub mod handlers;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tribune_core::{
  League,
  identity::{AddressFallbackResolver, IdentityResolver},
  store::ResultStore,
};

use auth::AuthConfig;
use handlers::{admin, championships, likes, players, votes};
use session::SessionKeys;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TRIBUNE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_username:      String,
  pub admin_password_hash: String,
  /// Key for verifying session tokens issued by the account system.
  pub session_secret:      String,
  /// Honour `X-Forwarded-For`. Only safe behind a proxy that overwrites it.
  #[serde(default = "default_trust_forwarded_for")]
  pub trust_forwarded_for: bool,
}

fn default_trust_forwarded_for() -> bool { true }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ResultStore> {
  pub league:   League<S>,
  pub config:   Arc<ServerConfig>,
  pub auth:     Arc<AuthConfig>,
  pub sessions: Arc<SessionKeys>,
  pub resolver: Arc<dyn IdentityResolver>,
}

impl<S: ResultStore> AppState<S> {
  /// State with the default address-fallback identity policy.
  pub fn new(store: S, config: ServerConfig) -> Result<Self, hmac::digest::InvalidLength> {
    Ok(Self {
      league:   League::new(Arc::new(store)),
      auth:     Arc::new(AuthConfig {
        username:      config.admin_username.clone(),
        password_hash: config.admin_password_hash.clone(),
      }),
      sessions: Arc::new(SessionKeys::new(&config.session_secret)?),
      resolver: Arc::new(AddressFallbackResolver),
      config:   Arc::new(config),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the public and admin API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ResultStore + Clone + 'static,
{
  Router::new()
    .route("/health",                                   get(health))
    .route("/api/championships/{id}/standings",         get(championships::standings::<S>))
    .route("/api/championships/{id}/scorers",           get(championships::scorers::<S>))
    .route("/api/players/{id}/stats",                   get(players::stats::<S>))
    .route("/api/matches/{id}/votes",                   post(votes::cast::<S>).get(votes::results::<S>))
    .route("/api/messages/{id}/like",                   post(likes::toggle::<S>))
    .route("/api/messages/{id}/likes",                  get(likes::summary::<S>))
    .route("/api/admin/matches/{id}/voting",            put(admin::set_voting_window::<S>))
    .route("/api/admin/matches/{id}/votes/{voter_key}", delete(admin::retract_vote::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::net::SocketAddr;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use tower::ServiceExt as _;
  use tribune_core::league::{EventKind, LineupEntry, NewMatch, NewMatchEvent};
  use tribune_store_sqlite::SqliteStore;
  use uuid::Uuid;

  const PASSWORD: &str = "hunter2";

  fn config(trust_forwarded_for: bool) -> ServerConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(PASSWORD.as_bytes(), &salt)
      .unwrap()
      .to_string();
    ServerConfig {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      store_path:          PathBuf::from(":memory:"),
      admin_username:      "admin".to_string(),
      admin_password_hash: hash,
      session_secret:      "test-secret".to_string(),
      trust_forwarded_for,
    }
  }

  /// A championship where Home beat Away 2-1, plus an unplayed match with
  /// open voting and both starters lined up.
  struct World {
    state:           AppState<SqliteStore>,
    championship_id: Uuid,
    voting_match:    Uuid,
    striker:         Uuid,
    keeper:          Uuid,
    bench_warmer:    Uuid,
    message:         Uuid,
  }

  async fn world_with(trust_forwarded_for: bool) -> World {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let champ = store.add_championship("Premier", Some("2024/25")).await.unwrap();
    let cid = champ.championship_id;
    let home = store.add_team(cid, "Home", None).await.unwrap();
    let away = store.add_team(cid, "Away", None).await.unwrap();
    let striker = store.add_player("Striker", Some(home.team_id)).await.unwrap();
    let keeper = store.add_player("Keeper", Some(away.team_id)).await.unwrap();
    let bench_warmer = store.add_player("Bench", Some(away.team_id)).await.unwrap();

    let new_match = || NewMatch {
      championship_id: cid,
      home_team_id:    home.team_id,
      away_team_id:    away.team_id,
      kickoff_at:      None,
      featured:        false,
    };

    let played = store.schedule_match(new_match()).await.unwrap();
    store.finish_match(played.match_id, 2, 1).await.unwrap();
    for kind in [EventKind::Goal, EventKind::Goal] {
      store
        .record_event(NewMatchEvent::new(played.match_id, striker.player_id, home.team_id, kind))
        .await
        .unwrap();
    }

    let upcoming = store.schedule_match(new_match()).await.unwrap();
    for (team, player) in [(&home, &striker), (&away, &keeper)] {
      store
        .add_lineup_entry(LineupEntry {
          match_id:     upcoming.match_id,
          team_id:      team.team_id,
          player_id:    player.player_id,
          starter:      true,
          shirt_number: None,
          position:     None,
        })
        .await
        .unwrap();
    }

    let message = store.post_message("fan", "come on you reds").await.unwrap();

    let state = AppState::new(store, config(trust_forwarded_for)).unwrap();
    state
      .league
      .set_voting_window(upcoming.match_id, tribune_core::voting::VotingWindow::opened(None))
      .await
      .unwrap();

    World {
      state,
      championship_id: cid,
      voting_match: upcoming.match_id,
      striker: striker.player_id,
      keeper: keeper.player_id,
      bench_warmer: bench_warmer.player_id,
      message: message.message_id,
    }
  }

  async fn world() -> World { world_with(true).await }

  fn admin_header() -> String {
    format!("Basic {}", B64.encode(format!("admin:{PASSWORD}")))
  }

  async fn send(
    state:   &AppState<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: &[(header::HeaderName, &str)],
    body:    Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, *v);
    }
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn xff(ip: &str) -> (header::HeaderName, &str) {
    (header::HeaderName::from_static("x-forwarded-for"), ip)
  }

  async fn vote(w: &World, player: Uuid, headers: &[(header::HeaderName, &str)]) -> Response {
    send(
      &w.state,
      "POST",
      &format!("/api/matches/{}/votes", w.voting_match),
      headers,
      Some(json!({ "player_id": player })),
    )
    .await
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_returns_ok() {
    let w = world().await;
    let resp = send(&w.state, "GET", "/health", &[], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "status": "ok" }));
  }

  // ── Tables ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn standings_are_served_with_etag() {
    let w = world().await;
    let uri = format!("/api/championships/{}/standings", w.championship_id);

    let resp = send(&w.state, "GET", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = resp.headers().get(header::ETAG).unwrap().to_str().unwrap().to_string();
    let table = json_body(resp).await;
    assert_eq!(table[0]["team"]["name"], "Home");
    assert_eq!(table[0]["points"], 3);
    assert_eq!(table[1]["goal_difference"], -1);

    let again = send(&w.state, "GET", &uri, &[(header::IF_NONE_MATCH, etag.as_str())], None).await;
    assert_eq!(again.status(), StatusCode::NOT_MODIFIED);
  }

  #[tokio::test]
  async fn grouped_standings_on_request() {
    let w = world().await;
    let uri = format!("/api/championships/{}/standings?grouped=true", w.championship_id);
    let resp = send(&w.state, "GET", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let groups = json_body(resp).await;
    assert_eq!(groups[0]["group_name"], Value::Null);
    assert_eq!(groups[0]["rows"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn unknown_championship_yields_empty_table() {
    let w = world().await;
    let uri = format!("/api/championships/{}/standings", Uuid::new_v4());
    let resp = send(&w.state, "GET", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
  }

  #[tokio::test]
  async fn malformed_championship_id_is_rejected() {
    let w = world().await;
    let resp = send(&w.state, "GET", "/api/championships/not-a-uuid/standings", &[], None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn scorers_are_ranked() {
    let w = world().await;
    let uri = format!("/api/championships/{}/scorers", w.championship_id);
    let resp = send(&w.state, "GET", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ETAG));
    let rows = json_body(resp).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["player_name"], "Striker");
    assert_eq!(rows[0]["goals"], 2);
  }

  #[tokio::test]
  async fn player_stats_for_known_and_unknown_players() {
    let w = world().await;
    let uri = format!(
      "/api/players/{}/stats?championship_id={}",
      w.striker, w.championship_id
    );
    let resp = send(&w.state, "GET", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let row = json_body(resp).await;
    assert_eq!(row["goals"], 2);
    assert_eq!(row["team"]["name"], "Home");

    let uri = format!("/api/players/{}/stats", Uuid::new_v4());
    let resp = send(&w.state, "GET", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"], "player not found");
  }

  // ── Voting ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn first_vote_created_then_conflict() {
    let w = world().await;

    let resp = vote(&w, w.striker, &[xff("203.0.113.7")]).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await, json!({ "accepted": true }));

    let resp = vote(&w, w.keeper, &[xff("203.0.113.7")]).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
      json_body(resp).await,
      json!({ "accepted": false, "reason": "already_voted" })
    );
  }

  #[tokio::test]
  async fn vote_for_player_outside_lineups_conflicts() {
    let w = world().await;
    let resp = vote(&w, w.bench_warmer, &[xff("203.0.113.7")]).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(resp).await["reason"], "invalid_selection");
  }

  #[tokio::test]
  async fn vote_with_closed_window_is_forbidden() {
    let w = world().await;
    let auth = admin_header();
    let resp = send(
      &w.state,
      "PUT",
      &format!("/api/admin/matches/{}/voting", w.voting_match),
      &[(header::AUTHORIZATION, auth.as_str())],
      Some(json!({ "open": false })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = vote(&w, w.striker, &[xff("203.0.113.7")]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await["reason"], "window_closed");
  }

  #[tokio::test]
  async fn vote_on_unknown_match_is_not_found() {
    let w = world().await;
    let resp = send(
      &w.state,
      "POST",
      &format!("/api/matches/{}/votes", Uuid::new_v4()),
      &[],
      Some(json!({ "player_id": w.striker })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn distinct_forwarded_addresses_vote_separately() {
    let w = world().await;
    assert_eq!(vote(&w, w.striker, &[xff("198.51.100.1")]).await.status(), StatusCode::CREATED);
    assert_eq!(vote(&w, w.striker, &[xff("198.51.100.2, 10.0.0.1")]).await.status(), StatusCode::CREATED);
    // Same client through an IPv4-mapped address and a port.
    assert_eq!(vote(&w, w.keeper, &[xff("[::ffff:198.51.100.1]:4711")]).await.status(), StatusCode::CONFLICT);

    let resp = send(
      &w.state,
      "GET",
      &format!("/api/matches/{}/votes", w.voting_match),
      &[xff("198.51.100.1")],
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let results = json_body(resp).await;
    assert_eq!(results["total_votes"], 2);
    assert_eq!(results["state"], "open");
    assert_eq!(results["voted_for"], json!(w.striker));
  }

  #[tokio::test]
  async fn untrusted_forwarded_for_falls_back_to_peer() {
    let w = world_with(false).await;
    let peer: SocketAddr = "192.0.2.10:55000".parse().unwrap();

    let mut statuses = Vec::new();
    for spoofed in ["1.1.1.1", "2.2.2.2"] {
      let mut req = Request::builder()
        .method("POST")
        .uri(format!("/api/matches/{}/votes", w.voting_match))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", spoofed)
        .body(Body::from(json!({ "player_id": w.striker }).to_string()))
        .unwrap();
      req.extensions_mut().insert(ConnectInfo(peer));
      statuses.push(router(w.state.clone()).oneshot(req).await.unwrap().status());
    }
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
  }

  #[tokio::test]
  async fn unreadable_forwarded_for_is_not_skipped() {
    let w = world().await;

    let req = Request::builder()
      .method("POST")
      .uri(format!("/api/matches/{}/votes", w.voting_match))
      .header(header::CONTENT_TYPE, "application/json")
      .header("x-forwarded-for", header::HeaderValue::from_bytes(b"\xff198.51.100.5").unwrap())
      .header("x-forwarded-for", "198.51.100.9")
      .body(Body::from(json!({ "player_id": w.striker }).to_string()))
      .unwrap();
    let resp = router(w.state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The second header never stood in for the unreadable first value.
    let resp = vote(&w, w.striker, &[xff("198.51.100.9")]).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn session_account_is_stable_across_addresses() {
    let w = world().await;
    let account = Uuid::new_v4();
    let bearer = format!("Bearer {}", w.state.sessions.issue(account));

    let first = vote(&w, w.striker, &[(header::AUTHORIZATION, bearer.as_str()), xff("10.0.0.1")]).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = vote(&w, w.striker, &[(header::AUTHORIZATION, bearer.as_str()), xff("10.0.0.2")]).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The account's vote does not block the anonymous path from that address.
    let anon = vote(&w, w.keeper, &[xff("10.0.0.1")]).await;
    assert_eq!(anon.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn invalid_session_falls_back_to_address() {
    let w = world().await;
    let forged = format!("Bearer {}.deadbeef", Uuid::new_v4());
    let resp = vote(&w, w.striker, &[(header::AUTHORIZATION, forged.as_str()), xff("10.9.9.9")]).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let again = vote(&w, w.striker, &[xff("10.9.9.9")]).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
  }

  // ── Likes ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn like_toggles_and_summarises() {
    let w = world().await;
    let like = format!("/api/messages/{}/like", w.message);
    let likes = format!("/api/messages/{}/likes", w.message);

    let resp = send(&w.state, "POST", &like, &[xff("10.0.0.1")], None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["liked"], true);
    send(&w.state, "POST", &like, &[xff("10.0.0.2")], None).await;

    let summary = json_body(send(&w.state, "GET", &likes, &[xff("10.0.0.1")], None).await).await;
    assert_eq!((summary["count"].clone(), summary["liked"].clone()), (json!(2), json!(true)));

    let resp = send(&w.state, "POST", &like, &[xff("10.0.0.1")], None).await;
    assert_eq!(json_body(resp).await["liked"], false);

    let summary = json_body(send(&w.state, "GET", &likes, &[xff("10.0.0.1")], None).await).await;
    assert_eq!((summary["count"].clone(), summary["liked"].clone()), (json!(1), json!(false)));
  }

  #[tokio::test]
  async fn like_on_unknown_message_is_not_found() {
    let w = world().await;
    let uri = format!("/api/messages/{}/like", Uuid::new_v4());
    let resp = send(&w.state, "POST", &uri, &[], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Admin ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_routes_require_credentials() {
    let w = world().await;
    let uri = format!("/api/admin/matches/{}/voting", w.voting_match);

    let resp = send(&w.state, "PUT", &uri, &[], Some(json!({ "open": false }))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = format!("Basic {}", B64.encode("admin:wrong"));
    let resp = send(&w.state, "PUT", &uri, &[(header::AUTHORIZATION, wrong.as_str())], Some(json!({ "open": false }))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn admin_sets_deadline_and_unknown_match_is_not_found() {
    let w = world().await;
    let auth = admin_header();

    let resp = send(
      &w.state,
      "PUT",
      &format!("/api/admin/matches/{}/voting", w.voting_match),
      &[(header::AUTHORIZATION, auth.as_str())],
      Some(json!({ "open": true, "deadline": "2000-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    // Deadline in the past: closed even though the switch is on.
    assert_eq!(vote(&w, w.striker, &[xff("10.0.0.1")]).await.status(), StatusCode::FORBIDDEN);

    let resp = send(
      &w.state,
      "PUT",
      &format!("/api/admin/matches/{}/voting", Uuid::new_v4()),
      &[(header::AUTHORIZATION, auth.as_str())],
      Some(json!({ "open": true })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn admin_retracts_a_vote() {
    let w = world().await;
    let auth = admin_header();
    assert_eq!(vote(&w, w.striker, &[xff("10.0.0.5")]).await.status(), StatusCode::CREATED);

    let uri = format!("/api/admin/matches/{}/votes/address:10.0.0.5", w.voting_match);
    let resp = send(&w.state, "DELETE", &uri, &[(header::AUTHORIZATION, auth.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&w.state, "DELETE", &uri, &[(header::AUTHORIZATION, auth.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The voter may vote again.
    assert_eq!(vote(&w, w.keeper, &[xff("10.0.0.5")]).await.status(), StatusCode::CREATED);

    let bad = format!("/api/admin/matches/{}/votes/somebody", w.voting_match);
    let resp = send(&w.state, "DELETE", &bad, &[(header::AUTHORIZATION, auth.as_str())], None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
