//! The `Caller` extractor: binds the transport to the core's identity policy.

use std::net::SocketAddr;

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::request::Parts,
};
use tribune_core::{
  identity::{Identity, RequestHints},
  store::ResultStore,
};

use crate::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The deduplication identity of the current request.
///
/// Never rejects: a missing or invalid session falls back to the address
/// path, and a missing address falls back to the `unknown` sentinel.
pub struct Caller(pub Identity);

/// Collect what the transport knows about a request.
pub fn hints<S>(parts: &Parts, state: &AppState<S>) -> RequestHints
where
  S: ResultStore + Clone + 'static,
{
  let forwarded_for = if state.config.trust_forwarded_for {
    parts
      .headers
      .get(X_FORWARDED_FOR)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string)
  } else {
    None
  };

  RequestHints {
    account: state.sessions.account_from_headers(&parts.headers),
    forwarded_for,
    peer: parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| addr.ip()),
  }
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: ResultStore + Clone + 'static,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let identity = state.resolver.resolve(&hints(parts, state));
    Ok(Caller(identity))
  }
}
