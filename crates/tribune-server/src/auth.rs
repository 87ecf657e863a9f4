//! HTTP Basic-auth extractor for the admin routes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use tribune_core::store::ResultStore;

use crate::{AppState, error::Error};

/// Credentials accepted for the admin routes.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the request came from the
/// league administrator.
pub struct Admin;

/// Split a `Basic` authorization header into its username and password.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(axum::http::header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let (username, password) = std::str::from_utf8(&decoded).ok()?.split_once(':')?;
  Some((username.to_string(), password.to_string()))
}

/// Check the request's Basic credentials against the configured administrator.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let (username, password) = basic_credentials(headers).ok_or(Error::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&config.password_hash).map_err(|e| {
    tracing::error!(error = %e, "admin_password_hash is not a valid PHC string");
    Error::Unauthorized
  })?;

  let password_ok = Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .is_ok();

  if username != config.username || !password_ok {
    tracing::warn!(%username, "rejected admin credentials");
    return Err(Error::Unauthorized);
  }

  Ok(())
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: ResultStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Admin)
  }
}
