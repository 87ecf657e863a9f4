//! Signed session tokens issued by the surrounding account system.
//!
//! A token is `<account_uuid>.<hex HMAC-SHA256(secret, account_uuid)>`. The
//! server only verifies tokens; it never stores sessions. A token that fails
//! verification is treated as absent, so the caller falls back to the
//! anonymous path instead of being rejected.

use axum::http::{HeaderMap, header};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying a session token when no bearer header is sent.
pub const SESSION_COOKIE: &str = "tribune_session";

#[derive(Clone)]
pub struct SessionKeys {
  mac: HmacSha256,
}

impl SessionKeys {
  pub fn new(secret: &str) -> Result<Self, hmac::digest::InvalidLength> {
    Ok(Self { mac: HmacSha256::new_from_slice(secret.as_bytes())? })
  }

  fn signature(&self, account: Uuid) -> HmacSha256 {
    let mut mac = self.mac.clone();
    mac.update(account.hyphenated().to_string().as_bytes());
    mac
  }

  pub fn issue(&self, account: Uuid) -> String {
    let sig = self.signature(account).finalize().into_bytes();
    format!("{}.{}", account.hyphenated(), hex::encode(sig))
  }

  /// The account a token was issued for, if the signature checks out.
  pub fn verify(&self, token: &str) -> Option<Uuid> {
    let (id, sig) = token.trim().split_once('.')?;
    let account = Uuid::parse_str(id).ok()?;
    let sig = hex::decode(sig).ok()?;
    self.signature(account).verify_slice(&sig).ok()?;
    Some(account)
  }

  /// Verified account from `Authorization: Bearer` or the session cookie.
  pub fn account_from_headers(&self, headers: &HeaderMap) -> Option<Uuid> {
    bearer_token(headers)
      .and_then(|t| self.verify(t))
      .or_else(|| cookie_token(headers).and_then(|t| self.verify(t)))
  }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .find_map(|pair| {
      let (name, value) = pair.trim().split_once('=')?;
      (name == SESSION_COOKIE).then_some(value)
    })
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn keys() -> SessionKeys { SessionKeys::new("test-secret").unwrap() }

  #[test]
  fn issued_token_verifies() {
    let account = Uuid::new_v4();
    let token = keys().issue(account);
    assert_eq!(keys().verify(&token), Some(account));
  }

  #[test]
  fn token_from_other_secret_is_rejected() {
    let other = SessionKeys::new("another-secret").unwrap();
    let token = other.issue(Uuid::new_v4());
    assert_eq!(keys().verify(&token), None);
  }

  #[test]
  fn tampered_account_is_rejected() {
    let token = keys().issue(Uuid::new_v4());
    let (_, sig) = token.split_once('.').unwrap();
    let forged = format!("{}.{sig}", Uuid::new_v4());
    assert_eq!(keys().verify(&forged), None);
  }

  #[test]
  fn garbage_is_rejected() {
    for token in ["", ".", "not-a-uuid.abcd", "no-dot-at-all"] {
      assert_eq!(keys().verify(token), None, "{token:?}");
    }
  }

  #[test]
  fn reads_bearer_then_cookie() {
    let account = Uuid::new_v4();
    let token = keys().issue(account);

    let mut bearer = HeaderMap::new();
    bearer.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
    assert_eq!(keys().account_from_headers(&bearer), Some(account));

    let mut cookie = HeaderMap::new();
    cookie.insert(
      header::COOKIE,
      HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}")).unwrap(),
    );
    assert_eq!(keys().account_from_headers(&cookie), Some(account));
  }

  #[test]
  fn invalid_bearer_still_allows_valid_cookie() {
    let account = Uuid::new_v4();
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer junk"));
    headers.insert(
      header::COOKIE,
      HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", keys().issue(account))).unwrap(),
    );
    assert_eq!(keys().account_from_headers(&headers), Some(account));
  }
}
