//! ETags for derived read models.
//!
//! The tables are recomputed on every request, but identical inputs produce
//! byte-identical JSON, so a hash of the serialised body is a stable
//! validator. A client presenting a matching `If-None-Match` gets a bodiless
//! `304`.

use axum::{
  body::Body,
  http::{HeaderMap, StatusCode, header},
  response::Response,
};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Error;

/// Quoted SHA-256 hex digest of `body`.
pub fn compute_etag(body: &[u8]) -> String {
  let hash = Sha256::digest(body);
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` header value covers `etag`.
///
/// Accepts `*`, comma-separated lists, weak validators and bare (unquoted)
/// tags.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let Some(value) = headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) else {
    return false;
  };
  let wanted = etag.trim_matches('"');
  value.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || candidate.trim_start_matches("W/").trim_matches('"') == wanted
  })
}

/// Serialise `value` as JSON with an ETag, or answer `304` when the client
/// already holds it.
pub fn json_with_etag<T: Serialize>(headers: &HeaderMap, value: &T) -> Result<Response, Error> {
  let bytes = serde_json::to_vec(value).map_err(|e| Error::Internal(e.to_string()))?;
  let etag = compute_etag(&bytes);

  let builder = Response::builder().header(header::ETAG, &etag);
  let response = if if_none_match(headers, &etag) {
    builder.status(StatusCode::NOT_MODIFIED).body(Body::empty())
  } else {
    builder
      .status(StatusCode::OK)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(bytes))
  };
  response.map_err(|e| Error::Internal(e.to_string()))
}
