//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("{0} not found")]
  NotFound(&'static str),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("internal error: {0}")]
  Internal(String),
  #[error("store unavailable: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tribune_core::Error> for Error {
  fn from(e: tribune_core::Error) -> Self {
    use tribune_core::Error as Core;
    match e {
      Core::MatchNotFound(_) => Error::NotFound("match"),
      Core::PlayerNotFound(_) => Error::NotFound("player"),
      Core::MessageNotFound(_) => Error::NotFound("message"),
      e @ Core::InvalidTransition { .. } => Error::BadRequest(e.to_string()),
      Core::StoreUnavailable(source) => Error::Store(source),
    }
  }
}

fn body(status: StatusCode, message: String) -> Response {
  (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = body(StatusCode::UNAUTHORIZED, "unauthorized".to_string());
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"tribune\""),
        );
        res
      }
      Error::NotFound(what) => body(StatusCode::NOT_FOUND, format!("{what} not found")),
      Error::BadRequest(msg) => body(StatusCode::BAD_REQUEST, msg),
      Error::Internal(msg) => {
        tracing::error!(error = %msg, "internal error");
        body(StatusCode::INTERNAL_SERVER_ERROR, msg)
      }
      Error::Store(e) => {
        tracing::error!(error = %e, "result store unavailable");
        body(StatusCode::SERVICE_UNAVAILABLE, "result store unavailable".to_string())
      }
    }
  }
}
