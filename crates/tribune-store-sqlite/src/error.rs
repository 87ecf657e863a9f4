//! Error type for `tribune-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tribune_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("identity parse error: {0}")]
  Identity(#[from] tribune_core::identity::ParseIdentityError),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A text column held a value no enum variant maps to.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("match not found: {0}")]
  MatchNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
