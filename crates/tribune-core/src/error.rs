//! Error types for `tribune-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::league::MatchStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("player not found: {0}")]
  PlayerNotFound(Uuid),

  #[error("message not found: {0}")]
  MessageNotFound(Uuid),

  #[error("match cannot move from {from:?} to {to:?}")]
  InvalidTransition { from: MatchStatus, to: MatchStatus },

  /// The result store could not be reached or failed mid-operation. This is
  /// the only class the core does not recover from.
  #[error("result store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error as [`Error::StoreUnavailable`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
