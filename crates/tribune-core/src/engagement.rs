//! Likes on fan messages.
//!
//! One row per (message, identity). Unliking deletes the row; there is no
//! inactive state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
  pub message_id: Uuid,
  /// Membership after the toggle.
  pub liked:      bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSummary {
  pub message_id: Uuid,
  pub count:      u64,
  /// Whether the requesting identity currently likes the message.
  pub liked:      bool,
}
