//! Core types and derivation logic for the Tribune league core.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the ranking algorithms, the identity policy and the ledger rules; storage
//! is reached only through the [`store::ResultStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod engagement;
pub mod error;
pub mod identity;
pub mod league;
pub mod player_stats;
pub mod scorers;
pub mod service;
pub mod standings;
pub mod store;
pub mod voting;

pub use error::{Error, Result};
pub use service::League;
