//! SQLite backend for the Tribune result store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The vote and like ledgers are guarded
//! by UNIQUE constraints in the schema, so concurrent writers from any number
//! of processes sharing the file cannot double-count.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
