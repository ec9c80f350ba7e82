//! SQLite backend for the document logbook.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every successful write is announced on
//! a broadcast channel; see [`SqliteStore::subscribe`].

mod encode;
mod notify;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use notify::EVENT_BUFFER;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
