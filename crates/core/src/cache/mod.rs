//! SQLite-backed cache for upstream queue result sets and geocoded addresses.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Query-aware lookups: a stored broader query answers a narrower one
//! - Atomic, append-only storage of result sets (newest entry wins)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod addresses;
pub mod connection;
pub mod hash;
pub mod matching;
pub mod migrations;
pub mod queues;

pub use crate::Error;

pub use connection::CacheDb;
pub use matching::{record_matches, refine, stored_subsumes};
