//! Core types and shared functionality for nfz-queues.
//!
//! This crate provides:
//! - Filter queries and their validation rules
//! - Queue records as served by the NFZ directory
//! - Query-aware cache implementation with SQLite backend
//! - Geocoder abstraction with a cached decorator
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod query;
pub mod queue;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use geocoder::{CachingGeocoder, GeocodedAddress, Geocoder, HardcodedGeocoder};
pub use query::{FilterQuery, QueryViolation};
pub use queue::{Queue, QueueAttributes};
