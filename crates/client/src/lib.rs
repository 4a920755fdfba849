//! Client code for nfz-queues.
//!
//! This crate provides the paginating NFZ queue directory client and the
//! HTTP-backed geocoder used by the server.

pub mod google;
pub mod nfz;

pub use google::GoogleGeocoder;
pub use nfz::{NfzClient, NfzConfig, NfzError, QueuesSource};
