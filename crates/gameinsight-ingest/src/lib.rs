//! Upstream replay ingestion for GameInsight.
//!
//! - [`payload`]: typed schema for the Ballchasing replay API, decoded once
//!   at the boundary with defaults for every absent statistic.
//! - [`adapter`]: maps a replay plus the tracked player's identity onto a
//!   [`gameinsight_core::record::NewMatch`].
//! - [`client`]: the rate-limited HTTP client behind [`client::ReplaySource`].

pub mod adapter;
pub mod client;
pub mod error;
pub mod payload;

pub use error::{Error, Result};
