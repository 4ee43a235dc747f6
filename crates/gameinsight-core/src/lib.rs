//! Core types and trait definitions for GameInsight.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backend, the ingestion adapter and the tool layer all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod query;
pub mod record;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
