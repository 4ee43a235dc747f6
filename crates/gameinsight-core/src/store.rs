//! The `MatchStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `gameinsight-store-sqlite`). The ingestion pipeline and the query tools
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  record::{MatchDetails, MatchRecord, NewMatch},
  stats::{StatAverages, WinLossAverages},
};

/// Abstraction over a single-table match store keyed by replay id.
///
/// Recency always means "ordered by match `date`, descending". No call keeps
/// cursor state between invocations.
///
/// A missing record is a normal `Ok(None)` / `Ok(false)` result; errors are
/// reserved for storage failures.
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `true` iff a match with this replay id is stored.
  fn exists<'a>(
    &'a self,
    replay_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Insert a match, or fully replace the stored row sharing its replay id.
  /// The `analyzed_at` timestamp is set by the store.
  fn upsert(
    &self,
    input: NewMatch,
  ) -> impl Future<Output = Result<MatchRecord, Self::Error>> + Send + '_;

  /// Point lookup, including the deserialised raw statistics blob.
  fn get_by_id<'a>(
    &'a self,
    replay_id: &'a str,
  ) -> impl Future<Output = Result<Option<MatchDetails>, Self::Error>> + Send + 'a;

  /// Up to `limit` most recent matches, newest first.
  fn recent(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<MatchRecord>, Self::Error>> + Send + '_;

  /// Mean of every numeric statistic over the `limit` most recent matches.
  fn average(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<StatAverages, Self::Error>> + Send + '_;

  /// Averages over the `limit` most recent wins and, independently, the
  /// `limit` most recent losses.
  fn win_loss_average(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<WinLossAverages, Self::Error>> + Send + '_;

  /// Delete a match. Operator action only; returns `true` if a row was
  /// removed.
  fn remove<'a>(
    &'a self,
    replay_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Total number of stored matches.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
