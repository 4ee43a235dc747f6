//! Filtered, sorted queries over the recent-match pool.
//!
//! Queries never scan the whole store. They pull the [`QUERY_POOL_SIZE`] most
//! recent matches and filter, sort and truncate that pool in memory, so a
//! query for matches older than the pool boundary returns fewer (or no)
//! results.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  record::{MatchRecord, Outcome},
  store::MatchStore,
};

/// Number of most recent matches every query filters over.
pub const QUERY_POOL_SIZE: usize = 100;

/// Number of matches returned when the caller does not set a limit.
pub const DEFAULT_QUERY_LIMIT: usize = 10;

// ─── Query type ──────────────────────────────────────────────────────────────

/// The metric a query sorts by. Every ordering is descending.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
  /// Most recent first.
  #[default]
  Date,
  Goals,
  Score,
  ShootingPercentage,
}

impl SortKey {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSortKey(s.to_owned()))
  }
}

/// Parameters for [`query_matches`]. All filters are optional and
/// AND-combined; numeric and date bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
  pub result:      Option<Outcome>,
  pub min_goals:   Option<i64>,
  pub max_goals:   Option<i64>,
  pub min_saves:   Option<i64>,
  pub max_saves:   Option<i64>,
  /// ISO date string; compared lexicographically against the match date.
  pub date_after:  Option<String>,
  pub date_before: Option<String>,
  pub sort_by:     SortKey,
  pub limit:       usize,
}

impl Default for MatchQuery {
  fn default() -> Self {
    Self {
      result:      None,
      min_goals:   None,
      max_goals:   None,
      min_saves:   None,
      max_saves:   None,
      date_after:  None,
      date_before: None,
      sort_by:     SortKey::default(),
      limit:       DEFAULT_QUERY_LIMIT,
    }
  }
}

impl MatchQuery {
  /// Whether `record` passes every filter set on this query.
  pub fn matches(&self, record: &MatchRecord) -> bool {
    let goals = record.stats.core.goals;
    let saves = record.stats.core.saves;
    let date = record.date.as_str();

    self.result.is_none_or(|r| record.result == r)
      && self.min_goals.is_none_or(|min| goals >= min)
      && self.max_goals.is_none_or(|max| goals <= max)
      && self.min_saves.is_none_or(|min| saves >= min)
      && self.max_saves.is_none_or(|max| saves <= max)
      && self.date_after.as_deref().is_none_or(|after| date >= after)
      && self.date_before.as_deref().is_none_or(|before| date <= before)
  }
}

// ─── Execution ───────────────────────────────────────────────────────────────

/// Filter `pool`, sort the survivors by `query.sort_by` (descending, stable),
/// and keep at most `query.limit` of them.
pub fn filter_and_sort(pool: Vec<MatchRecord>, query: &MatchQuery) -> Vec<MatchRecord> {
  let mut records: Vec<MatchRecord> =
    pool.into_iter().filter(|r| query.matches(r)).collect();

  match query.sort_by {
    SortKey::Date => records.sort_by(|a, b| b.date.cmp(&a.date)),
    SortKey::Goals => {
      records.sort_by(|a, b| b.stats.core.goals.cmp(&a.stats.core.goals))
    }
    SortKey::Score => {
      records.sort_by(|a, b| b.stats.core.score.cmp(&a.stats.core.score))
    }
    SortKey::ShootingPercentage => records.sort_by(|a, b| {
      b.stats
        .core
        .shooting_percentage
        .total_cmp(&a.stats.core.shooting_percentage)
    }),
  }

  records.truncate(query.limit);
  records
}

/// Run `query` against the [`QUERY_POOL_SIZE`] most recent matches in
/// `store`.
pub async fn query_matches<S: MatchStore>(
  store: &S,
  query: &MatchQuery,
) -> Result<Vec<MatchRecord>, S::Error> {
  let pool = store.recent(QUERY_POOL_SIZE).await?;
  Ok(filter_and_sort(pool, query))
}
