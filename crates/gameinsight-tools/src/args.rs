//! Typed tool arguments.
//!
//! Every argument is optional except `replay_id`; a `null` or absent
//! argument object is treated as `{}`.

use gameinsight_core::{
  query::{DEFAULT_QUERY_LIMIT, MatchQuery, SortKey},
  record::Outcome,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{Result, ToolError};

/// Default window of `get_win_loss_comparison`, per partition.
pub const DEFAULT_COMPARISON_WINDOW: usize = 20;

/// Default window of `get_player_averages`.
pub const DEFAULT_AVERAGES_WINDOW: usize = 10;

fn default_comparison_window() -> usize { DEFAULT_COMPARISON_WINDOW }
fn default_averages_window() -> usize { DEFAULT_AVERAGES_WINDOW }
fn default_limit() -> usize { DEFAULT_QUERY_LIMIT }

/// Decode an argument object, mapping `null` to `{}`.
pub fn parse<T: DeserializeOwned>(args: Value) -> Result<T> {
  let args = match args {
    Value::Null => Value::Object(Default::default()),
    other => other,
  };
  serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonArgs {
  #[serde(default = "default_comparison_window")]
  pub last_n_matches: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AveragesArgs {
  #[serde(default = "default_averages_window")]
  pub last_n_matches: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetailsArgs {
  pub replay_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryArgs {
  #[serde(default)]
  pub result:      Option<Outcome>,
  #[serde(default)]
  pub min_goals:   Option<i64>,
  #[serde(default)]
  pub max_goals:   Option<i64>,
  #[serde(default)]
  pub min_saves:   Option<i64>,
  #[serde(default)]
  pub max_saves:   Option<i64>,
  #[serde(default)]
  pub date_after:  Option<String>,
  #[serde(default)]
  pub date_before: Option<String>,
  #[serde(default)]
  pub sort_by:     SortKey,
  #[serde(default = "default_limit")]
  pub limit:       usize,
}

impl From<QueryArgs> for MatchQuery {
  fn from(a: QueryArgs) -> Self {
    MatchQuery {
      result:      a.result,
      min_goals:   a.min_goals,
      max_goals:   a.max_goals,
      min_saves:   a.min_saves,
      max_saves:   a.max_saves,
      date_after:  a.date_after,
      date_before: a.date_before,
      sort_by:     a.sort_by,
      limit:       a.limit,
    }
  }
}
