//! Read-only query tools over a [`MatchStore`], for language-model tool
//! calling.
//!
//! [`Toolbox::call`] is the in-process entry point used by the agent loop;
//! it never fails and reports problems as `{"error": …}` objects.
//! [`http::tools_router`] exposes the same tools over HTTP.

pub mod args;
pub mod definitions;
pub mod error;
pub mod http;

use std::sync::Arc;

use gameinsight_core::{query::query_matches, store::MatchStore};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
  args::{AveragesArgs, ComparisonArgs, DetailsArgs, QueryArgs},
  definitions::ToolName,
};
pub use crate::{
  definitions::{ToolDefinition, definitions},
  error::{Result, ToolError},
};

/// Dispatches tool calls by name against a shared store.
pub struct Toolbox<S> {
  store: Arc<S>,
}

impl<S> Clone for Toolbox<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: MatchStore> Toolbox<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Run a tool and return its JSON result, or a `{"error": …}` object.
  pub async fn call(&self, name: &str, args: Value) -> Value {
    match self.execute(name, args).await {
      Ok(v) => v,
      Err(e) => {
        warn!(tool = name, "tool call failed: {e}");
        e.to_json()
      }
    }
  }

  /// Run a tool, keeping the failure kind.
  pub async fn execute(&self, name: &str, raw: Value) -> Result<Value> {
    let tool: ToolName =
      name.parse().map_err(|_| ToolError::UnknownTool(name.to_owned()))?;
    debug!(tool = name, args = %raw, "executing tool");

    match tool {
      ToolName::GetLatestMatch => {
        let latest = self
          .store
          .recent(1)
          .await
          .map_err(ToolError::store)?
          .into_iter()
          .next()
          .ok_or_else(|| ToolError::NotFound("No matches found in database".into()))?;
        to_value(&latest)
      }
      ToolName::GetWinLossComparison => {
        let a: ComparisonArgs = args::parse(raw)?;
        let wl = self
          .store
          .win_loss_average(a.last_n_matches)
          .await
          .map_err(ToolError::store)?;
        Ok(json!({
          "wins":           wl.wins,
          "losses":         wl.losses,
          "total_wins":     wl.total_wins(),
          "total_losses":   wl.total_losses(),
          "last_n_matches": a.last_n_matches,
        }))
      }
      ToolName::QueryMatches => {
        let a: QueryArgs = args::parse(raw)?;
        let matches = query_matches(self.store.as_ref(), &a.into())
          .await
          .map_err(ToolError::store)?;
        Ok(json!({ "count": matches.len(), "matches": matches }))
      }
      ToolName::GetPlayerAverages => {
        let a: AveragesArgs = args::parse(raw)?;
        let avg = self
          .store
          .average(a.last_n_matches)
          .await
          .map_err(ToolError::store)?;
        to_value(&avg)
      }
      ToolName::GetMatchDetails => {
        let a: DetailsArgs = args::parse(raw)?;
        if a.replay_id.is_empty() {
          return Err(ToolError::InvalidArguments("replay_id is required".into()));
        }
        let details = self
          .store
          .get_by_id(&a.replay_id)
          .await
          .map_err(ToolError::store)?
          .ok_or_else(|| {
            ToolError::NotFound(format!("Match {} not found in database", a.replay_id))
          })?;
        to_value(&details)
      }
    }
  }
}

fn to_value<T: Serialize>(v: &T) -> Result<Value> {
  serde_json::to_value(v).map_err(ToolError::store)
}

#[cfg(test)]
mod tests {
  use gameinsight_core::{
    record::{NewMatch, Outcome, TeamColor},
    stats::MatchStats,
  };
  use gameinsight_store_sqlite::SqliteStore;

  use super::*;

  async fn toolbox() -> Toolbox<SqliteStore> {
    Toolbox::new(Arc::new(SqliteStore::open_in_memory().await.unwrap()))
  }

  async fn seed(tb: &Toolbox<SqliteStore>) {
    for (id, date, result, goals, saves) in [
      ("a", "2024-10-03T20:00:00", Outcome::Win, 3, 1),
      ("b", "2024-10-02T20:00:00", Outcome::Loss, 0, 4),
      ("c", "2024-10-01T20:00:00", Outcome::Win, 1, 2),
    ] {
      let mut stats = MatchStats::default();
      stats.core.goals = goals;
      stats.core.saves = saves;
      tb.store
        .upsert(NewMatch {
          replay_id: id.into(),
          date: date.into(),
          duration: 300,
          playlist: "Ranked Doubles".into(),
          team_color: TeamColor::Blue,
          result,
          stats,
          raw_stats: json!({ "core": { "goals": goals } }),
        })
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn empty_store_reports_errors_instead_of_failing() {
    let tb = toolbox().await;
    let latest = tb.call("get_latest_match", json!({})).await;
    assert_eq!(latest["error"], "No matches found in database");

    let avg = tb.call("get_player_averages", Value::Null).await;
    assert_eq!(avg["count"], 0);
    assert_eq!(avg["goals"], 0.0);

    let q = tb.call("query_matches", json!({})).await;
    assert_eq!(q["count"], 0);
    assert_eq!(q["matches"], json!([]));
  }

  #[tokio::test]
  async fn latest_match_is_most_recent() {
    let tb = toolbox().await;
    seed(&tb).await;
    let latest = tb.call("get_latest_match", json!({})).await;
    assert_eq!(latest["replay_id"], "a");
    assert_eq!(latest["goals"], 3);
    assert_eq!(latest["result"], "win");
  }

  #[tokio::test]
  async fn comparison_and_averages_apply_defaults() {
    let tb = toolbox().await;
    seed(&tb).await;

    let wl = tb.call("get_win_loss_comparison", json!({})).await;
    assert_eq!(wl["last_n_matches"], 20);
    assert_eq!(wl["total_wins"], 2);
    assert_eq!(wl["total_losses"], 1);
    assert_eq!(wl["wins"]["goals"], 2.0);

    let avg = tb.call("get_player_averages", json!({ "last_n_matches": 2 })).await;
    assert_eq!(avg["count"], 2);
    assert_eq!(avg["goals"], 1.5);
  }

  #[tokio::test]
  async fn query_matches_wraps_results() {
    let tb = toolbox().await;
    seed(&tb).await;
    let out = tb
      .call("query_matches", json!({ "max_saves": 2, "sort_by": "goals" }))
      .await;
    assert_eq!(out["count"], 2);
    assert_eq!(out["matches"][0]["replay_id"], "a");
    assert_eq!(out["matches"][1]["replay_id"], "c");
  }

  #[tokio::test]
  async fn match_details_include_full_stats() {
    let tb = toolbox().await;
    seed(&tb).await;

    let d = tb.call("get_match_details", json!({ "replay_id": "b" })).await;
    assert_eq!(d["replay_id"], "b");
    assert_eq!(d["full_stats"]["core"]["goals"], 0);

    let missing = tb.call("get_match_details", json!({ "replay_id": "zzz" })).await;
    assert_eq!(missing["error"], "Match zzz not found in database");

    let empty = tb.call("get_match_details", json!({ "replay_id": "" })).await;
    assert!(empty["error"].as_str().unwrap().contains("replay_id"));
  }

  #[tokio::test]
  async fn unknown_tools_and_bad_arguments_never_raise() {
    let tb = toolbox().await;
    let unknown = tb.call("drop_everything", json!({})).await;
    assert_eq!(unknown["error"], "Unknown tool: drop_everything");

    let bad = tb.call("query_matches", json!({ "limit": "lots" })).await;
    assert!(bad["error"].as_str().unwrap().starts_with("invalid arguments"));

    assert!(matches!(
      tb.execute("get_match_details", json!({})).await,
      Err(ToolError::InvalidArguments(_))
    ));
  }
}
