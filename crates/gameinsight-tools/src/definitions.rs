//! Names, descriptions and JSON-schema parameter definitions of the query
//! tools, in the shape chat-completion APIs expect.

use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
  GetLatestMatch,
  GetWinLossComparison,
  QueryMatches,
  GetPlayerAverages,
  GetMatchDetails,
}

/// One tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
  pub name:        &'static str,
  pub description: &'static str,
  pub parameters:  Value,
}

impl ToolName {
  pub fn definition(self) -> ToolDefinition {
    ToolDefinition {
      name:        self.into(),
      description: self.description(),
      parameters:  self.parameters(),
    }
  }

  fn description(self) -> &'static str {
    match self {
      Self::GetLatestMatch => {
        "Get details about the most recent Rocket League match played. Returns full stats \
         including goals, assists, saves, boost usage, positioning, and movement data."
      }
      Self::GetWinLossComparison => {
        "Compare average stats between wins and losses to identify patterns. Takes the last \
         N wins and the last N losses (not necessarily consecutive games)."
      }
      Self::QueryMatches => {
        "Search and filter recent matches by result, goal and save ranges, and date range, \
         sorted by a chosen metric. Only the 100 most recent matches are searched."
      }
      Self::GetPlayerAverages => {
        "Get average stats over the player's recent matches regardless of result. Useful \
         for recent overall performance trends."
      }
      Self::GetMatchDetails => {
        "Get comprehensive details for a specific match by its replay ID, including the \
         full upstream stats. Use after query_matches to drill into specific games."
      }
    }
  }

  fn parameters(self) -> Value {
    match self {
      Self::GetLatestMatch => object(json!({}), &[]),
      Self::GetWinLossComparison => object(
        json!({
          "last_n_matches": {
            "type": "integer",
            "description": "Number of wins and of losses to compare (default 20)",
            "default": 20
          }
        }),
        &[],
      ),
      Self::QueryMatches => object(
        json!({
          "result": {
            "type": "string",
            "enum": ["win", "loss"],
            "description": "Filter by match result"
          },
          "min_goals": { "type": "integer", "description": "Minimum goals scored" },
          "max_goals": { "type": "integer", "description": "Maximum goals scored" },
          "min_saves": { "type": "integer", "description": "Minimum saves made" },
          "max_saves": { "type": "integer", "description": "Maximum saves made" },
          "date_after": {
            "type": "string",
            "description": "Only matches on or after this date (ISO format: 2024-10-01)"
          },
          "date_before": {
            "type": "string",
            "description": "Only matches on or before this date (ISO format: 2024-10-20)"
          },
          "sort_by": {
            "type": "string",
            "enum": ["date", "goals", "score", "shooting_percentage"],
            "description": "Sort results by this metric, descending (default: date)",
            "default": "date"
          },
          "limit": {
            "type": "integer",
            "description": "Maximum number of matches to return (default 10)",
            "default": 10
          }
        }),
        &[],
      ),
      Self::GetPlayerAverages => object(
        json!({
          "last_n_matches": {
            "type": "integer",
            "description": "Number of recent matches to average (default 10)",
            "default": 10
          }
        }),
        &[],
      ),
      Self::GetMatchDetails => object(
        json!({
          "replay_id": { "type": "string", "description": "The Ballchasing replay ID" }
        }),
        &["replay_id"],
      ),
    }
  }
}

fn object(properties: Value, required: &[&str]) -> Value {
  json!({ "type": "object", "properties": properties, "required": required })
}

/// Definitions of every tool, in a stable order.
pub fn definitions() -> Vec<ToolDefinition> {
  ToolName::iter().map(ToolName::definition).collect()
}
