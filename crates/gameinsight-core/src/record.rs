//! Match records, the single row type of the match store.
//!
//! A record is written once per replay. Its metadata never changes after the
//! write; re-ingesting the same replay replaces the whole row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result, stats::MatchStats};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The side of the pitch a player was on.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TeamColor {
  Blue,
  Orange,
}

impl TeamColor {
  pub fn opponent(self) -> Self {
    match self {
      Self::Blue => Self::Orange,
      Self::Orange => Self::Blue,
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownTeamColor(s.to_owned()))
  }
}

/// The outcome of a match for the tracked player.
///
/// There is no draw: a level score counts as a loss.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
  Win,
  Loss,
}

impl Outcome {
  /// Derive the outcome from the goal totals of the player's side and the
  /// opposing side. Only a strictly greater total is a win.
  pub fn from_goals(own: i64, opponent: i64) -> Self {
    if own > opponent { Self::Win } else { Self::Loss }
  }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownOutcome(s.to_owned()))
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::MatchStore::upsert`].
/// `analyzed_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewMatch {
  pub replay_id:  String,
  /// Upstream ISO-8601 match date; compared lexicographically.
  pub date:       String,
  /// Match length in seconds.
  pub duration:   i64,
  pub playlist:   String,
  pub team_color: TeamColor,
  pub result:     Outcome,
  pub stats:      MatchStats,
  /// The full upstream per-player statistics object, kept for drill-down.
  pub raw_stats:  serde_json::Value,
}

impl NewMatch {
  pub fn info(&self) -> MatchInfo {
    MatchInfo {
      playlist: self.playlist.clone(),
      result:   self.result,
      duration: self.duration,
    }
  }
}

/// A stored match. Serialises flat, one key per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
  pub replay_id:   String,
  pub date:        String,
  pub duration:    i64,
  pub playlist:    String,
  pub team_color:  TeamColor,
  pub result:      Outcome,
  #[serde(flatten)]
  pub stats:       MatchStats,
  pub analyzed_at: DateTime<Utc>,
}

impl MatchRecord {
  pub fn info(&self) -> MatchInfo {
    MatchInfo {
      playlist: self.playlist.clone(),
      result:   self.result,
      duration: self.duration,
    }
  }
}

/// A stored match together with its deserialised raw statistics blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
  #[serde(flatten)]
  pub record:     MatchRecord,
  pub full_stats: serde_json::Value,
}

/// The metadata the analysis formatter needs about a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
  pub playlist: String,
  pub result:   Outcome,
  pub duration: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn outcome_is_win_only_when_strictly_ahead() {
    for own in 0..6 {
      for opponent in 0..6 {
        let expected = if own > opponent { Outcome::Win } else { Outcome::Loss };
        assert_eq!(Outcome::from_goals(own, opponent), expected, "{own}-{opponent}");
      }
    }
    assert_eq!(Outcome::from_goals(0, 0), Outcome::Loss);
  }

  #[test]
  fn enums_round_trip_through_strings() {
    assert_eq!(Outcome::parse("win").unwrap(), Outcome::Win);
    assert_eq!(Outcome::Loss.to_string(), "loss");
    assert_eq!(TeamColor::parse("orange").unwrap(), TeamColor::Orange);
    assert_eq!(TeamColor::Blue.opponent(), TeamColor::Orange);
    assert!(matches!(Outcome::parse("draw"), Err(Error::UnknownOutcome(s)) if s == "draw"));
  }
}
