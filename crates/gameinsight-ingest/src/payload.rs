//! Typed schema for Ballchasing API responses.
//!
//! Only the fields GameInsight reads are modelled. Every statistic leaf
//! defaults to zero when it is absent or `null`, so code past this module
//! never has to guess whether a field is present.

use gameinsight_core::stats::{BoostStats, CoreStats, MatchStats, MovementStats, PositioningStats};
use serde::{Deserialize, Deserializer};

// ─── Lenient leaves ──────────────────────────────────────────────────────────

/// Treat an explicit `null` like an absent field.
fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Accept any JSON number (or `null`) for an integer statistic. Fractional
/// values are rounded.
fn lenient_int<'de, D>(d: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<f64>::deserialize(d)?.map(|v| v.round() as i64).unwrap_or(0))
}

// ─── Replay list ─────────────────────────────────────────────────────────────

/// Response of `GET /replays`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayList {
  #[serde(default)]
  pub list: Vec<ReplaySummary>,
}

/// One entry of a replay listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaySummary {
  pub id:           String,
  #[serde(default)]
  pub replay_title: Option<String>,
  #[serde(default)]
  pub date:         Option<String>,
}

impl ReplaySummary {
  pub fn title(&self) -> &str { self.replay_title.as_deref().unwrap_or("Untitled") }
}

// ─── Replay details ──────────────────────────────────────────────────────────

/// Response of `GET /replays/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayDetails {
  pub id:            String,
  #[serde(default, deserialize_with = "null_default")]
  pub date:          String,
  #[serde(default, deserialize_with = "lenient_int")]
  pub duration:      i64,
  #[serde(default)]
  pub playlist_name: Option<String>,
  #[serde(default)]
  pub blue:          Side,
  #[serde(default)]
  pub orange:        Side,
}

impl ReplayDetails {
  pub fn playlist(&self) -> &str { self.playlist_name.as_deref().unwrap_or("Unknown") }
}

/// One team in a replay.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Side {
  #[serde(default)]
  pub players: Vec<Player>,
  #[serde(default)]
  pub stats:   TeamStats,
}

impl Side {
  /// The team's goal total. Falls back to the sum of its players' goals when
  /// the team-level figure is missing.
  pub fn goals(&self) -> i64 {
    self
      .stats
      .core
      .goals
      .unwrap_or_else(|| self.players.iter().map(|p| p.stats.core.goals).sum())
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamStats {
  #[serde(default)]
  pub core: TeamCore,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamCore {
  #[serde(default)]
  pub goals: Option<i64>,
}

// ─── Players ─────────────────────────────────────────────────────────────────

/// A platform-scoped player identity, e.g. `{"platform": "steam", "id": "7656…"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerId {
  #[serde(default, deserialize_with = "null_default")]
  pub platform: String,
  #[serde(default, deserialize_with = "null_default")]
  pub id:       String,
}

/// A player in a replay, with both typed statistics and the untouched
/// upstream statistics object.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawPlayer")]
pub struct Player {
  pub id:        PlayerId,
  pub name:      String,
  pub stats:     PlayerStats,
  pub raw_stats: serde_json::Value,
}

#[derive(Deserialize)]
struct RawPlayer {
  #[serde(default, deserialize_with = "null_default")]
  id:    PlayerId,
  #[serde(default, deserialize_with = "null_default")]
  name:  String,
  #[serde(default)]
  stats: serde_json::Value,
}

impl TryFrom<RawPlayer> for Player {
  type Error = serde_json::Error;

  fn try_from(raw: RawPlayer) -> Result<Self, Self::Error> {
    let raw_stats = match raw.stats {
      serde_json::Value::Null => serde_json::Value::Object(Default::default()),
      other => other,
    };
    let stats = serde_json::from_value(raw_stats.clone())?;
    Ok(Self { id: raw.id, name: raw.name, stats, raw_stats })
  }
}

/// The statistic groups of one player, using upstream field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStats {
  #[serde(default, deserialize_with = "null_default")]
  pub core:        UpstreamCore,
  #[serde(default, deserialize_with = "null_default")]
  pub boost:       UpstreamBoost,
  #[serde(default, deserialize_with = "null_default")]
  pub movement:    UpstreamMovement,
  #[serde(default, deserialize_with = "null_default")]
  pub positioning: UpstreamPositioning,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamCore {
  #[serde(default, deserialize_with = "lenient_int")]
  pub goals:               i64,
  #[serde(default, deserialize_with = "lenient_int")]
  pub assists:             i64,
  #[serde(default, deserialize_with = "lenient_int")]
  pub saves:               i64,
  #[serde(default, deserialize_with = "lenient_int")]
  pub shots:               i64,
  #[serde(default, deserialize_with = "lenient_int")]
  pub score:               i64,
  #[serde(default, deserialize_with = "null_default")]
  pub shooting_percentage: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamBoost {
  #[serde(default, deserialize_with = "null_default")]
  pub avg_amount:         f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_zero_boost: f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_full_boost: f64,
  #[serde(default, deserialize_with = "lenient_int")]
  pub amount_collected:   i64,
  #[serde(default, deserialize_with = "lenient_int")]
  pub amount_stolen:      i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamMovement {
  #[serde(default, deserialize_with = "null_default")]
  pub avg_speed:             f64,
  #[serde(default, deserialize_with = "null_default")]
  pub time_supersonic_speed: f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_ground:        f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_low_air:       f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_high_air:      f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamPositioning {
  #[serde(default, deserialize_with = "null_default")]
  pub percent_defensive_third: f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_offensive_third: f64,
  #[serde(default, deserialize_with = "null_default")]
  pub percent_neutral_third:   f64,
  #[serde(default, deserialize_with = "null_default")]
  pub time_behind_ball:        f64,
  #[serde(default, deserialize_with = "null_default")]
  pub time_infront_ball:       f64,
}

impl From<&PlayerStats> for MatchStats {
  fn from(s: &PlayerStats) -> Self {
    MatchStats {
      core:        CoreStats {
        goals:               s.core.goals,
        assists:             s.core.assists,
        saves:               s.core.saves,
        shots:               s.core.shots,
        score:               s.core.score,
        shooting_percentage: s.core.shooting_percentage,
      },
      boost:       BoostStats {
        avg_boost:          s.boost.avg_amount,
        percent_zero_boost: s.boost.percent_zero_boost,
        percent_full_boost: s.boost.percent_full_boost,
        amount_collected:   s.boost.amount_collected,
        amount_stolen:      s.boost.amount_stolen,
      },
      movement:    MovementStats {
        avg_speed:        s.movement.avg_speed,
        time_supersonic:  s.movement.time_supersonic_speed,
        percent_ground:   s.movement.percent_ground,
        percent_low_air:  s.movement.percent_low_air,
        percent_high_air: s.movement.percent_high_air,
      },
      positioning: PositioningStats {
        percent_defensive_third: s.positioning.percent_defensive_third,
        percent_offensive_third: s.positioning.percent_offensive_third,
        percent_neutral_third:   s.positioning.percent_neutral_third,
        time_behind_ball:        s.positioning.time_behind_ball,
        time_infront_ball:       s.positioning.time_infront_ball,
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn absent_and_null_leaves_default_to_zero() {
    let details: ReplayDetails = serde_json::from_value(json!({
      "id": "r1",
      "blue": {
        "players": [{
          "id": { "platform": "steam", "id": "p1" },
          "name": "Alice",
          "stats": {
            "core": { "goals": 2, "saves": null },
            "boost": { "avg_amount": 48.5 },
            "movement": null
          }
        }]
      }
    }))
    .unwrap();

    let player = &details.blue.players[0];
    let stats = MatchStats::from(&player.stats);
    assert_eq!(stats.core.goals, 2);
    assert_eq!(stats.core.saves, 0);
    assert_eq!(stats.boost.avg_boost, 48.5);
    assert_eq!(stats.movement.avg_speed, 0.0);
    assert_eq!(stats.positioning, PositioningStats::default());
    assert_eq!(details.duration, 0);
    assert_eq!(details.playlist(), "Unknown");
    assert!(details.orange.players.is_empty());
  }

  #[test]
  fn raw_stats_are_kept_verbatim() {
    let player: Player = serde_json::from_value(json!({
      "id": { "platform": "epic", "id": "e1" },
      "name": "Bob",
      "stats": { "demo": { "inflicted": 3 }, "core": { "goals": 1.0 } }
    }))
    .unwrap();

    assert_eq!(player.stats.core.goals, 1);
    assert_eq!(player.raw_stats["demo"]["inflicted"], 3);
  }

  #[test]
  fn renamed_upstream_fields_map_onto_match_stats() {
    let stats: PlayerStats = serde_json::from_value(json!({
      "boost": { "avg_amount": 51.0, "amount_stolen": 120 },
      "movement": { "time_supersonic_speed": 33.2, "avg_speed": 1520 }
    }))
    .unwrap();
    let mapped = MatchStats::from(&stats);
    assert_eq!(mapped.boost.avg_boost, 51.0);
    assert_eq!(mapped.boost.amount_stolen, 120);
    assert_eq!(mapped.movement.time_supersonic, 33.2);
    assert_eq!(mapped.movement.avg_speed, 1520.0);
  }

  #[test]
  fn side_goals_fall_back_to_player_sum() {
    let side: Side = serde_json::from_value(json!({
      "players": [
        { "stats": { "core": { "goals": 2 } } },
        { "stats": { "core": { "goals": 1 } } }
      ]
    }))
    .unwrap();
    assert_eq!(side.goals(), 3);

    let with_total: Side = serde_json::from_value(json!({
      "stats": { "core": { "goals": 5 } },
      "players": []
    }))
    .unwrap();
    assert_eq!(with_total.goals(), 5);
  }
}
