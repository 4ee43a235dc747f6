//! Per-match statistics and their aggregates.
//!
//! Statistics are grouped into four domains (core, boost, movement,
//! positioning). Each domain serialises flat so a stored match renders as a
//! single JSON object with one key per column.

use serde::{Deserialize, Serialize};

// ─── Domains ─────────────────────────────────────────────────────────────────

/// Scoring impact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreStats {
  pub goals:               i64,
  pub assists:             i64,
  pub saves:               i64,
  pub shots:               i64,
  pub score:               i64,
  pub shooting_percentage: f64,
}

/// Boost efficiency and recovery. Boost ranges from 0 to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoostStats {
  pub avg_boost:          f64,
  pub percent_zero_boost: f64,
  pub percent_full_boost: f64,
  pub amount_collected:   i64,
  pub amount_stolen:      i64,
}

/// Speed and pressure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementStats {
  pub avg_speed:        f64,
  /// Seconds spent at supersonic speed.
  pub time_supersonic:  f64,
  pub percent_ground:   f64,
  pub percent_low_air:  f64,
  pub percent_high_air: f64,
}

/// Rotations and field control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositioningStats {
  pub percent_defensive_third: f64,
  pub percent_offensive_third: f64,
  pub percent_neutral_third:   f64,
  pub time_behind_ball:        f64,
  pub time_infront_ball:       f64,
}

/// Every numeric statistic recorded for one player in one match.
///
/// Percentages are expected in `[0, 100]` but are stored as received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
  #[serde(flatten)]
  pub core:        CoreStats,
  #[serde(flatten)]
  pub boost:       BoostStats,
  #[serde(flatten)]
  pub movement:    MovementStats,
  #[serde(flatten)]
  pub positioning: PositioningStats,
}

/// Column names of every numeric statistic, in declaration order.
///
/// Storage backends use this to build aggregate queries; the order matches
/// the field order of [`StatAverages`].
pub const STAT_COLUMNS: [&str; 21] = [
  "goals",
  "assists",
  "saves",
  "shots",
  "score",
  "shooting_percentage",
  "avg_boost",
  "percent_zero_boost",
  "percent_full_boost",
  "amount_collected",
  "amount_stolen",
  "avg_speed",
  "time_supersonic",
  "percent_ground",
  "percent_low_air",
  "percent_high_air",
  "percent_defensive_third",
  "percent_offensive_third",
  "percent_neutral_third",
  "time_behind_ball",
  "time_infront_ball",
];

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Arithmetic means of every numeric statistic over a recency window.
///
/// `count` is the number of matches actually averaged, which may be smaller
/// than the requested window. An empty window yields `count == 0` and all
/// means zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAverages {
  pub count:                   u32,
  pub goals:                   f64,
  pub assists:                 f64,
  pub saves:                   f64,
  pub shots:                   f64,
  pub score:                   f64,
  pub shooting_percentage:     f64,
  pub avg_boost:               f64,
  pub percent_zero_boost:      f64,
  pub percent_full_boost:      f64,
  pub amount_collected:        f64,
  pub amount_stolen:           f64,
  pub avg_speed:               f64,
  pub time_supersonic:         f64,
  pub percent_ground:          f64,
  pub percent_low_air:         f64,
  pub percent_high_air:        f64,
  pub percent_defensive_third: f64,
  pub percent_offensive_third: f64,
  pub percent_neutral_third:   f64,
  pub time_behind_ball:        f64,
  pub time_infront_ball:       f64,
}

impl StatAverages {
  pub fn is_empty(&self) -> bool { self.count == 0 }
}

/// Which outcome partitions of a [`WinLossAverages`] contain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
  Both,
  WinsOnly,
  LossesOnly,
  Neither,
}

/// Averages computed separately over the most recent wins and the most
/// recent losses.
///
/// The two partitions use independent recency windows: `wins` covers the last
/// N wins and `losses` the last N losses, so they may span different date
/// ranges. This keeps both samples populated when the win/loss ratio is
/// skewed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WinLossAverages {
  pub wins:   StatAverages,
  pub losses: StatAverages,
}

impl WinLossAverages {
  pub fn total_wins(&self) -> u32 { self.wins.count }

  pub fn total_losses(&self) -> u32 { self.losses.count }

  pub fn coverage(&self) -> Coverage {
    match (self.wins.is_empty(), self.losses.is_empty()) {
      (false, false) => Coverage::Both,
      (false, true) => Coverage::WinsOnly,
      (true, false) => Coverage::LossesOnly,
      (true, true) => Coverage::Neither,
    }
  }
}
