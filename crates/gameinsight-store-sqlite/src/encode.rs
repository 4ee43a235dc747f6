//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, enums as their lowercase names,
//! and the raw statistics blob as compact JSON.

use chrono::{DateTime, Utc};
use gameinsight_core::{
  record::{MatchRecord, Outcome, TeamColor},
  stats::{
    BoostStats, CoreStats, MatchStats, MovementStats, PositioningStats, STAT_COLUMNS,
    StatAverages,
  },
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_outcome(o: Outcome) -> &'static str { o.into() }

pub fn encode_team_color(c: TeamColor) -> &'static str { c.into() }

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Column list for reading a [`MatchRecord`], in the order [`read_match`]
/// expects.
pub fn record_columns() -> String {
  format!(
    "replay_id, date, duration, playlist, result, team_color, {}, analyzed_at",
    STAT_COLUMNS.join(", ")
  )
}

/// Aggregate query over the `?2` most recent rows, optionally restricted to
/// `result = ?1`. `?1` is bound as NULL for the unrestricted variant.
pub fn averages_sql() -> String {
  let means: Vec<String> = STAT_COLUMNS
    .iter()
    .map(|c| format!("COALESCE(AVG({c}), 0.0)"))
    .collect();
  format!(
    "SELECT COUNT(*), {}
     FROM (
       SELECT * FROM matches
       WHERE ?1 IS NULL OR result = ?1
       ORDER BY date DESC, replay_id DESC
       LIMIT ?2
     )",
    means.join(", ")
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `matches` row with enum and timestamp columns still undecoded.
pub struct RawMatch {
  pub replay_id:   String,
  pub date:        String,
  pub duration:    i64,
  pub playlist:    String,
  pub result:      String,
  pub team_color:  String,
  pub stats:       MatchStats,
  pub analyzed_at: String,
}

impl RawMatch {
  pub fn into_record(self) -> Result<MatchRecord> {
    Ok(MatchRecord {
      replay_id:   self.replay_id,
      date:        self.date,
      duration:    self.duration,
      playlist:    self.playlist,
      result:      Outcome::parse(&self.result)?,
      team_color:  TeamColor::parse(&self.team_color)?,
      stats:       self.stats,
      analyzed_at: decode_dt(&self.analyzed_at)?,
    })
  }
}

/// Read the columns produced by [`record_columns`] starting at index 0.
pub fn read_match(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMatch> {
  Ok(RawMatch {
    replay_id:   row.get(0)?,
    date:        row.get(1)?,
    duration:    row.get(2)?,
    playlist:    row.get(3)?,
    result:      row.get(4)?,
    team_color:  row.get(5)?,
    stats:       read_stats(row, 6)?,
    analyzed_at: row.get(6 + STAT_COLUMNS.len())?,
  })
}

/// Read the [`STAT_COLUMNS`] block starting at column `at`.
fn read_stats(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<MatchStats> {
  Ok(MatchStats {
    core:        CoreStats {
      goals:               row.get(at)?,
      assists:             row.get(at + 1)?,
      saves:               row.get(at + 2)?,
      shots:               row.get(at + 3)?,
      score:               row.get(at + 4)?,
      shooting_percentage: row.get(at + 5)?,
    },
    boost:       BoostStats {
      avg_boost:          row.get(at + 6)?,
      percent_zero_boost: row.get(at + 7)?,
      percent_full_boost: row.get(at + 8)?,
      amount_collected:   row.get(at + 9)?,
      amount_stolen:      row.get(at + 10)?,
    },
    movement:    MovementStats {
      avg_speed:        row.get(at + 11)?,
      time_supersonic:  row.get(at + 12)?,
      percent_ground:   row.get(at + 13)?,
      percent_low_air:  row.get(at + 14)?,
      percent_high_air: row.get(at + 15)?,
    },
    positioning: PositioningStats {
      percent_defensive_third: row.get(at + 16)?,
      percent_offensive_third: row.get(at + 17)?,
      percent_neutral_third:   row.get(at + 18)?,
      time_behind_ball:        row.get(at + 19)?,
      time_infront_ball:       row.get(at + 20)?,
    },
  })
}

/// Read a row produced by [`averages_sql`].
pub fn read_averages(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatAverages> {
  let count: i64 = row.get(0)?;
  Ok(StatAverages {
    count:                   u32::try_from(count).unwrap_or(u32::MAX),
    goals:                   row.get(1)?,
    assists:                 row.get(2)?,
    saves:                   row.get(3)?,
    shots:                   row.get(4)?,
    score:                   row.get(5)?,
    shooting_percentage:     row.get(6)?,
    avg_boost:               row.get(7)?,
    percent_zero_boost:      row.get(8)?,
    percent_full_boost:      row.get(9)?,
    amount_collected:        row.get(10)?,
    amount_stolen:           row.get(11)?,
    avg_speed:               row.get(12)?,
    time_supersonic:         row.get(13)?,
    percent_ground:          row.get(14)?,
    percent_low_air:         row.get(15)?,
    percent_high_air:        row.get(16)?,
    percent_defensive_third: row.get(17)?,
    percent_offensive_third: row.get(18)?,
    percent_neutral_third:   row.get(19)?,
    time_behind_ball:        row.get(20)?,
    time_infront_ball:       row.get(21)?,
  })
}
