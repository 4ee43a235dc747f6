//! [`SqliteStore`], the SQLite implementation of [`MatchStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use gameinsight_core::{
  record::{MatchDetails, MatchRecord, NewMatch, Outcome},
  stats::{StatAverages, WinLossAverages},
  store::MatchStore,
};

use crate::{
  Result,
  encode::{
    RawMatch, averages_sql, encode_dt, encode_outcome, encode_team_color, read_averages,
    read_match, record_columns,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A match store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one background connection thread, so calls are serialized.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  /// Missing parent directories are created.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }

    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened match store");
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Averages over the `limit` most recent rows, restricted to `result` when
  /// given.
  async fn averages_for(
    &self,
    result: Option<Outcome>,
    limit: usize,
  ) -> Result<StatAverages> {
    let result_str = result.map(encode_outcome);
    let limit_val  = limit as i64;
    let sql        = averages_sql();

    let averages = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params![result_str, limit_val],
          read_averages,
        )?)
      })
      .await?;
    Ok(averages)
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = crate::Error;

  async fn exists(&self, replay_id: &str) -> Result<bool> {
    let id = replay_id.to_owned();

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM matches WHERE replay_id = ?1",
              rusqlite::params![id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn upsert(&self, input: NewMatch) -> Result<MatchRecord> {
    let record = MatchRecord {
      replay_id:   input.replay_id,
      date:        input.date,
      duration:    input.duration,
      playlist:    input.playlist,
      team_color:  input.team_color,
      result:      input.result,
      stats:       input.stats,
      analyzed_at: Utc::now(),
    };

    let replay_id       = record.replay_id.clone();
    let date            = record.date.clone();
    let duration        = record.duration;
    let playlist        = record.playlist.clone();
    let result_str      = encode_outcome(record.result);
    let team_color_str  = encode_team_color(record.team_color);
    let s               = record.stats;
    let analyzed_at_str = encode_dt(record.analyzed_at);
    let stats_json      = serde_json::to_string(&input.raw_stats)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO matches (
             replay_id, date, duration, playlist, result, team_color,
             goals, assists, saves, shots, score, shooting_percentage,
             avg_boost, percent_zero_boost, percent_full_boost,
             amount_collected, amount_stolen,
             avg_speed, time_supersonic, percent_ground, percent_low_air, percent_high_air,
             percent_defensive_third, percent_offensive_third, percent_neutral_third,
             time_behind_ball, time_infront_ball,
             analyzed_at, stats_json
           ) VALUES (
             ?1, ?2, ?3, ?4, ?5, ?6,
             ?7, ?8, ?9, ?10, ?11, ?12,
             ?13, ?14, ?15, ?16, ?17,
             ?18, ?19, ?20, ?21, ?22,
             ?23, ?24, ?25, ?26, ?27,
             ?28, ?29
           )",
          rusqlite::params![
            replay_id,
            date,
            duration,
            playlist,
            result_str,
            team_color_str,
            s.core.goals,
            s.core.assists,
            s.core.saves,
            s.core.shots,
            s.core.score,
            s.core.shooting_percentage,
            s.boost.avg_boost,
            s.boost.percent_zero_boost,
            s.boost.percent_full_boost,
            s.boost.amount_collected,
            s.boost.amount_stolen,
            s.movement.avg_speed,
            s.movement.time_supersonic,
            s.movement.percent_ground,
            s.movement.percent_low_air,
            s.movement.percent_high_air,
            s.positioning.percent_defensive_third,
            s.positioning.percent_offensive_third,
            s.positioning.percent_neutral_third,
            s.positioning.time_behind_ball,
            s.positioning.time_infront_ball,
            analyzed_at_str,
            stats_json,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get_by_id(&self, replay_id: &str) -> Result<Option<MatchDetails>> {
    let id  = replay_id.to_owned();
    let sql = format!(
      "SELECT {}, stats_json FROM matches WHERE replay_id = ?1",
      record_columns()
    );

    let raw: Option<(RawMatch, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], |row| {
              let raw = read_match(row)?;
              let blob: String = row.get("stats_json")?;
              Ok((raw, blob))
            })
            .optional()?,
        )
      })
      .await?;

    let Some((raw, blob)) = raw else {
      return Ok(None);
    };

    Ok(Some(MatchDetails {
      record:     raw.into_record()?,
      full_stats: serde_json::from_str(&blob)?,
    }))
  }

  async fn recent(&self, limit: usize) -> Result<Vec<MatchRecord>> {
    let limit_val = limit as i64;
    let sql       = format!(
      "SELECT {} FROM matches ORDER BY date DESC, replay_id DESC LIMIT ?1",
      record_columns()
    );

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], read_match)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_record).collect()
  }

  async fn average(&self, limit: usize) -> Result<StatAverages> {
    self.averages_for(None, limit).await
  }

  async fn win_loss_average(&self, limit: usize) -> Result<WinLossAverages> {
    // Two independent windows: the last `limit` wins and the last `limit`
    // losses, not the last `limit` matches split by outcome.
    let wins   = self.averages_for(Some(Outcome::Win), limit).await?;
    let losses = self.averages_for(Some(Outcome::Loss), limit).await?;
    Ok(WinLossAverages { wins, losses })
  }

  async fn remove(&self, replay_id: &str) -> Result<bool> {
    let id = replay_id.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM matches WHERE replay_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM matches", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }
}
