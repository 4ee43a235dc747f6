//! SQL schema for the GameInsight SQLite store.
//!
//! Executed once at connection startup. There is no migration tooling; the
//! version number in `PRAGMA user_version` only records which layout a file
//! was created with.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per replay. Rows are only ever replaced wholesale
-- (INSERT OR REPLACE) or deleted by an operator.
CREATE TABLE IF NOT EXISTS matches (
    replay_id   TEXT PRIMARY KEY,
    date        TEXT NOT NULL,     -- upstream ISO 8601; sorted lexicographically
    duration    INTEGER NOT NULL,  -- seconds
    playlist    TEXT NOT NULL,
    result      TEXT NOT NULL,     -- 'win' | 'loss'
    team_color  TEXT NOT NULL,     -- 'blue' | 'orange'

    -- Core
    goals               INTEGER NOT NULL DEFAULT 0,
    assists             INTEGER NOT NULL DEFAULT 0,
    saves               INTEGER NOT NULL DEFAULT 0,
    shots               INTEGER NOT NULL DEFAULT 0,
    score               INTEGER NOT NULL DEFAULT 0,
    shooting_percentage REAL    NOT NULL DEFAULT 0,

    -- Boost
    avg_boost           REAL    NOT NULL DEFAULT 0,
    percent_zero_boost  REAL    NOT NULL DEFAULT 0,
    percent_full_boost  REAL    NOT NULL DEFAULT 0,
    amount_collected    INTEGER NOT NULL DEFAULT 0,
    amount_stolen       INTEGER NOT NULL DEFAULT 0,

    -- Movement
    avg_speed           REAL    NOT NULL DEFAULT 0,
    time_supersonic     REAL    NOT NULL DEFAULT 0,
    percent_ground      REAL    NOT NULL DEFAULT 0,
    percent_low_air     REAL    NOT NULL DEFAULT 0,
    percent_high_air    REAL    NOT NULL DEFAULT 0,

    -- Positioning
    percent_defensive_third REAL NOT NULL DEFAULT 0,
    percent_offensive_third REAL NOT NULL DEFAULT 0,
    percent_neutral_third   REAL NOT NULL DEFAULT 0,
    time_behind_ball        REAL NOT NULL DEFAULT 0,
    time_infront_ball       REAL NOT NULL DEFAULT 0,

    analyzed_at TEXT NOT NULL,     -- RFC 3339 UTC; store-assigned
    stats_json  TEXT NOT NULL      -- full upstream per-player stats object
);

CREATE INDEX IF NOT EXISTS matches_date_idx        ON matches(date);
CREATE INDEX IF NOT EXISTS matches_result_date_idx ON matches(result, date);

PRAGMA user_version = 1;
";
