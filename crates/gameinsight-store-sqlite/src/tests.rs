//! Integration tests for `SqliteStore` against an in-memory database.

use gameinsight_core::{
  query::{MatchQuery, QUERY_POOL_SIZE, SortKey, query_matches},
  record::{NewMatch, Outcome, TeamColor},
  stats::MatchStats,
  store::MatchStore,
};
use serde_json::json;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_match(id: &str, date: &str, result: Outcome, goals: i64) -> NewMatch {
  let mut stats = MatchStats::default();
  stats.core.goals = goals;
  stats.core.saves = 1;
  stats.boost.avg_boost = 40.0 + goals as f64;
  stats.movement.avg_speed = 1500.0;
  NewMatch {
    replay_id: id.into(),
    date: date.into(),
    duration: 300,
    playlist: "Ranked Doubles".into(),
    team_color: TeamColor::Blue,
    result,
    stats,
    raw_stats: json!({ "core": { "goals": goals } }),
  }
}

// ─── Existence and point lookup ──────────────────────────────────────────────

#[tokio::test]
async fn exists_reflects_inserts() {
  let s = store().await;
  assert!(!s.exists("r1").await.unwrap());

  s.upsert(new_match("r1", "2024-10-01T20:00:00", Outcome::Win, 2))
    .await
    .unwrap();

  assert!(s.exists("r1").await.unwrap());
  assert!(!s.exists("r2").await.unwrap());
}

#[tokio::test]
async fn get_by_id_returns_record_and_raw_stats() {
  let s = store().await;
  let mut input = new_match("r1", "2024-10-01T20:00:00", Outcome::Win, 2);
  input.team_color = TeamColor::Orange;
  input.stats.positioning.time_infront_ball = 88.5;
  input.stats.boost.amount_stolen = 310;
  let written = s.upsert(input).await.unwrap();

  let details = s.get_by_id("r1").await.unwrap().expect("stored match");
  assert_eq!(details.record.replay_id, "r1");
  assert_eq!(details.record.team_color, TeamColor::Orange);
  assert_eq!(details.record.result, Outcome::Win);
  assert_eq!(details.record.stats, written.stats);
  assert_eq!(details.record.stats.positioning.time_infront_ball, 88.5);
  assert_eq!(details.record.stats.boost.amount_stolen, 310);
  assert_eq!(details.full_stats, json!({ "core": { "goals": 2 } }));
}

#[tokio::test]
async fn get_by_id_missing_returns_none() {
  let s = store().await;
  assert!(s.get_by_id("nope").await.unwrap().is_none());
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_replaces_existing_row() {
  let s = store().await;
  s.upsert(new_match("r1", "2024-10-01T20:00:00", Outcome::Win, 2))
    .await
    .unwrap();

  let mut second = new_match("r1", "2024-10-02T20:00:00", Outcome::Loss, 0);
  second.playlist = "Ranked Standard".into();
  s.upsert(second).await.unwrap();

  assert_eq!(s.count().await.unwrap(), 1);
  let stored = s.get_by_id("r1").await.unwrap().unwrap().record;
  assert_eq!(stored.result, Outcome::Loss);
  assert_eq!(stored.stats.core.goals, 0);
  assert_eq!(stored.playlist, "Ranked Standard");
  assert_eq!(stored.date, "2024-10-02T20:00:00");
}

// ─── Recency ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_orders_by_date_regardless_of_insert_order() {
  let s = store().await;
  for (id, date) in [
    ("c", "2024-10-03T10:00:00"),
    ("e", "2024-10-05T10:00:00"),
    ("a", "2024-10-01T10:00:00"),
    ("d", "2024-10-04T10:00:00"),
    ("b", "2024-10-02T10:00:00"),
  ] {
    s.upsert(new_match(id, date, Outcome::Win, 1)).await.unwrap();
  }

  let top3: Vec<String> = s
    .recent(3)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.replay_id)
    .collect();
  assert_eq!(top3, ["e", "d", "c"]);

  assert_eq!(s.recent(50).await.unwrap().len(), 5);
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn average_of_empty_store_is_zero() {
  let s = store().await;
  let avg = s.average(10).await.unwrap();
  assert_eq!(avg.count, 0);
  assert_eq!(avg.goals, 0.0);
  assert_eq!(avg.avg_speed, 0.0);

  let wl = s.win_loss_average(10).await.unwrap();
  assert!(wl.wins.is_empty());
  assert!(wl.losses.is_empty());
}

#[tokio::test]
async fn average_uses_most_recent_window() {
  let s = store().await;
  s.upsert(new_match("old", "2024-09-01T10:00:00", Outcome::Win, 9))
    .await
    .unwrap();
  s.upsert(new_match("new1", "2024-10-02T10:00:00", Outcome::Loss, 1))
    .await
    .unwrap();
  s.upsert(new_match("new2", "2024-10-03T10:00:00", Outcome::Win, 3))
    .await
    .unwrap();

  let avg = s.average(2).await.unwrap();
  assert_eq!(avg.count, 2);
  assert_eq!(avg.goals, 2.0);
  assert_eq!(avg.saves, 1.0);
  assert_eq!(avg.avg_boost, 42.0);

  let all = s.average(10).await.unwrap();
  assert_eq!(all.count, 3);
  assert!((all.goals - 13.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn win_loss_partitions_use_independent_windows() {
  let s = store().await;
  // Many recent losses, two old wins: a shared window of 3 would see no wins.
  s.upsert(new_match("w1", "2024-01-01T10:00:00", Outcome::Win, 4))
    .await
    .unwrap();
  s.upsert(new_match("w2", "2024-01-02T10:00:00", Outcome::Win, 2))
    .await
    .unwrap();
  for (i, goals) in [0, 1, 2, 1].into_iter().enumerate() {
    s.upsert(new_match(
      &format!("l{i}"),
      &format!("2024-02-0{}T10:00:00", i + 1),
      Outcome::Loss,
      goals,
    ))
    .await
    .unwrap();
  }

  let wl = s.win_loss_average(3).await.unwrap();
  assert_eq!(wl.total_wins(), 2);
  assert_eq!(wl.wins.goals, 3.0);
  assert_eq!(wl.total_losses(), 3);
  // The three most recent losses: l3 (1), l2 (2), l1 (1).
  assert!((wl.losses.goals - 4.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn three_match_scenario() {
  let s = store().await;
  // Inserted out of order; D1 > D2 > D3.
  s.upsert(new_match("d3", "2024-10-01T10:00:00", Outcome::Win, 2))
    .await
    .unwrap();
  s.upsert(new_match("d1", "2024-10-03T10:00:00", Outcome::Win, 3))
    .await
    .unwrap();
  s.upsert(new_match("d2", "2024-10-02T10:00:00", Outcome::Loss, 1))
    .await
    .unwrap();

  let recent: Vec<String> = s
    .recent(2)
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.replay_id)
    .collect();
  assert_eq!(recent, ["d1", "d2"]);

  let wl = s.win_loss_average(2).await.unwrap();
  assert_eq!(wl.wins.count, 2);
  assert_eq!(wl.wins.goals, 2.5);
  assert_eq!(wl.losses.count, 1);
  assert_eq!(wl.losses.goals, 1.0);
}

// ─── Removal ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_deletes_only_the_named_match() {
  let s = store().await;
  s.upsert(new_match("r1", "2024-10-01T10:00:00", Outcome::Win, 1))
    .await
    .unwrap();
  s.upsert(new_match("r2", "2024-10-02T10:00:00", Outcome::Win, 1))
    .await
    .unwrap();

  assert!(s.remove("r2").await.unwrap());
  assert!(!s.remove("r2").await.unwrap());
  assert!(!s.exists("r2").await.unwrap());
  assert_eq!(s.count().await.unwrap(), 1);
}

// ─── Query layer over the store ──────────────────────────────────────────────

#[tokio::test]
async fn query_composes_filters_over_stored_matches() {
  let s = store().await;
  for (id, date, result, goals) in [
    ("a", "2024-10-06T10:00:00", Outcome::Win, 3),
    ("b", "2024-10-05T10:00:00", Outcome::Win, 2),
    ("c", "2024-10-04T10:00:00", Outcome::Loss, 5),
    ("d", "2024-10-03T10:00:00", Outcome::Win, 4),
    ("e", "2024-10-02T10:00:00", Outcome::Win, 1),
    ("f", "2024-10-01T10:00:00", Outcome::Win, 2),
  ] {
    s.upsert(new_match(id, date, result, goals)).await.unwrap();
  }

  let query = MatchQuery {
    result: Some(Outcome::Win),
    min_goals: Some(2),
    sort_by: SortKey::Goals,
    limit: 3,
    ..Default::default()
  };
  let out = query_matches(&s, &query).await.unwrap();
  let ids: Vec<&str> = out.iter().map(|r| r.replay_id.as_str()).collect();
  assert_eq!(ids, ["d", "a", "b"]);
}

#[tokio::test]
async fn query_never_reaches_past_the_recency_pool() {
  let s = store().await;
  // One ancient high-scoring match followed by a full pool of newer ones.
  s.upsert(new_match("ancient", "2020-01-01T10:00:00", Outcome::Win, 9))
    .await
    .unwrap();
  for i in 0..QUERY_POOL_SIZE {
    s.upsert(new_match(
      &format!("m{i:03}"),
      &format!("2024-10-01T10:{:02}:{:02}", i / 60, i % 60),
      Outcome::Loss,
      0,
    ))
    .await
    .unwrap();
  }

  let query = MatchQuery { min_goals: Some(5), ..Default::default() };
  assert!(query_matches(&s, &query).await.unwrap().is_empty());
}
