//! Match ingestion: turns a replay plus the tracked player's
//! identity into a [`NewMatch`].

use gameinsight_core::{
  record::{MatchRecord, NewMatch, Outcome, TeamColor},
  stats::MatchStats,
  store::MatchStore,
};
use tracing::{info, warn};

use crate::{
  Error, Result,
  payload::{Player, PlayerId, ReplayDetails},
};

/// The identity of the player whose matches are tracked.
///
/// When `platform` is `None` only the platform-specific id is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerKey {
  pub platform: Option<String>,
  pub id:       String,
}

impl PlayerKey {
  pub fn new(id: impl Into<String>) -> Self { Self { platform: None, id: id.into() } }

  pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
    self.platform = Some(platform.into());
    self
  }

  pub fn matches(&self, id: &PlayerId) -> bool {
    self.id == id.id && self.platform.as_deref().is_none_or(|p| p == id.platform)
  }
}

impl std::fmt::Display for PlayerKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match &self.platform {
      Some(p) => write!(f, "{p}:{}", self.id),
      None => f.write_str(&self.id),
    }
  }
}

/// Find the side and player record for `key`, checking blue before orange.
pub fn locate<'a>(
  details: &'a ReplayDetails,
  key: &PlayerKey,
) -> Option<(TeamColor, &'a Player)> {
  [(TeamColor::Blue, &details.blue), (TeamColor::Orange, &details.orange)]
    .into_iter()
    .find_map(|(color, side)| {
      side.players.iter().find(|p| key.matches(&p.id)).map(|p| (color, p))
    })
}

/// Build the record to store for `details` from the point of view of `key`.
///
/// Fails with [`Error::PlayerNotFound`] when the player is on neither side.
/// A level score is recorded as a loss and logged.
pub fn ingest(details: &ReplayDetails, key: &PlayerKey) -> Result<NewMatch> {
  let (team_color, player) =
    locate(details, key).ok_or_else(|| Error::PlayerNotFound {
      replay_id: details.id.clone(),
      player:    key.to_string(),
    })?;

  let (own, opponent) = match team_color {
    TeamColor::Blue => (details.blue.goals(), details.orange.goals()),
    TeamColor::Orange => (details.orange.goals(), details.blue.goals()),
  };
  if own == opponent {
    warn!(
      replay_id = %details.id,
      goals = own,
      "level score; recording as a loss"
    );
  }

  Ok(NewMatch {
    replay_id: details.id.clone(),
    date: details.date.clone(),
    duration: details.duration,
    playlist: details.playlist().to_owned(),
    team_color,
    result: Outcome::from_goals(own, opponent),
    stats: MatchStats::from(&player.stats),
    raw_stats: player.raw_stats.clone(),
  })
}

/// [`ingest`] and upsert the result into `store`.
///
/// Returns `Ok(None)` when the player is not in the replay; that case is
/// logged and skipped rather than treated as an error.
pub async fn ingest_into<S: MatchStore>(
  store: &S,
  details: &ReplayDetails,
  key: &PlayerKey,
) -> Result<Option<MatchRecord>, S::Error> {
  let new_match = match ingest(details, key) {
    Ok(m) => m,
    Err(e) => {
      warn!(replay_id = %details.id, "skipping replay: {e}");
      return Ok(None);
    }
  };

  let record = store.upsert(new_match).await?;
  info!(
    replay_id = %record.replay_id,
    result = %record.result,
    team = %record.team_color,
    "stored match"
  );
  Ok(Some(record))
}
