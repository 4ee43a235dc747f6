//! The polling loop: list replays, ingest the new ones, analyse and post.

use std::{sync::Arc, time::Duration};

use gameinsight_coach::{LanguageModel, analyze_match, prompt::build_message};
use gameinsight_core::store::MatchStore;
use gameinsight_discord::{ChatChannel, post_report};
use gameinsight_ingest::{
  adapter::{PlayerKey, ingest_into},
  client::{ListRequest, ReplaySource},
};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum PipelineError {
  /// Listing or fetching replays failed. The cycle is abandoned.
  #[error("upstream: {0}")]
  Upstream(#[from] gameinsight_ingest::Error),

  /// The store failed. Fatal.
  #[error("store: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PipelineError {
  fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self { Self::Store(Box::new(e)) }

  pub fn is_fatal(&self) -> bool { matches!(self, Self::Store(_)) }
}

/// Everything one poll cycle needs.
pub struct Pipeline<R, S, M, C> {
  pub source:         R,
  pub store:          Arc<S>,
  pub model:          M,
  pub channel:        C,
  pub player:         PlayerKey,
  pub request:        ListRequest,
  /// Wins and losses each averaged over this many recent matches.
  pub history_window: usize,
}

impl<R, S, M, C> Pipeline<R, S, M, C>
where
  R: ReplaySource,
  S: MatchStore,
  M: LanguageModel,
  C: ChatChannel,
{
  /// One poll cycle. Returns how many new matches were stored.
  ///
  /// Replays already in the store are skipped without being fetched. A replay
  /// the tracked player is not in is skipped. A report that fails to post is
  /// logged; the match stays stored.
  pub async fn run_cycle(&self) -> Result<usize, PipelineError> {
    let replays = self.source.list_replays(&self.request).await?;
    debug!(count = replays.len(), "listed replays");

    let mut stored = 0;
    for summary in replays {
      if self.store.exists(&summary.id).await.map_err(PipelineError::store)? {
        continue;
      }
      info!(replay_id = %summary.id, title = summary.title(), "new replay");

      let details = self.source.get_replay(&summary.id).await?;
      let Some(record) = ingest_into(self.store.as_ref(), &details, &self.player)
        .await
        .map_err(PipelineError::store)?
      else {
        continue;
      };
      stored += 1;

      let history = self
        .store
        .win_loss_average(self.history_window)
        .await
        .map_err(PipelineError::store)?;
      let info = record.info();
      let feedback = analyze_match(&self.model, &record.stats, &history, &info).await;
      let report = build_message(&feedback, &info, &record.stats);

      match post_report(&self.channel, &report).await {
        Ok(parts) => info!(replay_id = %record.replay_id, parts, "posted match report"),
        Err(e) => error!(replay_id = %record.replay_id, "failed to post match report: {e}"),
      }
    }
    Ok(stored)
  }

  /// Run cycles every `interval` until a fatal error.
  pub async fn run(&self, interval: Duration) -> Result<(), PipelineError> {
    info!(player = %self.player, ?interval, "polling for replays");
    loop {
      match self.run_cycle().await {
        Ok(0) => debug!("no new matches"),
        Ok(n) => info!(stored = n, "poll cycle finished"),
        Err(e) if e.is_fatal() => {
          error!("poll cycle failed: {e}");
          return Err(e);
        }
        Err(e) => error!("poll cycle failed: {e}"),
      }
      tokio::time::sleep(interval).await;
    }
  }
}
