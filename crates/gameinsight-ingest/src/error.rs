//! Error type for `gameinsight-ingest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// A non-success, non-429 response. Not retried.
  #[error("upstream returned {status} for {url}: {body}")]
  Status {
    status: u16,
    url:    String,
    body:   String,
  },

  /// Every attempt was answered with HTTP 429.
  #[error("rate limited by upstream after {0} attempts")]
  RateLimited(u32),

  /// The tracked player is on neither side of the replay (spectated or
  /// uploaded by someone else).
  #[error("player {player} not found in replay {replay_id}")]
  PlayerNotFound {
    replay_id: String,
    player:    String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
