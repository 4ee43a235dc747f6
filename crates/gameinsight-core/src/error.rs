//! Error types for `gameinsight-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown match result: {0:?}")]
  UnknownOutcome(String),

  #[error("unknown team color: {0:?}")]
  UnknownTeamColor(String),

  #[error("unknown sort key: {0:?}")]
  UnknownSortKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
