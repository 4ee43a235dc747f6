//! Error type for `gameinsight-discord`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("discord returned {status} for {path}: {body}")]
  Status {
    status: u16,
    path:   String,
    body:   String,
  },

  #[error("chat connection not ready after {0:?}")]
  NotReady(std::time::Duration),

  #[error("chat connection failed: {0}")]
  ConnectionFailed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
