//! Error type for `gameinsight-coach`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model endpoint returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("model response contained no choices")]
  NoChoices,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
