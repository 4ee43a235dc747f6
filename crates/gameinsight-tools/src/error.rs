//! Tool error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

/// Why a tool call produced no result.
#[derive(Debug, Error)]
pub enum ToolError {
  #[error("Unknown tool: {0}")]
  UnknownTool(String),

  #[error("invalid arguments: {0}")]
  InvalidArguments(String),

  /// The call was well-formed but there is nothing to return.
  #[error("{0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ToolError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// The `{"error": …}` object handed back to the model.
  pub fn to_json(&self) -> Value { json!({ "error": self.to_string() }) }
}

impl IntoResponse for ToolError {
  fn into_response(self) -> Response {
    let status = match &self {
      ToolError::UnknownTool(_) | ToolError::NotFound(_) => StatusCode::NOT_FOUND,
      ToolError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
      ToolError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(self.to_json())).into_response()
  }
}

pub type Result<T, E = ToolError> = std::result::Result<T, E>;
