//! HTTP surface for the query tools.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tools` | Tool definitions |
//! | `POST` | `/tools/{name}` | Body: argument object (may be empty) |

use std::sync::Arc;

use axum::{
  Json, Router,
  body::Bytes,
  extract::{Path, State},
  routing::{get, post},
};
use gameinsight_core::store::MatchStore;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::{Toolbox, ToolDefinition, ToolError, definitions};

/// Build the tool router for `store`.
pub fn tools_router<S>(store: Arc<S>) -> Router<()>
where
  S: MatchStore + 'static,
{
  Router::new()
    .route("/tools", get(list))
    .route("/tools/{name}", post(call::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(Toolbox::new(store))
}

/// `GET /tools`
async fn list() -> Json<Vec<ToolDefinition>> { Json(definitions()) }

/// `POST /tools/{name}`
async fn call<S: MatchStore>(
  State(toolbox): State<Toolbox<S>>,
  Path(name): Path<String>,
  body: Bytes,
) -> Result<Json<Value>, ToolError> {
  let args = if body.iter().all(u8::is_ascii_whitespace) {
    Value::Null
  } else {
    serde_json::from_slice(&body).map_err(|e| ToolError::InvalidArguments(e.to_string()))?
  };
  Ok(Json(toolbox.execute(&name, args).await?))
}
