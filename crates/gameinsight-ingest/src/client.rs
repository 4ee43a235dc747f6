//! Rate-limited async client for the Ballchasing replay API.

use std::{
  future::Future,
  sync::Arc,
  time::{Duration, Instant},
};

use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  payload::{ReplayDetails, ReplayList, ReplaySummary},
};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_base_url() -> String { "https://ballchasing.com/api".to_owned() }
fn default_count() -> u32 { 5 }
fn default_timeout_secs() -> u64 { 30 }

/// The `[ballchasing]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct BallchasingConfig {
  pub api_key:      String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Steam id or `"me"`; unset lists replays from every uploader.
  #[serde(default)]
  pub uploader:     Option<String>,
  /// How many replays each poll lists.
  #[serde(default = "default_count")]
  pub count:        u32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl BallchasingConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:      api_key.into(),
      base_url:     default_base_url(),
      uploader:     None,
      count:        default_count(),
      timeout_secs: default_timeout_secs(),
    }
  }

  /// The listing request a poll cycle issues.
  pub fn list_request(&self) -> ListRequest {
    ListRequest { uploader: self.uploader.clone(), count: self.count, ..Default::default() }
  }
}

/// Request pacing and HTTP 429 handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Minimum gap between the starts of two consecutive requests.
  pub min_interval: Duration,
  pub max_attempts: u32,
  /// After the n-th consecutive 429 (0-based) the client waits
  /// `backoff_step * (n + 1)`.
  pub backoff_step: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      min_interval: Duration::from_secs(1),
      max_attempts: 3,
      backoff_step: Duration::from_secs(60),
    }
  }
}

impl RetryPolicy {
  pub fn backoff(&self, attempt: u32) -> Duration { self.backoff_step * (attempt + 1) }
}

/// Parameters of `GET /replays`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
  pub uploader: Option<String>,
  pub count:    u32,
  pub sort_by:  String,
  pub sort_dir: String,
}

impl Default for ListRequest {
  fn default() -> Self {
    Self {
      uploader: None,
      count:    10,
      sort_by:  "replay-date".to_owned(),
      sort_dir: "desc".to_owned(),
    }
  }
}

impl ListRequest {
  fn query(&self) -> Vec<(&'static str, String)> {
    let mut q = vec![
      ("count", self.count.to_string()),
      ("sort-by", self.sort_by.clone()),
      ("sort-dir", self.sort_dir.clone()),
    ];
    if let Some(uploader) = &self.uploader {
      q.push(("uploader", uploader.clone()));
    }
    q
  }
}

// ─── Source trait ────────────────────────────────────────────────────────────

/// Where replays come from. The polling loop only sees this trait.
pub trait ReplaySource: Send + Sync {
  /// `GET /replays`, newest first under the default request.
  fn list_replays(
    &self,
    request: &ListRequest,
  ) -> impl Future<Output = Result<Vec<ReplaySummary>>> + Send;

  /// `GET /replays/{id}`.
  fn get_replay(&self, replay_id: &str) -> impl Future<Output = Result<ReplayDetails>> + Send;
}

// ─── HTTP client ─────────────────────────────────────────────────────────────

/// Async HTTP client for the Ballchasing API.
///
/// Clones share the request throttle, so pacing holds across every clone.
#[derive(Clone)]
pub struct BallchasingClient {
  client:       Client,
  config:       BallchasingConfig,
  policy:       RetryPolicy,
  last_request: Arc<Mutex<Option<Instant>>>,
}

impl BallchasingClient {
  pub fn new(config: BallchasingConfig) -> Result<Self> {
    Self::with_policy(config, RetryPolicy::default())
  }

  pub fn with_policy(config: BallchasingConfig, policy: RetryPolicy) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config, policy, last_request: Arc::new(Mutex::new(None)) })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Sleep until `min_interval` has passed since the previous request.
  async fn throttle(&self) {
    let mut last = self.last_request.lock().await;
    if let Some(prev) = *last {
      let elapsed = prev.elapsed();
      if elapsed < self.policy.min_interval {
        let wait = self.policy.min_interval - elapsed;
        debug!(wait_ms = wait.as_millis() as u64, "pacing upstream request");
        tokio::time::sleep(wait).await;
      }
    }
    *last = Some(Instant::now());
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T> {
    let url = self.url(path);

    for attempt in 0..self.policy.max_attempts {
      self.throttle().await;
      debug!(%url, attempt, "GET");

      let resp = self
        .client
        .get(&url)
        .header(reqwest::header::AUTHORIZATION, &self.config.api_key)
        .query(query)
        .send()
        .await?;

      let status = resp.status();
      if status == StatusCode::TOO_MANY_REQUESTS {
        if attempt + 1 < self.policy.max_attempts {
          let wait = self.policy.backoff(attempt);
          warn!(
            %url,
            wait_secs = wait.as_secs_f64(),
            "rate limited; retry {}/{}",
            attempt + 1,
            self.policy.max_attempts
          );
          tokio::time::sleep(wait).await;
        }
        continue;
      }

      if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status { status: status.as_u16(), url, body });
      }
      return Ok(resp.json().await?);
    }

    Err(Error::RateLimited(self.policy.max_attempts))
  }
}

impl ReplaySource for BallchasingClient {
  async fn list_replays(&self, request: &ListRequest) -> Result<Vec<ReplaySummary>> {
    let list: ReplayList = self.get_json("/replays", &request.query()).await?;
    Ok(list.list)
  }

  async fn get_replay(&self, replay_id: &str) -> Result<ReplayDetails> {
    self.get_json(&format!("/replays/{replay_id}"), &[]).await
  }
}
