//! Discord REST implementation of [`ChatChannel`].
//!
//! Posting uses `POST /channels/{id}/messages`. Mentions are found by polling
//! the channel's message history rather than holding a gateway session.

use std::{
  sync::{Arc, OnceLock},
  time::Duration,
};

use reqwest::{Client, Method};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  channel::{ChatChannel, Mention, MentionBatch},
  state::{ChannelInfo, ConnectionState},
};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_base_url() -> String { "https://discord.com/api/v10".to_owned() }
fn default_ready_timeout_secs() -> u64 { 10 }
fn default_mention_poll_secs() -> u64 { 3 }
fn default_timeout_secs() -> u64 { 30 }

/// The `[discord]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
  pub bot_token:          String,
  pub channel_id:         String,
  /// Username or display name to tag on match reports.
  #[serde(default)]
  pub mention_user:       Option<String>,
  #[serde(default = "default_base_url")]
  pub base_url:           String,
  #[serde(default = "default_ready_timeout_secs")]
  pub ready_timeout_secs: u64,
  #[serde(default = "default_mention_poll_secs")]
  pub mention_poll_secs:  u64,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:       u64,
}

impl DiscordConfig {
  pub fn ready_timeout(&self) -> Duration { Duration::from_secs(self.ready_timeout_secs) }

  pub fn mention_poll_interval(&self) -> Duration { Duration::from_secs(self.mention_poll_secs) }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct User {
  id:          String,
  username:    String,
  #[serde(default)]
  global_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Channel {
  id:       String,
  #[serde(default)]
  name:     Option<String>,
  #[serde(default)]
  guild_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Member {
  user: User,
  #[serde(default)]
  nick: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
  id:       String,
  #[serde(default)]
  content:  String,
  author:   User,
  #[serde(default)]
  mentions: Vec<User>,
}

/// Snowflakes are decimal u64s; compare numerically.
fn snowflake(id: &str) -> u64 { id.parse().unwrap_or(0) }

// ─── Channel ─────────────────────────────────────────────────────────────────

/// A Discord text channel reached over the REST API.
///
/// Cheap to clone; clones share the connection state and resolved ids.
#[derive(Clone)]
pub struct DiscordChannel {
  client:  Client,
  config:  DiscordConfig,
  state:   ConnectionState,
  bot_id:  Arc<OnceLock<String>>,
  mention: Arc<OnceLock<String>>,
}

impl DiscordChannel {
  pub fn new(config: DiscordConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      config,
      state: ConnectionState::new(),
      bot_id: Arc::new(OnceLock::new()),
      mention: Arc::new(OnceLock::new()),
    })
  }

  pub fn state(&self) -> &ConnectionState { &self.state }

  pub fn config(&self) -> &DiscordConfig { &self.config }

  async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, &str)],
    body: Option<serde_json::Value>,
  ) -> Result<T> {
    let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
    debug!(%method, %path, "discord request");

    let mut req = self
      .client
      .request(method, &url)
      .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.config.bot_token))
      .query(query);
    if let Some(body) = body {
      req = req.json(&body);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), path: path.to_owned(), body });
    }
    Ok(resp.json().await?)
  }

  /// Resolve the bot user, the target channel and the mention user, then
  /// settle the connection state. Failure settles it as failed.
  pub async fn connect(&self) -> Result<ChannelInfo> {
    match self.resolve().await {
      Ok(info) => {
        self.state.set_ready(info.clone());
        info!(channel = %info.name, id = %info.id, "chat channel ready");
        Ok(info)
      }
      Err(e) => {
        self.state.set_failed(e.to_string());
        Err(e)
      }
    }
  }

  async fn resolve(&self) -> Result<ChannelInfo> {
    let me: User = self.request(Method::GET, "/users/@me", &[], None).await?;
    info!(bot = %me.username, "logged in");
    let _ = self.bot_id.set(me.id);

    let channel: Channel = self
      .request(Method::GET, &format!("/channels/{}", self.config.channel_id), &[], None)
      .await?;
    let info = ChannelInfo {
      name:     channel.name.unwrap_or_else(|| channel.id.clone()),
      id:       channel.id,
      guild_id: channel.guild_id,
    };

    if let (Some(wanted), Some(guild)) = (&self.config.mention_user, &info.guild_id) {
      match self.find_member(guild, wanted).await {
        Ok(Some(id)) => {
          info!(user = %wanted, "found user to mention");
          let _ = self.mention.set(format!("<@{id}>"));
        }
        Ok(None) => warn!(user = %wanted, "mention user not found in guild"),
        Err(e) => warn!(user = %wanted, "mention user lookup failed: {e}"),
      }
    }
    Ok(info)
  }

  async fn find_member(&self, guild_id: &str, wanted: &str) -> Result<Option<String>> {
    let members: Vec<Member> = self
      .request(
        Method::GET,
        &format!("/guilds/{guild_id}/members/search"),
        &[("query", wanted), ("limit", "10")],
        None,
      )
      .await?;
    Ok(members.into_iter().find_map(|m| {
      let hit = m.user.username == wanted
        || m.user.global_name.as_deref() == Some(wanted)
        || m.nick.as_deref() == Some(wanted);
      hit.then_some(m.user.id)
    }))
  }

  /// Id of the newest message in the channel, used as the first mention
  /// cursor so history is not answered.
  pub async fn latest_message_id(&self) -> Result<Option<String>> {
    let messages: Vec<Message> = self
      .request(
        Method::GET,
        &format!("/channels/{}/messages", self.config.channel_id),
        &[("limit", "1")],
        None,
      )
      .await?;
    Ok(messages.into_iter().next().map(|m| m.id))
  }
}

impl ChatChannel for DiscordChannel {
  async fn post(&self, text: &str) -> Result<()> {
    let _: serde_json::Value = self
      .request(
        Method::POST,
        &format!("/channels/{}/messages", self.config.channel_id),
        &[],
        Some(json!({ "content": text })),
      )
      .await?;
    Ok(())
  }

  async fn poll_mentions(&self, cursor: Option<&str>) -> Result<MentionBatch> {
    let Some(bot_id) = self.bot_id.get() else {
      return Ok(MentionBatch::default());
    };

    let path = format!("/channels/{}/messages", self.config.channel_id);
    let mut query = vec![("limit", "50")];
    if let Some(after) = cursor {
      query.push(("after", after));
    }
    let mut messages: Vec<Message> = self.request(Method::GET, &path, &query, None).await?;
    messages.sort_by_key(|m| snowflake(&m.id));

    let cursor = messages.last().map(|m| m.id.clone());
    let mentions = messages
      .into_iter()
      .filter(|m| m.author.id != *bot_id && m.mentions.iter().any(|u| u.id == *bot_id))
      .map(|m| Mention {
        question:   strip_mention(&m.content, bot_id),
        message_id: m.id,
        author:     m.author.username,
      })
      .collect();
    Ok(MentionBatch { mentions, cursor })
  }

  fn mention_tag(&self) -> Option<String> { self.mention.get().cloned() }
}

/// Remove `<@id>` and `<@!id>` mentions of the bot and trim.
fn strip_mention(content: &str, bot_id: &str) -> String {
  content
    .replace(&format!("<@!{bot_id}>"), "")
    .replace(&format!("<@{bot_id}>"), "")
    .trim()
    .to_owned()
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, sync::Mutex};

  use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
  };
  use serde_json::{Value, json};

  use super::*;

  #[derive(Clone, Default)]
  struct Fake {
    posted: Arc<Mutex<Vec<String>>>,
  }

  fn authorised(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bot tok")
  }

  async fn me(headers: HeaderMap) -> Response {
    if !authorised(&headers) {
      return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "id": "900", "username": "coachbot" })).into_response()
  }

  async fn channel(Path(id): Path<String>) -> Response {
    if id != "77" {
      return (StatusCode::NOT_FOUND, "Unknown Channel").into_response();
    }
    Json(json!({ "id": "77", "name": "coach-feedback", "guild_id": "5" })).into_response()
  }

  async fn members(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(q["query"], "sam");
    Json(json!([
      { "user": { "id": "10", "username": "samwise" } },
      { "user": { "id": "11", "username": "sam" }, "nick": null }
    ]))
  }

  async fn messages(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    if q.get("limit").map(String::as_str) == Some("1") {
      return Json(json!([{ "id": "100", "author": { "id": "1", "username": "a" } }]));
    }
    assert_eq!(q.get("after").map(String::as_str), Some("100"));
    // Newest first, as Discord returns them.
    Json(json!([
      {
        "id": "104",
        "content": "<@!900> and my saves?",
        "author": { "id": "2", "username": "sam" },
        "mentions": [{ "id": "900", "username": "coachbot" }]
      },
      {
        "id": "103",
        "content": "<@900> reply",
        "author": { "id": "900", "username": "coachbot" },
        "mentions": [{ "id": "900", "username": "coachbot" }]
      },
      {
        "id": "102",
        "content": "just chatting",
        "author": { "id": "2", "username": "sam" },
        "mentions": []
      },
      {
        "id": "101",
        "content": "<@900> how was my last game?",
        "author": { "id": "2", "username": "sam" },
        "mentions": [{ "id": "900", "username": "coachbot" }]
      }
    ]))
  }

  async fn post_message(State(fake): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
    fake.posted.lock().unwrap().push(body["content"].as_str().unwrap_or_default().to_owned());
    Json(json!({ "id": "200" }))
  }

  async fn spawn(fake: Fake) -> String {
    let app = Router::new()
      .route("/users/@me", get(me))
      .route("/channels/{id}", get(channel))
      .route("/channels/{id}/messages", get(messages).post(post_message))
      .route("/guilds/{id}/members/search", get(members))
      .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn config(base_url: String, channel_id: &str) -> DiscordConfig {
    DiscordConfig {
      bot_token: "tok".into(),
      channel_id: channel_id.into(),
      mention_user: Some("sam".into()),
      base_url,
      ready_timeout_secs: 1,
      mention_poll_secs: 1,
      timeout_secs: 5,
    }
  }

  #[test]
  fn strips_both_mention_forms() {
    assert_eq!(strip_mention("<@9> hi <@!9>", "9"), "hi");
    assert_eq!(strip_mention("hey <@8>", "9"), "hey <@8>");
  }

  #[tokio::test]
  async fn connect_settles_ready_and_resolves_mention() {
    let base = spawn(Fake::default()).await;
    let ch = DiscordChannel::new(config(base, "77")).unwrap();

    let info = ch.connect().await.unwrap();
    assert_eq!(info.name, "coach-feedback");
    assert_eq!(info.guild_id.as_deref(), Some("5"));
    assert_eq!(ch.state().wait_ready(Duration::ZERO).await.unwrap(), info);
    assert_eq!(ch.mention_tag().as_deref(), Some("<@11>"));
  }

  #[tokio::test]
  async fn connect_failure_settles_failed() {
    let base = spawn(Fake::default()).await;
    let ch = DiscordChannel::new(config(base, "missing")).unwrap();

    assert!(matches!(ch.connect().await, Err(Error::Status { status: 404, .. })));
    assert!(matches!(
      ch.state().wait_ready(Duration::from_secs(1)).await,
      Err(Error::ConnectionFailed(_))
    ));
  }

  #[tokio::test]
  async fn posts_message_content() {
    let fake = Fake::default();
    let posted = fake.posted.clone();
    let ch = DiscordChannel::new(config(spawn(fake).await, "77")).unwrap();

    ch.post("hello").await.unwrap();
    assert_eq!(*posted.lock().unwrap(), ["hello"]);
  }

  #[tokio::test]
  async fn polls_mentions_oldest_first_skipping_own_messages() {
    let ch = DiscordChannel::new(config(spawn(Fake::default()).await, "77")).unwrap();
    assert_eq!(ch.poll_mentions(None).await.unwrap(), MentionBatch::default());

    ch.connect().await.unwrap();
    let start = ch.latest_message_id().await.unwrap();
    assert_eq!(start.as_deref(), Some("100"));

    let batch = ch.poll_mentions(start.as_deref()).await.unwrap();
    assert_eq!(batch.cursor.as_deref(), Some("104"));
    let questions: Vec<&str> = batch.mentions.iter().map(|m| m.question.as_str()).collect();
    assert_eq!(questions, ["how was my last game?", "and my saves?"]);
    assert_eq!(batch.mentions[0].author, "sam");
  }
}
