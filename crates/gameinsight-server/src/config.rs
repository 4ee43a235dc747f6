//! Layered application configuration: an optional TOML file overlaid with
//! `GAMEINSIGHT_*` environment variables.
//!
//! Nested keys use a double underscore, e.g. `GAMEINSIGHT_LLM__API_KEY`.

use std::{
  net::SocketAddr,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use gameinsight_coach::LlmConfig;
use gameinsight_discord::DiscordConfig;
use gameinsight_ingest::{adapter::PlayerKey, client::BallchasingConfig};
use serde::Deserialize;

fn default_store_path() -> PathBuf { PathBuf::from("data/matches.db") }
fn default_poll_interval_secs() -> u64 { 5 }
fn default_history_window() -> usize { 20 }
fn default_tools_host() -> String { "127.0.0.1".to_owned() }
fn default_tools_port() -> u16 { 5233 }

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_poll_interval_secs")]
  pub poll_interval_secs: u64,
  /// Recent wins and recent losses compared against each new match.
  #[serde(default = "default_history_window")]
  pub history_window:     usize,
  /// Platform-specific id of the tracked player.
  #[serde(default)]
  pub steam_id:           Option<String>,
  /// Also require this platform (`steam`, `epic`, …) when matching the player.
  #[serde(default)]
  pub player_platform:    Option<String>,
  #[serde(default)]
  pub ballchasing:        Option<BallchasingConfig>,
  #[serde(default)]
  pub llm:                Option<LlmConfig>,
  #[serde(default)]
  pub discord:            Option<DiscordConfig>,
  #[serde(default)]
  pub tools:              ToolsConfig,
}

/// The optional HTTP tool API.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
  #[serde(default)]
  pub enabled: bool,
  #[serde(default = "default_tools_host")]
  pub host:    String,
  #[serde(default = "default_tools_port")]
  pub port:    u16,
}

impl Default for ToolsConfig {
  fn default() -> Self {
    Self { enabled: false, host: default_tools_host(), port: default_tools_port() }
  }
}

impl ToolsConfig {
  pub fn address(&self) -> Result<SocketAddr> {
    format!("{}:{}", self.host, self.port)
      .parse()
      .with_context(|| format!("invalid tools address {}:{}", self.host, self.port))
  }
}

impl AppConfig {
  /// Load from `path` (which may be absent) and the environment.
  pub fn load(path: &Path) -> Result<Self> {
    Self::from_builder(
      config::Config::builder().add_source(config::File::from(path).required(false)),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> Result<Self> {
    builder
      .add_source(
        config::Environment::with_prefix("GAMEINSIGHT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to load configuration")?
      .try_deserialize()
      .context("failed to parse configuration")
  }

  pub fn poll_interval(&self) -> Duration { Duration::from_secs(self.poll_interval_secs) }

  /// Identity of the tracked player.
  pub fn player_key(&self) -> Result<PlayerKey> {
    let id = self.steam_id.as_deref().context("missing steam_id")?;
    Ok(match &self.player_platform {
      Some(p) => PlayerKey::new(id).with_platform(p),
      None => PlayerKey::new(id),
    })
  }

  pub fn ballchasing(&self) -> Result<&BallchasingConfig> {
    self.ballchasing.as_ref().context("missing [ballchasing] section")
  }

  pub fn llm(&self) -> Result<&LlmConfig> { self.llm.as_ref().context("missing [llm] section") }

  pub fn discord(&self) -> Result<&DiscordConfig> {
    self.discord.as_ref().context("missing [discord] section")
  }
}
