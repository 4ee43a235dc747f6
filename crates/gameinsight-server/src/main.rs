//! `gameinsight`: replay coaching bot.
//!
//! Reads `gameinsight.toml` (or the path given with `--config`) plus
//! `GAMEINSIGHT_*` environment variables, opens the local match store and
//! runs the requested subcommand.
//!
//! ```
//! gameinsight                      # poll replays and answer mentions
//! gameinsight ask how did my last game go?
//! gameinsight recent -n 5
//! gameinsight remove               # forget the latest match
//! gameinsight serve-tools
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use gameinsight_coach::{Agent, OpenAiClient};
use gameinsight_core::store::MatchStore;
use gameinsight_discord::DiscordChannel;
use gameinsight_ingest::client::BallchasingClient;
use gameinsight_server::{
  AppConfig, MentionResponder, Pipeline,
  config::ToolsConfig,
};
use gameinsight_store_sqlite::SqliteStore;
use gameinsight_tools::{Toolbox, http::tools_router};
use tokio::net::TcpListener;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "GameInsight replay coach")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "gameinsight.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Poll for new replays and answer chat mentions (default).
  Run,
  /// Answer one question against the local store and exit.
  Ask {
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// List the most recent stored matches.
  Recent {
    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,
  },
  /// Delete a stored match (the latest when omitted) so it is ingested again.
  Remove { replay_id: Option<String> },
  /// Serve only the tool HTTP API.
  ServeTools,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  match cli.command.unwrap_or(Command::Run) {
    Command::Run => run(&cfg, store).await,
    Command::Ask { question } => ask(&cfg, store, &question.join(" ")).await,
    Command::Recent { count } => recent(&store, count).await,
    Command::Remove { replay_id } => remove(&store, replay_id).await,
    Command::ServeTools => serve_tools(&cfg.tools, store).await,
  }
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn run(cfg: &AppConfig, store: Arc<SqliteStore>) -> Result<()> {
  let player = cfg.player_key()?;
  let upstream = cfg.ballchasing()?;
  let llm = cfg.llm()?;
  let discord = cfg.discord()?;

  let source =
    BallchasingClient::new(upstream.clone()).context("failed to build upstream client")?;
  let model = OpenAiClient::new(llm.clone()).context("failed to build model client")?;
  let channel = DiscordChannel::new(discord.clone()).context("failed to build chat client")?;

  info!(matches = store.count().await?, "opened match store");

  let connector = channel.clone();
  tokio::spawn(async move {
    if let Err(e) = connector.connect().await {
      error!("chat connection failed: {e}");
    }
  });
  let ready = channel
    .state()
    .wait_ready(discord.ready_timeout())
    .await
    .context("chat channel not ready")?;
  info!(channel = %ready.name, "connected to chat");

  let cursor = channel.latest_message_id().await.unwrap_or_else(|e| {
    warn!("could not read latest message, answering from now on: {e}");
    None
  });

  let pipeline = Pipeline {
    source,
    store:          store.clone(),
    model:          model.clone(),
    channel:        channel.clone(),
    player,
    request:        upstream.list_request(),
    history_window: cfg.history_window,
  };
  let responder = MentionResponder {
    model,
    toolbox: Toolbox::new(store.clone()),
    channel,
    max_iterations: llm.max_tool_iterations,
  };
  let tools = async {
    if cfg.tools.enabled {
      serve_tools(&cfg.tools, store.clone()).await
    } else {
      std::future::pending().await
    }
  };

  tokio::select! {
    r = pipeline.run(cfg.poll_interval()) => r.context("polling stopped")?,
    () = responder.run(cursor, discord.mention_poll_interval()) => {}
    r = tools => r?,
    r = tokio::signal::ctrl_c() => {
      r.context("failed to listen for ctrl-c")?;
      info!("shutting down");
    }
  }
  Ok(())
}

async fn ask(cfg: &AppConfig, store: Arc<SqliteStore>, question: &str) -> Result<()> {
  let llm = cfg.llm()?;
  let model = OpenAiClient::new(llm.clone()).context("failed to build model client")?;
  let toolbox = Toolbox::new(store);

  let answer = Agent::new(&model, &toolbox, llm.max_tool_iterations)
    .answer(question)
    .await
    .context("failed to answer question")?;
  println!("{}", answer.text);
  Ok(())
}

async fn recent(store: &SqliteStore, count: usize) -> Result<()> {
  let records = store.recent(count).await?;
  let total = store.count().await?;

  for r in &records {
    let core = &r.stats.core;
    println!(
      "{}  {:<36}  {:<18} {:<4}  {}G {}A {}S {}Sh",
      r.date, r.replay_id, r.playlist, r.result, core.goals, core.assists, core.saves, core.shots,
    );
  }
  println!("{} of {total} stored matches", records.len());
  Ok(())
}

async fn remove(store: &SqliteStore, replay_id: Option<String>) -> Result<()> {
  let replay_id = match replay_id {
    Some(id) => id,
    None => store
      .recent(1)
      .await?
      .into_iter()
      .next()
      .map(|r| r.replay_id)
      .context("no matches stored")?,
  };

  if !store.remove(&replay_id).await? {
    anyhow::bail!("match {replay_id} not found");
  }
  println!("Removed {replay_id}; it will be ingested again on the next poll.");
  Ok(())
}

async fn serve_tools(cfg: &ToolsConfig, store: Arc<SqliteStore>) -> Result<()> {
  let address = cfg.address()?;
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  info!("Tool API listening on http://{address}");
  axum::serve(listener, tools_router(store))
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
    })
    .await
    .context("tool server error")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
