//! The [`ChatChannel`] seam and message chunking.

use std::future::Future;

use crate::Result;

/// Longest message the chat service accepts, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// A message that mentioned the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
  pub message_id: String,
  pub author:     String,
  /// Message text with the bot's mention removed.
  pub question:   String,
}

/// Result of one mention poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionBatch {
  /// Oldest first.
  pub mentions: Vec<Mention>,
  /// Pass to the next poll. `None` when nothing new was seen.
  pub cursor:   Option<String>,
}

/// A chat destination the bot posts to and reads mentions from.
pub trait ChatChannel: Send + Sync {
  /// Post one message of at most [`MESSAGE_LIMIT`] characters.
  fn post(&self, text: &str) -> impl Future<Output = Result<()>> + Send;

  /// Mentions of the bot posted after `cursor`.
  fn poll_mentions(
    &self,
    cursor: Option<&str>,
  ) -> impl Future<Output = Result<MentionBatch>> + Send;

  /// Tag prepended to match reports, e.g. `<@1234>`.
  fn mention_tag(&self) -> Option<String> { None }
}

/// Split `text` into chunks of at most `limit` characters, never inside a
/// character. Empty text yields no chunks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
  let limit = limit.max(1);
  let mut chunks = Vec::new();
  let mut current = String::new();
  let mut len = 0;

  for ch in text.chars() {
    if len == limit {
      chunks.push(std::mem::take(&mut current));
      len = 0;
    }
    current.push(ch);
    len += 1;
  }
  if !current.is_empty() {
    chunks.push(current);
  }
  chunks
}

/// Post `text` as as many sequential messages as it needs.
pub async fn post_chunked<C: ChatChannel>(channel: &C, text: &str) -> Result<usize> {
  let chunks = split_message(text, MESSAGE_LIMIT);
  for chunk in &chunks {
    channel.post(chunk).await?;
  }
  Ok(chunks.len())
}

/// Post a match report, prefixed with the channel's mention tag if it has one.
pub async fn post_report<C: ChatChannel>(channel: &C, report: &str) -> Result<usize> {
  match channel.mention_tag() {
    Some(tag) => post_chunked(channel, &format!("{tag}\n\n{report}")).await,
    None => post_chunked(channel, report).await,
  }
}
