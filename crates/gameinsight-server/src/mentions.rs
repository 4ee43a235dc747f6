//! The mention loop: answer questions addressed to the bot.

use std::time::Duration;

use gameinsight_coach::{Agent, LanguageModel};
use gameinsight_core::store::MatchStore;
use gameinsight_discord::{ChatChannel, Mention, post_chunked};
use gameinsight_tools::Toolbox;
use tracing::{error, info, warn};

/// Reply to a mention that carried no question.
pub const EMPTY_QUESTION_REPLY: &str =
  "👋 Ask me about your matches, e.g. \"how did my last game go?\"";

pub struct MentionResponder<M, S, C> {
  pub model:          M,
  pub toolbox:        Toolbox<S>,
  pub channel:        C,
  pub max_iterations: usize,
}

impl<M, S, C> MentionResponder<M, S, C>
where
  M: LanguageModel,
  S: MatchStore,
  C: ChatChannel,
{
  /// Answer one mention. A failed model request is answered with an error
  /// line instead of being dropped.
  pub async fn respond(&self, mention: &Mention) -> gameinsight_discord::Result<usize> {
    if mention.question.is_empty() {
      return post_chunked(&self.channel, EMPTY_QUESTION_REPLY).await;
    }
    info!(author = %mention.author, question = %mention.question, "answering mention");

    let agent = Agent::new(&self.model, &self.toolbox, self.max_iterations);
    let text = match agent.answer(&mention.question).await {
      Ok(answer) => answer.text,
      Err(e) => {
        error!(message_id = %mention.message_id, "failed to answer mention: {e}");
        format!("❌ Error: {e}")
      }
    };
    post_chunked(&self.channel, &text).await
  }

  /// Poll for mentions every `interval`, starting after `cursor`. Never
  /// returns; failures are logged and the next poll retries.
  pub async fn run(&self, mut cursor: Option<String>, interval: Duration) {
    info!(?interval, "listening for mentions");
    loop {
      match self.channel.poll_mentions(cursor.as_deref()).await {
        Ok(batch) => {
          for mention in &batch.mentions {
            if let Err(e) = self.respond(mention).await {
              error!(message_id = %mention.message_id, "failed to post answer: {e}");
            }
          }
          if batch.cursor.is_some() {
            cursor = batch.cursor;
          }
        }
        Err(e) => warn!("mention poll failed: {e}"),
      }
      tokio::time::sleep(interval).await;
    }
  }
}
