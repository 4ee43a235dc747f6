//! Single-shot coaching feedback for one match.

use gameinsight_core::{
  record::MatchInfo,
  stats::{MatchStats, WinLossAverages},
};
use tracing::{error, warn};

use crate::{
  llm::{ChatMessage, LanguageModel},
  prompt::{COACHING_SYSTEM_PROMPT, build_prompt},
};

/// Ask `model` for feedback on a match.
///
/// Always yields text for the report: a refusal, an empty answer or a failed
/// request becomes a short warning line instead of an error.
pub async fn analyze_match<M: LanguageModel>(
  model: &M,
  stats: &MatchStats,
  history: &WinLossAverages,
  info: &MatchInfo,
) -> String {
  let messages = [
    ChatMessage::system(COACHING_SYSTEM_PROMPT),
    ChatMessage::user(build_prompt(stats, history, info)),
  ];

  match model.complete(&messages, &[]).await {
    Ok(c) => {
      if let Some(refusal) = c.refusal.as_deref().filter(|r| !r.is_empty()) {
        warn!("model refused match analysis");
        return format!("⚠️ Model refused: {refusal}");
      }
      match c.text() {
        Some(text) => text.to_owned(),
        None => {
          warn!("model returned empty match analysis");
          "⚠️ Model returned empty response. Please try again.".to_owned()
        }
      }
    }
    Err(e) => {
      error!("match analysis failed: {e}");
      format!("❌ Error generating feedback: {e}")
    }
  }
}
