//! Bounded tool-calling loop for answering chat questions.
//!
//! The loop alternates between asking the model and running the tool calls it
//! requests, until the model answers with plain text or the iteration budget
//! runs out:
//!
//! ```text
//! AwaitingModel ──text──────────▶ Done
//!      │  ▲
//!  tool calls
//!      ▼  │
//! ExecutingTools
//!
//! AwaitingModel (iteration == max) ──▶ Exhausted
//! ```

use gameinsight_core::store::MatchStore;
use gameinsight_tools::{ToolDefinition, Toolbox, definitions};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
  Result,
  llm::{ChatMessage, LanguageModel, ToolCall},
  prompt::CHAT_SYSTEM_PROMPT,
};

/// Answer used when the iteration budget runs out.
pub const EXHAUSTED_ANSWER: &str = "⚠️ Analysis took too long. Please try a simpler question.";

/// Answer used when the model returns neither text nor tool calls.
pub const EMPTY_ANSWER: &str = "⚠️ No response generated. Please try rephrasing your question.";

#[derive(Debug, Clone, PartialEq)]
pub enum AgentState {
  /// About to request completion number `iteration` (0-based).
  AwaitingModel { iteration: usize },
  /// The model asked for tools during `iteration`.
  ExecutingTools { iteration: usize, calls: Vec<ToolCall> },
  Done(String),
  Exhausted,
}

impl AgentState {
  pub fn is_terminal(&self) -> bool { matches!(self, Self::Done(_) | Self::Exhausted) }
}

/// How a question was answered.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentAnswer {
  pub text:       String,
  /// Model round-trips made.
  pub iterations: usize,
  pub tool_calls: usize,
  pub exhausted:  bool,
}

pub struct Agent<'a, M, S> {
  model:          &'a M,
  toolbox:        &'a Toolbox<S>,
  tools:          Vec<ToolDefinition>,
  max_iterations: usize,
}

impl<'a, M: LanguageModel, S: MatchStore> Agent<'a, M, S> {
  pub fn new(model: &'a M, toolbox: &'a Toolbox<S>, max_iterations: usize) -> Self {
    Self { model, toolbox, tools: definitions(), max_iterations }
  }

  /// Answer `question`. Only a failed model request is an error; refusals and
  /// empty answers come back as warning text.
  pub async fn answer(&self, question: &str) -> Result<AgentAnswer> {
    let mut history = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT), ChatMessage::user(question)];
    let mut state = AgentState::AwaitingModel { iteration: 0 };
    let mut iterations = 0;
    let mut tool_calls = 0;

    while !state.is_terminal() {
      state = match state {
        AgentState::AwaitingModel { iteration } if iteration >= self.max_iterations => {
          AgentState::Exhausted
        }
        AgentState::AwaitingModel { iteration } => {
          iterations += 1;
          self.ask_model(iteration, &mut history).await?
        }
        AgentState::ExecutingTools { iteration, calls } => {
          tool_calls += calls.len();
          self.run_tools(calls, &mut history).await;
          AgentState::AwaitingModel { iteration: iteration + 1 }
        }
        terminal => terminal,
      };
    }

    let exhausted = state == AgentState::Exhausted;
    let text = match state {
      AgentState::Done(text) => text,
      _ => {
        warn!(iterations, "tool loop exhausted its iteration budget");
        EXHAUSTED_ANSWER.to_owned()
      }
    };
    info!(iterations, tool_calls, exhausted, "answered question");
    Ok(AgentAnswer { text, iterations, tool_calls, exhausted })
  }

  async fn ask_model(
    &self,
    iteration: usize,
    history: &mut Vec<ChatMessage>,
  ) -> Result<AgentState> {
    let completion = self.model.complete(history.as_slice(), &self.tools).await?;

    if let Some(refusal) = completion.refusal.as_deref().filter(|r| !r.is_empty()) {
      warn!("model refused question");
      return Ok(AgentState::Done(format!("⚠️ Unable to process: {refusal}")));
    }

    if !completion.tool_calls.is_empty() {
      let calls = completion.tool_calls.clone();
      history.push(ChatMessage::assistant(completion.content, completion.tool_calls));
      return Ok(AgentState::ExecutingTools { iteration, calls });
    }

    Ok(AgentState::Done(match completion.text() {
      Some(text) => text.to_owned(),
      None => EMPTY_ANSWER.to_owned(),
    }))
  }

  async fn run_tools(&self, calls: Vec<ToolCall>, history: &mut Vec<ChatMessage>) {
    for call in calls {
      debug!(tool = %call.function.name, id = %call.id, "model requested tool");
      let result = match parse_arguments(&call.function.arguments) {
        Ok(args) => self.toolbox.call(&call.function.name, args).await,
        Err(e) => json!({ "error": format!("invalid JSON arguments: {e}") }),
      };
      history.push(ChatMessage::tool_result(call.id, result.to_string()));
    }
  }
}

fn parse_arguments(raw: &str) -> serde_json::Result<Value> {
  if raw.trim().is_empty() { Ok(Value::Null) } else { serde_json::from_str(raw) }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
  };

  use gameinsight_core::{
    record::{NewMatch, Outcome, TeamColor},
    stats::MatchStats,
  };
  use gameinsight_store_sqlite::SqliteStore;

  use super::*;
  use crate::llm::Completion;

  /// Replays scripted completions and records each request's history.
  struct Scripted {
    replies:  Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
  }

  impl Scripted {
    fn new(replies: Vec<Completion>) -> Self {
      Self { replies: Mutex::new(replies.into()), requests: Mutex::new(Vec::new()) }
    }

    /// A model that asks for the latest match forever.
    fn looping() -> Self { Self::new(Vec::new()) }
  }

  impl LanguageModel for Scripted {
    async fn complete(
      &self,
      messages: &[ChatMessage],
      tools: &[ToolDefinition],
    ) -> Result<Completion> {
      assert_eq!(tools.len(), 5);
      self.requests.lock().unwrap().push(messages.to_vec());
      Ok(self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
        calls(&[("loop", "get_latest_match", "{}")])
      }))
    }
  }

  fn text(t: &str) -> Completion { Completion { content: Some(t.into()), ..Default::default() } }

  fn calls(list: &[(&str, &str, &str)]) -> Completion {
    Completion {
      tool_calls: list.iter().map(|(id, name, args)| ToolCall::new(*id, *name, *args)).collect(),
      ..Default::default()
    }
  }

  async fn toolbox() -> Toolbox<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut stats = MatchStats::default();
    stats.core.goals = 2;
    store
      .upsert(NewMatch {
        replay_id: "r1".into(),
        date: "2024-10-01T20:00:00".into(),
        duration: 300,
        playlist: "Ranked Doubles".into(),
        team_color: TeamColor::Orange,
        result: Outcome::Win,
        stats,
        raw_stats: json!({}),
      })
      .await
      .unwrap();
    Toolbox::new(Arc::new(store))
  }

  #[tokio::test]
  async fn plain_answer_finishes_in_one_iteration() {
    let tb = toolbox().await;
    let model = Scripted::new(vec![text("You are doing fine.")]);
    let out = Agent::new(&model, &tb, 10).answer("how am I doing?").await.unwrap();

    assert_eq!(out.text, "You are doing fine.");
    assert_eq!(out.iterations, 1);
    assert_eq!(out.tool_calls, 0);
    assert!(!out.exhausted);

    let requests = model.requests.lock().unwrap();
    let first = &requests[0];
    assert_eq!(first[0].content.as_deref(), Some(CHAT_SYSTEM_PROMPT));
    assert_eq!(first[1].content.as_deref(), Some("how am I doing?"));
  }

  #[tokio::test]
  async fn tool_results_are_fed_back_in_order() {
    let tb = toolbox().await;
    let model = Scripted::new(vec![
      calls(&[
        ("a", "get_latest_match", "{}"),
        ("b", "get_match_details", r#"{"replay_id":"missing"}"#),
        ("c", "query_matches", "{not json"),
      ]),
      text("Two goals last game."),
    ]);
    let out = Agent::new(&model, &tb, 10).answer("last game?").await.unwrap();

    assert_eq!(out.text, "Two goals last game.");
    assert_eq!(out.iterations, 2);
    assert_eq!(out.tool_calls, 3);

    let requests = model.requests.lock().unwrap();
    let second = &requests[1];
    // system, user, assistant(tool calls), three tool results
    assert_eq!(second.len(), 6);
    assert_eq!(second[2].tool_calls.len(), 3);

    let results: Vec<Value> = second[3..]
      .iter()
      .map(|m| serde_json::from_str(m.content.as_deref().unwrap()).unwrap())
      .collect();
    assert_eq!(second[3].tool_call_id.as_deref(), Some("a"));
    assert_eq!(results[0]["replay_id"], "r1");
    assert_eq!(results[1]["error"], "Match missing not found in database");
    assert!(results[2]["error"].as_str().unwrap().starts_with("invalid JSON arguments"));
  }

  #[tokio::test]
  async fn endless_tool_calls_exhaust_the_budget() {
    let tb = toolbox().await;
    let model = Scripted::looping();
    let out = Agent::new(&model, &tb, 3).answer("loop forever").await.unwrap();

    assert!(out.exhausted);
    assert_eq!(out.text, EXHAUSTED_ANSWER);
    assert_eq!(out.iterations, 3);
    assert_eq!(model.requests.lock().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn refusal_and_empty_reply_end_the_loop() {
    let tb = toolbox().await;

    let refusing = Scripted::new(vec![Completion {
      refusal: Some("not allowed".into()),
      ..Default::default()
    }]);
    let out = Agent::new(&refusing, &tb, 10).answer("?").await.unwrap();
    assert_eq!(out.text, "⚠️ Unable to process: not allowed");

    let silent = Scripted::new(vec![Completion::default()]);
    let out = Agent::new(&silent, &tb, 10).answer("?").await.unwrap();
    assert_eq!(out.text, EMPTY_ANSWER);
    assert!(!out.exhausted);
  }
}
