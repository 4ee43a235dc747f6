//! Chat-completion client for OpenAI-compatible endpoints.

use std::future::Future;

use gameinsight_tools::ToolDefinition;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_base_url() -> String { "https://api.openai.com/v1".to_owned() }
fn default_model() -> String { "gpt-5-mini".to_owned() }
fn default_max_tool_iterations() -> usize { 10 }

/// The `[llm]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
  pub api_key:             String,
  #[serde(default = "default_base_url")]
  pub base_url:            String,
  #[serde(default = "default_model")]
  pub model:               String,
  /// Model round-trips allowed when answering one chat question.
  #[serde(default = "default_max_tool_iterations")]
  pub max_tool_iterations: usize,
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
  Tool,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:         Role,
  #[serde(default)]
  pub content:      Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub tool_calls:   Vec<ToolCall>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tool_call_id: Option<String>,
}

impl ChatMessage {
  fn text(role: Role, content: impl Into<String>) -> Self {
    Self { role, content: Some(content.into()), tool_calls: Vec::new(), tool_call_id: None }
  }

  pub fn system(content: impl Into<String>) -> Self { Self::text(Role::System, content) }

  pub fn user(content: impl Into<String>) -> Self { Self::text(Role::User, content) }

  /// The assistant turn that requested `calls`, echoed back into the history.
  pub fn assistant(content: Option<String>, calls: Vec<ToolCall>) -> Self {
    Self { role: Role::Assistant, content, tool_calls: calls, tool_call_id: None }
  }

  pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      role:         Role::Tool,
      content:      Some(content.into()),
      tool_calls:   Vec::new(),
      tool_call_id: Some(call_id.into()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
  pub id:       String,
  #[serde(rename = "type", default = "function_kind")]
  pub kind:     String,
  pub function: FunctionCall,
}

fn function_kind() -> String { "function".to_owned() }

impl ToolCall {
  pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
    Self {
      id:       id.into(),
      kind:     function_kind(),
      function: FunctionCall { name: name.into(), arguments: arguments.into() },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
  pub name:      String,
  /// JSON-encoded argument object, as produced by the model.
  pub arguments: String,
}

/// The assistant message of one completion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Completion {
  #[serde(default)]
  pub content:    Option<String>,
  #[serde(default)]
  pub refusal:    Option<String>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub tool_calls: Vec<ToolCall>,
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<Vec<ToolCall>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  Ok(Option::<Vec<ToolCall>>::deserialize(d)?.unwrap_or_default())
}

impl Completion {
  /// The text content, if it is non-blank.
  pub fn text(&self) -> Option<&str> {
    self.content.as_deref().filter(|c| !c.trim().is_empty())
  }
}

// ─── Model trait ─────────────────────────────────────────────────────────────

/// A chat model that may answer with text or with tool calls.
pub trait LanguageModel: Send + Sync {
  /// One completion over `messages`. `tools` is omitted from the request
  /// when empty.
  fn complete(
    &self,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
  ) -> impl Future<Output = Result<Completion>> + Send;
}

// ─── HTTP client ─────────────────────────────────────────────────────────────

/// Client for `POST {base_url}/chat/completions`.
///
/// Requests carry no timeout; model calls may legitimately take minutes.
#[derive(Clone)]
pub struct OpenAiClient {
  client: Client,
  config: LlmConfig,
}

#[derive(Deserialize)]
struct CompletionResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: Completion,
}

impl OpenAiClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    let client = Client::builder().build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &LlmConfig { &self.config }

  fn request_body(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Value {
    let mut body = json!({ "model": self.config.model, "messages": messages });
    if !tools.is_empty() {
      let tools: Vec<Value> = tools
        .iter()
        .map(|t| json!({ "type": "function", "function": t }))
        .collect();
      body["tools"] = Value::Array(tools);
      body["tool_choice"] = json!("auto");
    }
    body
  }
}

impl LanguageModel for OpenAiClient {
  async fn complete(
    &self,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
  ) -> Result<Completion> {
    let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
    debug!(%url, messages = messages.len(), tools = tools.len(), "requesting completion");

    let resp = self
      .client
      .post(&url)
      .bearer_auth(&self.config.api_key)
      .json(&self.request_body(messages, tools))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let parsed: CompletionResponse = resp.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .map(|c| c.message)
      .ok_or(Error::NoChoices)
  }
}
