//! Coaching for GameInsight: prompt formatting, the language-model client,
//! single-match analysis and the tool-calling question answerer.

pub mod agent;
pub mod analyze;
pub mod error;
pub mod llm;
pub mod prompt;

pub use agent::{Agent, AgentAnswer, AgentState};
pub use analyze::analyze_match;
pub use error::{Error, Result};
pub use llm::{LanguageModel, LlmConfig, OpenAiClient};
