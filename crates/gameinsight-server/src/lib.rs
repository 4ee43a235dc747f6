//! The GameInsight service: configuration, the replay polling pipeline and
//! the mention responder, wired together by the `gameinsight` binary.

pub mod config;
pub mod mentions;
pub mod pipeline;

pub use config::AppConfig;
pub use mentions::MentionResponder;
pub use pipeline::{Pipeline, PipelineError};
