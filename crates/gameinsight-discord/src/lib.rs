//! Chat adapter for GameInsight.
//!
//! - [`channel`]: the [`ChatChannel`] seam and message chunking.
//! - [`state`]: [`ConnectionState`], the shared one-shot ready signal.
//! - [`discord`]: the Discord REST implementation.

pub mod channel;
pub mod discord;
pub mod error;
pub mod state;

pub use channel::{ChatChannel, Mention, MentionBatch, post_chunked, post_report, split_message};
pub use discord::{DiscordChannel, DiscordConfig};
pub use error::{Error, Result};
pub use state::{ChannelInfo, ChatStatus, ConnectionState};
