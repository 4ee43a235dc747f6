//! Shared connection state between the chat adapter and the loops that use it.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{Error, Result};

/// The channel reports and answers are posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
  pub id:       String,
  pub name:     String,
  pub guild_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStatus {
  Connecting,
  Ready(ChannelInfo),
  Failed(String),
}

/// A cloneable handle on the adapter's connection status.
///
/// The status leaves `Connecting` exactly once; later transitions are
/// ignored.
#[derive(Debug, Clone)]
pub struct ConnectionState {
  tx: Arc<watch::Sender<ChatStatus>>,
  rx: watch::Receiver<ChatStatus>,
}

impl Default for ConnectionState {
  fn default() -> Self { Self::new() }
}

impl ConnectionState {
  pub fn new() -> Self {
    let (tx, rx) = watch::channel(ChatStatus::Connecting);
    Self { tx: Arc::new(tx), rx }
  }

  pub fn status(&self) -> ChatStatus { self.rx.borrow().clone() }

  /// Move to `Ready`. Returns `false` if the status had already settled.
  pub fn set_ready(&self, info: ChannelInfo) -> bool { self.settle(ChatStatus::Ready(info)) }

  /// Move to `Failed`. Returns `false` if the status had already settled.
  pub fn set_failed(&self, reason: impl Into<String>) -> bool {
    self.settle(ChatStatus::Failed(reason.into()))
  }

  fn settle(&self, next: ChatStatus) -> bool {
    self.tx.send_if_modified(|status| {
      if *status == ChatStatus::Connecting {
        *status = next;
        true
      } else {
        false
      }
    })
  }

  /// Wait until the connection settles, at most `timeout`.
  pub async fn wait_ready(&self, timeout: Duration) -> Result<ChannelInfo> {
    let mut rx = self.rx.clone();
    let settled = tokio::time::timeout(
      timeout,
      rx.wait_for(|s| *s != ChatStatus::Connecting),
    )
    .await
    .map_err(|_| Error::NotReady(timeout))?
    .map(|s| s.clone())
    .map_err(|_| Error::ConnectionFailed("connection state dropped".into()))?;

    match settled {
      ChatStatus::Ready(info) => Ok(info),
      ChatStatus::Failed(reason) => Err(Error::ConnectionFailed(reason)),
      ChatStatus::Connecting => Err(Error::NotReady(timeout)),
    }
  }
}
