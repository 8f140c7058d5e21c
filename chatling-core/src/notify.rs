//! Outbound notification port.
//!
//! The scheduler turns pass outcomes into [`Notification`]s and hands
//! them to a [`Notifier`]. Delivery is best effort: the scheduler times
//! out slow notifiers and a failed delivery never touches pet state.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{EngineError, Result};
use crate::types::ChatId;

/// A chat announcement produced by an engine pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Destination chat.
    pub chat: ChatId,
    /// Announcement text, ready to send.
    pub text: String,
}

impl Notification {
    /// Build a notification for `chat`.
    #[must_use]
    pub fn new(chat: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat,
            text: text.into(),
        }
    }
}

/// Delivery port towards the chat transport.
///
/// Implement this for whatever actually talks to the chat platform.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Notify`] when delivery fails; the caller
    /// logs and moves on.
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Notifier that forwards into a bounded channel.
///
/// For transports that drain notifications from their own task, and for
/// tests. A full channel drops the notification rather than blocking a
/// scheduler pass behind a slow consumer.
#[derive(Debug)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    /// Create the notifier and its receiving end, with room for
    /// `capacity` undelivered notifications.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.tx.try_send(notification).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "notification channel full",
                mpsc::error::TrySendError::Closed(_) => "notification channel closed",
            };
            EngineError::Notify(reason.to_string())
        })
    }
}

/// Notifier that discards everything at debug log level. The default
/// when no transport is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        tracing::debug!(
            chat = %notification.chat,
            text = %notification.text,
            "Notification discarded (no transport)"
        );
        Ok(())
    }
}
