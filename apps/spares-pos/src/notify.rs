//! # Notifications
//!
//! Advisory messages for the operator ("toasts"). Commands publish them on
//! a broadcast channel; any number of UIs can listen. A notice never blocks
//! or fails the operation that produced it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use spares_core::{CartNotice, CoreError};

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Notice {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Toast for a successful add-to-cart.
    pub fn for_cart(notice: &CartNotice) -> Self {
        match notice {
            CartNotice::Added { .. } => Notice::info("Added to Cart", notice.message()),
            CartNotice::Updated { .. } => Notice::info("Cart Updated", notice.message()),
        }
    }

    /// Toast for a rejected cart mutation, if the error is one the operator
    /// should see as an advisory.
    pub fn for_cart_error(err: &CoreError) -> Option<Self> {
        match err {
            CoreError::OutOfStock { .. } => Some(Notice::warning("Out of Stock", err.to_string())),
            CoreError::StockLimitExceeded { .. } => {
                Some(Notice::warning("Stock Limit Reached", err.to_string()))
            }
            _ => None,
        }
    }
}

/// Broadcast hub for notices. Clones share one channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    /// `capacity` notices are buffered per slow listener before the oldest
    /// are dropped. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Notifier { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publishes a notice. Having no listener is not an error.
    pub fn notify(&self, notice: Notice) {
        debug!(level = ?notice.level, title = %notice.title, "Notice");
        let _ = self.tx.send(notice);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}
