//! User-facing notices raised by the client
//!
//! The client never talks to a UI directly. Notices go through a [`Notifier`]
//! supplied by the host application; [`LogNotifier`] writes them to the log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// Unread messages are waiting on the site
    UnreadMessages { count: u32 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadMessages { count } => write!(f, "You have {count} unread message(s)"),
        }
    }
}

/// Delivery channel for notices
pub trait Notifier: Send + Sync {
    /// Surface a notice; must not block
    fn notify(&self, notice: &Notice);
}

/// Notifier that writes notices to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::info!(notice = %notice, "Notice");
    }
}

/// Decide whether an unread-message count should be surfaced now
///
/// A positive count is shown when nothing was shown before, or when more than
/// `cooldown` has passed since the last notice.
pub fn should_notify_unread(
    count: u32,
    last_notice_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> bool {
    if count == 0 {
        return false;
    }

    match last_notice_at {
        None => true,
        Some(last) => {
            let elapsed = now.signed_duration_since(last);
            // Clock moved backwards: treat as not elapsed
            elapsed
                .to_std()
                .map(|elapsed| elapsed > cooldown)
                .unwrap_or(false)
        }
    }
}
