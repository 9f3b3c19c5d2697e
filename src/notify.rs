#[cfg(test)]
use std::sync::Mutex;

use tracing::{info, warn};

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

/// A one-shot, user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    /// Destructive notice for a failed call: the server's message, or
    /// `fallback` when there is none.
    pub fn failure(title: impl Into<String>, err: &ApiError, fallback: &str) -> Self {
        Self::error(title, err.message_or(fallback))
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.variant {
            Variant::Default => {
                info!("{}: {}", notice.title, notice.description);
                eprintln!("✅ {}: {}", notice.title, notice.description);
            }
            Variant::Destructive => {
                warn!("{}: {}", notice.title, notice.description);
                eprintln!("❌ {}: {}", notice.title, notice.description);
            }
        }
    }
}

/// Keeps every notice
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
