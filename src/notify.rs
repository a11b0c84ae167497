use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::time::Instant;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug)]
struct Shown {
    notice: Notice,
    at: Instant,
}

/// Holds the single toast currently on screen. A new toast replaces the old
/// one; a toast disappears on its own once it is older than the TTL.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    ttl: Duration,
    current: Arc<Mutex<Option<Shown>>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(NoticeKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NoticeKind::Error, text);
    }

    pub fn show(&self, kind: NoticeKind, text: impl Into<String>) {
        let notice = Notice {
            kind,
            text: text.into(),
        };
        tracing::debug!(kind = ?notice.kind, text = %notice.text, "notice shown");
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Shown {
            notice,
            at: Instant::now(),
        });
    }

    /// The visible toast, if any.
    pub fn current(&self) -> Option<Notice> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current
            .as_ref()
            .is_some_and(|shown| shown.at.elapsed() >= self.ttl)
        {
            *current = None;
        }
        current.as_ref().map(|shown| shown.notice.clone())
    }

    pub fn dismiss(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
