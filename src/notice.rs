//! Blocking user notifications (alerts).
//!
//! Screens raise notices through a cloneable `Notifier`; whatever front end
//! is attached drains the matching `NoticeReceiver`. Every notice is also
//! written to the log, so a detached notifier still leaves a trace.

use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl Notifier {
    /// Notifier paired with the receiver a front end drains.
    #[must_use]
    pub fn channel() -> (Self, NoticeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, NoticeReceiver { rx })
    }

    /// Notifier that only logs.
    #[must_use]
    pub fn log_only() -> Self {
        Self { tx: None }
    }

    pub fn success(&self, title: &str, message: &str) {
        self.emit(NoticeLevel::Success, title, message);
    }

    pub fn error(&self, title: &str, message: &str) {
        self.emit(NoticeLevel::Error, title, message);
    }

    fn emit(&self, level: NoticeLevel, title: &str, message: &str) {
        match level {
            NoticeLevel::Success => info!(title, message, "notice"),
            NoticeLevel::Error => warn!(title, message, "notice"),
        }
        let Some(tx) = &self.tx else {
            return;
        };
        // Receiver gone means the front end was torn down; nothing to show.
        let _ = tx.send(Notice { level, title: title.to_owned(), message: message.to_owned() });
    }
}

#[derive(Debug)]
pub struct NoticeReceiver {
    rx: mpsc::UnboundedReceiver<Notice>,
}

impl NoticeReceiver {
    pub async fn recv(&mut self) -> Option<Notice> {
        self.rx.recv().await
    }

    /// Everything queued so far, without waiting.
    pub fn drain(&mut self) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.rx.try_recv() {
            out.push(notice);
        }
        out
    }
}

#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;
