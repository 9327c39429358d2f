//! Transient user-visible notifications (toasts)

use std::time::{Duration, Instant};
use tracing::{info, warn};

const MIN_DURATION: Duration = Duration::from_secs(3);
const MAX_DURATION: Duration = Duration::from_secs(7);
const WORDS_PER_SECOND: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub level: NoticeLevel,
    pub expires_at: Instant,
}

/// Reading time at four words per second, clamped to 3..=7 seconds
pub fn display_duration(message: &str) -> Duration {
    let words = message.split(' ').count() as f64;
    Duration::from_secs_f64(words / WORDS_PER_SECOND).clamp(MIN_DURATION, MAX_DURATION)
}

#[derive(Debug, Default)]
pub struct Notifications {
    active: Vec<Notice>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, level: NoticeLevel, now: Instant) -> u64 {
        let message = message.into();
        match level {
            NoticeLevel::Info => info!("{}", message),
            NoticeLevel::Warning => warn!("{}", message),
        }
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(Notice {
            id,
            expires_at: now + display_duration(&message),
            message,
            level,
        });
        id
    }

    pub fn warn(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.show(message, NoticeLevel::Warning, now)
    }

    pub fn info(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.show(message, NoticeLevel::Info, now)
    }

    /// Drop expired notices; returns how many were removed
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| n.expires_at > now);
        before - self.active.len()
    }

    pub fn active(&self) -> &[Notice] {
        &self.active
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.active.iter().map(|n| n.expires_at).min()
    }
}
