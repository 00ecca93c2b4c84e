// Transient toast notifications

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

/// At most this many toasts are kept; older ones are dropped first.
const MAX_QUEUED: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub text: String,
    created: Instant,
}

impl Notification {
    fn expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.created) >= ttl
    }
}

/// FIFO queue of toasts with a fixed time-to-live.
#[derive(Debug)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub const fn new(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            ttl,
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Level::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        if self.queue.len() == MAX_QUEUED {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            level,
            text,
            created: Instant::now(),
        });
    }

    /// Drop every toast whose TTL has elapsed at `now`.
    pub fn prune(&mut self, now: Instant) {
        self.queue.retain(|n| !n.expired(now, self.ttl));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
