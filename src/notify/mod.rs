//! Transient user-facing notifications (toasts).
//!
//! A single slot: a new notification replaces whatever is showing, there is no queue.
//! Notifications expire [`NOTIFICATION_TTL`] after being shown unless dismissed earlier.
//! Expiry is evaluated lazily against the caller's clock.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: usize,
    pub level: NotificationLevel,
    pub message: String,
    pub shown_at: Instant,
}

impl Notification {
    pub fn expires_at(&self, ttl: Duration) -> Instant {
        self.shown_at + ttl
    }
}

type Subscriber = Box<dyn FnMut(&Notification) + Send>;

pub struct Notifier {
    slot: Option<Notification>,
    ttl: Duration,
    next_id: usize,
    subscribers: Vec<Subscriber>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { slot: None, ttl, next_id: 0, subscribers: Vec::new() }
    }

    /// Register a hook called with every new notification
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Notification) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Show `message`, superseding any pending notification. Returns its id.
    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) -> usize {
        self.notify_at(level, message, Instant::now())
    }

    pub fn notify_at(&mut self, level: NotificationLevel, message: impl Into<String>, now: Instant) -> usize {
        let id = self.next_id;
        self.next_id += 1;

        let notification = Notification { id, level, message: message.into(), shown_at: now };
        debug!(id, %level, message = %notification.message, "notification");

        for subscriber in &mut self.subscribers {
            subscriber(&notification);
        }
        self.slot = Some(notification);
        id
    }

    /// The notification still showing, if any
    pub fn current(&self) -> Option<&Notification> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&Notification> {
        self.slot.as_ref().filter(|n| now < n.expires_at(self.ttl))
    }

    /// Most recent notification regardless of expiry
    pub fn last(&self) -> Option<&Notification> {
        self.slot.as_ref()
    }

    pub fn dismiss(&mut self) -> Option<Notification> {
        self.slot.take()
    }

    /// Dismiss only if `id` is still the one showing; stale timers must not clear newer toasts
    pub fn dismiss_id(&mut self, id: usize) -> bool {
        if self.slot.as_ref().is_some_and(|n| n.id == id) {
            self.slot = None;
            true
        } else {
            false
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("slot", &self.slot)
            .field("ttl", &self.ttl)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
