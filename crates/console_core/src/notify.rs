use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Outcome-reporting seam shared by every screen.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, message: &str, severity: Severity);
    async fn clear(&self);
}

/// Process-wide transient message holder. At most one notification is live at
/// any instant; showing a new one replaces the current message and restarts
/// the auto-dismiss timer.
pub struct NotificationChannel {
    ttl: Duration,
    shared: Arc<Shared>,
}

struct Shared {
    current: watch::Sender<Option<Notification>>,
    timer: Mutex<TimerState>,
}

struct TimerState {
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            ttl,
            shared: Arc::new(Shared {
                current,
                timer: Mutex::new(TimerState {
                    generation: 0,
                    expiry: None,
                }),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.shared.current.subscribe()
    }

    pub fn current(&self) -> Option<Notification> {
        self.shared.current.borrow().clone()
    }

    pub async fn show(&self, message: &str, severity: Severity) {
        let notification = Notification {
            message: message.to_string(),
            severity,
            created_at: Utc::now(),
        };

        let mut timer = self.shared.timer.lock().await;
        timer.generation += 1;
        let generation = timer.generation;
        if let Some(task) = timer.expiry.take() {
            task.abort();
        }

        let _ = self.shared.current.send(Some(notification));

        let shared = Arc::clone(&self.shared);
        let ttl = self.ttl;
        timer.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut timer = shared.timer.lock().await;
            // A timer that outlived its own notification must not clear a
            // newer one.
            if timer.generation == generation {
                let _ = shared.current.send(None);
                timer.expiry = None;
            }
        }));
    }

    pub async fn clear(&self) {
        let mut timer = self.shared.timer.lock().await;
        timer.generation += 1;
        if let Some(task) = timer.expiry.take() {
            task.abort();
        }
        let _ = self.shared.current.send(None);
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotificationChannel {
    async fn show(&self, message: &str, severity: Severity) {
        NotificationChannel::show(self, message, severity).await;
    }

    async fn clear(&self) {
        NotificationChannel::clear(self).await;
    }
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
