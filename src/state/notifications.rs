use crate::models::{Notification, NotificationKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const DEFAULT_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Default)]
struct Slot {
    active: Option<Notification>,
    /// Bumped on every notify/clear; an expiry timer only fires for its own generation.
    generation: u64,
}

/// Holds at most one live notification and expires it after `ttl`.
///
/// A new notification replaces the live one and restarts the timer; the
/// replaced notification's timer becomes a no-op.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    slot: Arc<Mutex<Slot>>,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            ttl,
        }
    }

    /// Show `message` and schedule its expiry. Must be called inside a tokio runtime.
    pub async fn notify(&self, message: impl Into<String>, kind: NotificationKind) {
        let notification = Notification::new(message, kind);
        match kind {
            NotificationKind::Info => tracing::info!(message = %notification.message, "notification"),
            NotificationKind::Error => tracing::warn!(message = %notification.message, "notification"),
        }

        let generation = {
            let mut slot = self.slot.lock().await;
            slot.generation += 1;
            slot.active = Some(notification);
            slot.generation
        };

        let center = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(center.ttl).await;
            center.expire(generation).await;
        });
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Info).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.notify(message, NotificationKind::Error).await;
    }

    pub async fn clear(&self) {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        slot.active = None;
    }

    pub async fn current(&self) -> Option<Notification> {
        self.slot.lock().await.active.clone()
    }

    async fn expire(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if slot.generation == generation {
            slot.active = None;
            tracing::debug!(generation, "notification expired");
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn expires_after_ttl() {
        let center = NotificationCenter::default();
        center.info("Sensor data saved").await;

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(
            center.current().await.map(|n| n.message),
            Some("Sensor data saved".to_string())
        );

        sleep(Duration::from_millis(2)).await;
        assert!(center.current().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn replacement_is_not_cleared_by_earlier_timer() {
        let center = NotificationCenter::default();
        center.info("first").await;

        sleep(Duration::from_millis(2000)).await;
        center.error("second").await;

        // First timer fires at 3000ms
        sleep(Duration::from_millis(1500)).await;
        let live = center.current().await.unwrap();
        assert_eq!(live.message, "second");
        assert_eq!(live.kind, NotificationKind::Error);

        // Second timer fires at 5000ms
        sleep(Duration::from_millis(1501)).await;
        assert!(center.current().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_clear_then_notify_survives_stale_timer() {
        let center = NotificationCenter::default();
        center.info("one").await;
        center.clear().await;
        assert!(center.current().await.is_none());

        sleep(Duration::from_millis(1000)).await;
        center.info("two").await;

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(center.current().await.map(|n| n.message), Some("two".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn honours_custom_ttl() {
        let center = NotificationCenter::new(Duration::from_millis(500));
        center.info("short").await;
        sleep(Duration::from_millis(501)).await;
        assert!(center.current().await.is_none());
    }
}
