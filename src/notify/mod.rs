// Confetti - A wedding media-sharing gallery
// Copyright (C) 2026 Confetti Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Notification broker
//!
//! Holds the queue of ephemeral user-facing messages. Every notification
//! owns an independent auto-dismiss timer; dismissing or expiring one never
//! affects the others.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::models::{events, IpcMessage, Notification, Severity};

/// Notification broker shared across the core
pub struct NotificationBroker {
    inner: Arc<BrokerInner>,
}

struct BrokerInner {
    active: Mutex<Vec<Notification>>,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    events: Option<broadcast::Sender<IpcMessage>>,
}

impl NotificationBroker {
    /// Create a broker that keeps notifications locally
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a broker that also pushes shown/dismissed events to the UI
    pub fn with_events(events: broadcast::Sender<IpcMessage>) -> Self {
        Self::build(Some(events))
    }

    fn build(events: Option<broadcast::Sender<IpcMessage>>) -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                active: Mutex::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Enqueue a notification, returning its id.
    ///
    /// When `auto_dismiss_ms > 0` an independent timer dismisses it after
    /// that delay; 0 keeps it until explicitly dismissed.
    pub fn notify(&self, severity: Severity, text: impl Into<String>, auto_dismiss_ms: u64) -> String {
        let notification = Notification::new(severity, text.into(), auto_dismiss_ms);
        let id = notification.id.clone();

        self.inner.active.lock().unwrap().push(notification.clone());
        self.inner.send_event(IpcMessage::event(
            events::NOTIFICATION_SHOWN,
            serde_json::json!(notification),
        ));

        if auto_dismiss_ms > 0 {
            let inner = self.inner.clone();
            let timer_id = id.clone();
            let handle = tokio::spawn(async move {
                sleep(Duration::from_millis(auto_dismiss_ms)).await;
                inner.remove(&timer_id);
            });
            self.inner.timers.lock().unwrap().insert(id.clone(), handle);
        }

        debug!("Notification {} raised", id);
        id
    }

    /// Dismiss a notification immediately, cancelling its pending timer.
    /// Unknown ids are a no-op.
    pub fn dismiss(&self, id: &str) {
        if let Some(handle) = self.inner.timers.lock().unwrap().remove(id) {
            handle.abort();
        }
        self.inner.remove(id);
    }

    /// Snapshot of the currently active notifications
    pub fn active(&self) -> Vec<Notification> {
        self.inner.active.lock().unwrap().clone()
    }
}

impl Default for NotificationBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerInner {
    fn remove(&self, id: &str) {
        let removed = {
            let mut active = self.active.lock().unwrap();
            let before = active.len();
            active.retain(|n| n.id != id);
            active.len() != before
        };

        if removed {
            self.timers.lock().unwrap().remove(id);
            self.send_event(IpcMessage::event(
                events::NOTIFICATION_DISMISSED,
                serde_json::json!({ "id": id }),
            ));
            debug!("Notification {} dismissed", id);
        }
    }

    fn send_event(&self, message: IpcMessage) {
        if let Some(tx) = &self.events {
            let _ = tx.send(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_AUTO_DISMISS_MS;

    #[tokio::test(start_paused = true)]
    async fn notifications_auto_dismiss_after_their_delay() {
        let broker = NotificationBroker::new();
        let id = broker.notify(Severity::Success, "saved", DEFAULT_AUTO_DISMISS_MS);

        assert_eq!(broker.active().len(), 1);
        assert_eq!(broker.active()[0].id, id);

        sleep(Duration::from_millis(DEFAULT_AUTO_DISMISS_MS + 100)).await;
        assert!(broker.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_notifications_stay_until_dismissed() {
        let broker = NotificationBroker::new();
        let id = broker.notify(Severity::Info, "sticky", 0);

        sleep(Duration::from_secs(3600)).await;
        assert_eq!(broker.active().len(), 1);

        broker.dismiss(&id);
        assert!(broker.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timers_are_independent_of_each_other() {
        let broker = NotificationBroker::new();
        let short = broker.notify(Severity::Info, "short", 1000);
        let long = broker.notify(Severity::Info, "long", 5000);

        sleep(Duration::from_millis(2000)).await;
        let active = broker.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, long);

        // Dismissing one never affects another.
        broker.dismiss(&long);
        assert!(broker.active().is_empty());

        // The short timer already fired; nothing left to expire.
        sleep(Duration::from_millis(5000)).await;
        assert!(broker.active().is_empty());
        let _ = short;
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_an_unknown_id_is_a_no_op() {
        let broker = NotificationBroker::new();
        broker.notify(Severity::Error, "kept", 0);

        broker.dismiss("not-a-real-id");
        assert_eq!(broker.active().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_dismissal_cancels_the_timer() {
        let broker = NotificationBroker::new();
        let id = broker.notify(Severity::Success, "done", 3000);

        broker.dismiss(&id);
        assert!(broker.active().is_empty());

        // Raise another with the same lifetime; the aborted timer from the
        // first must not touch it.
        let second = broker.notify(Severity::Success, "done again", 3000);
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(broker.active().len(), 1);
        assert_eq!(broker.active()[0].id, second);
    }
}
