use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Why a toast left the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DismissalReason {
    /// The user closed the toast.
    UserCanceled,
    /// The application hid the toast.
    ApplicationHidden,
    /// The toast was shown for its maximum time and faded out.
    TimedOut,
}

/// Notifications re-published from the platform to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ToastEvent {
    Activated { id: i64, action: Option<usize> },
    Dismissed { id: i64, reason: DismissalReason },
    Failed { id: i64, error: Option<String> },
}

impl ToastEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ToastEvent::Activated { .. } => "Activated",
            ToastEvent::Dismissed { .. } => "Dismissed",
            ToastEvent::Failed { .. } => "Failed",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ToastEvent::Activated { id, .. }
            | ToastEvent::Dismissed { id, .. }
            | ToastEvent::Failed { id, .. } => *id,
        }
    }
}

/// Fan-out of toast events to every subscriber.
#[derive(Clone)]
pub struct ToastEvents {
    sender: Arc<broadcast::Sender<ToastEvent>>,
}

impl ToastEvents {
    /// # Arguments
    /// * `capacity` - The capacity of the broadcast channel
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of receivers that got the event.
    pub fn broadcast(&self, event: ToastEvent) -> usize {
        match self.sender.send(event.clone()) {
            Ok(count) => {
                tracing::debug!(target: "toast::events", event = event.name(), id = event.id(), subscribers = count, "Broadcast toast event");
                count
            }
            Err(e) => {
                tracing::warn!(target: "toast::events", error = ?e, "Dropped toast event (no active subscribers)");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ToastEvents {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Per-toast sink handed to the backend.
///
/// Backends call it from whatever thread the platform delivers events on; every
/// method only publishes to the broadcast channel.
#[derive(Clone)]
pub struct ToastCallbacks {
    id: i64,
    expires_at: Option<DateTime<Utc>>,
    events: ToastEvents,
}

impl ToastCallbacks {
    pub fn new(id: i64, expires_at: Option<DateTime<Utc>>, events: ToastEvents) -> Self {
        Self {
            id,
            expires_at,
            events,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// `arguments` is the string attached to the clicked element; action buttons
    /// carry their index.
    pub fn activated(&self, arguments: Option<&str>) {
        let action = arguments.and_then(parse_action_index);
        self.events.broadcast(ToastEvent::Activated {
            id: self.id,
            action,
        });
    }

    pub fn dismissed(&self, reason: DismissalReason) {
        let reason = correct_dismissal(reason, self.expires_at, Utc::now());
        self.events.broadcast(ToastEvent::Dismissed {
            id: self.id,
            reason,
        });
    }

    pub fn failed(&self, error: Option<String>) {
        if let Some(error) = &error {
            tracing::warn!(target: "toast::events", id = self.id, %error, "Toast failed");
        }
        self.events.broadcast(ToastEvent::Failed {
            id: self.id,
            error,
        });
    }
}

/// The platform reports an expired toast as canceled by the user; once the
/// expiration time has passed the reason is really a timeout.
pub fn correct_dismissal(
    reason: DismissalReason,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DismissalReason {
    match (reason, expires_at) {
        (DismissalReason::UserCanceled, Some(expires_at)) if now >= expires_at => {
            DismissalReason::TimedOut
        }
        _ => reason,
    }
}

/// Button index from activation arguments; anything non-numeric is a plain activation (`None`).
pub fn parse_action_index(arguments: &str) -> Option<usize> {
    let arguments = arguments.trim();
    if arguments.is_empty() {
        return None;
    }
    arguments.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_user_cancel_after_expiry_is_timeout() {
        let now = Utc::now();
        let expired = Some(now - Duration::seconds(1));
        let pending = Some(now + Duration::seconds(60));

        assert_eq!(
            correct_dismissal(DismissalReason::UserCanceled, expired, now),
            DismissalReason::TimedOut
        );
        assert_eq!(
            correct_dismissal(DismissalReason::UserCanceled, Some(now), now),
            DismissalReason::TimedOut
        );
        assert_eq!(
            correct_dismissal(DismissalReason::UserCanceled, pending, now),
            DismissalReason::UserCanceled
        );
        assert_eq!(
            correct_dismissal(DismissalReason::UserCanceled, None, now),
            DismissalReason::UserCanceled
        );
        assert_eq!(
            correct_dismissal(DismissalReason::ApplicationHidden, expired, now),
            DismissalReason::ApplicationHidden
        );
    }

    #[test]
    fn test_parse_action_index() {
        assert_eq!(parse_action_index("0"), Some(0));
        assert_eq!(parse_action_index(" 12 "), Some(12));
        assert_eq!(parse_action_index(""), None);
        assert_eq!(parse_action_index("action=open"), None);
        assert_eq!(parse_action_index("-1"), None);
    }

    #[test]
    fn test_callbacks_publish_events() {
        let events = ToastEvents::new(8);
        let mut rx = events.subscribe();
        let callbacks = ToastCallbacks::new(7, None, events.clone());

        callbacks.activated(Some("1"));
        callbacks.activated(None);
        callbacks.dismissed(DismissalReason::UserCanceled);
        callbacks.failed(Some("0x803E0105".to_string()));

        assert_eq!(
            rx.try_recv().unwrap(),
            ToastEvent::Activated { id: 7, action: Some(1) }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ToastEvent::Activated { id: 7, action: None }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ToastEvent::Dismissed {
                id: 7,
                reason: DismissalReason::UserCanceled
            }
        );
        assert_eq!(rx.try_recv().unwrap().name(), "Failed");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let events = ToastEvents::default();
        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(
            events.broadcast(ToastEvent::Failed { id: 1, error: None }),
            0
        );
    }
}
