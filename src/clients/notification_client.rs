use tokio::sync::{mpsc, watch};
use tracing::warn;

#[cfg(test)]
use crate::notification_actor::NotificationError;
use crate::notification_actor::{Notification, NotificationKind, NotificationRequest};

/// Client for the notification stack.
#[derive(Clone)]
pub struct NotificationClient {
    sender: mpsc::Sender<NotificationRequest>,
    updates: watch::Receiver<Vec<Notification>>,
}

impl NotificationClient {
    pub fn new(
        sender: mpsc::Sender<NotificationRequest>,
        updates: watch::Receiver<Vec<Notification>>,
    ) -> Self {
        Self { sender, updates }
    }

    /// Fire-and-forget; a closed notification service only costs a log line.
    pub async fn notify(&self, message: impl Into<String>, kind: NotificationKind) {
        let message = message.into();
        if self
            .sender
            .send(NotificationRequest::Notify { message, kind })
            .await
            .is_err()
        {
            warn!(kind = %kind, "Notification service closed");
        }
    }

    /// Active stack, republished after every insertion, phase change, and removal.
    pub fn updates(&self) -> watch::Receiver<Vec<Notification>> {
        self.updates.clone()
    }
}

notify_methods!(NotificationClient => Info, Success, Error);

#[cfg(test)]
client_method!(NotificationClient => fn active() -> Vec<Notification> as NotificationRequest::Active, Error = NotificationError::ActorCommunicationError);
