use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument};

use crate::clients::NotificationClient;

use super::entity::{
    Notification, NotificationKind, NotificationPhase, DISPLAY_DURATION, REMOVE_DELAY, SHOW_DELAY,
};
use super::error::NotificationError;

pub type ServiceResponse<T> = oneshot::Sender<Result<T, NotificationError>>;

#[derive(Debug)]
pub enum NotificationRequest {
    Notify {
        message: String,
        kind: NotificationKind,
    },
    /// Sent by a notification's own timer. `None` removes it.
    Advance {
        id: u64,
        phase: Option<NotificationPhase>,
    },
    #[allow(dead_code)]
    Active {
        respond_to: ServiceResponse<Vec<Notification>>,
    },
}

/// Owns the stack of visible notifications and drives each one through
/// entering, shown, and leaving before removing it.
pub struct NotificationService {
    receiver: mpsc::Receiver<NotificationRequest>,
    timers: mpsc::WeakSender<NotificationRequest>,
    active: Vec<Notification>,
    next_id: u64,
    updates: watch::Sender<Vec<Notification>>,
}

impl NotificationService {
    pub fn new(buffer_size: usize) -> (Self, NotificationClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (updates, watcher) = watch::channel(Vec::new());
        let service = Self {
            receiver,
            timers: sender.downgrade(),
            active: Vec::new(),
            next_id: 1,
            updates,
        };
        (service, NotificationClient::new(sender, watcher))
    }

    #[instrument(name = "notification_service", skip(self))]
    pub async fn run(mut self) {
        info!("NotificationService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                NotificationRequest::Notify { message, kind } => {
                    self.handle_notify(message, kind);
                }
                NotificationRequest::Advance { id, phase } => {
                    self.handle_advance(id, phase);
                }
                NotificationRequest::Active { respond_to } => {
                    let _ = respond_to.send(Ok(self.active.clone()));
                }
            }
        }

        info!("NotificationService stopped");
    }

    #[instrument(skip(self))]
    fn handle_notify(&mut self, message: String, kind: NotificationKind) {
        let id = self.next_id;
        self.next_id += 1;

        self.active.push(Notification {
            id,
            message,
            kind,
            phase: NotificationPhase::Entering,
        });
        debug!(notification_id = id, stacked = self.active.len(), "Notification inserted");

        self.schedule(id);
        self.publish();
    }

    fn handle_advance(&mut self, id: u64, phase: Option<NotificationPhase>) {
        match phase {
            Some(phase) => {
                if let Some(notification) = self.active.iter_mut().find(|n| n.id == id) {
                    notification.phase = phase;
                }
            }
            None => self.active.retain(|n| n.id != id),
        }
        self.publish();
    }

    fn schedule(&self, id: u64) {
        let timers = self.timers.clone();
        tokio::spawn(async move {
            let steps = [
                (SHOW_DELAY, Some(NotificationPhase::Shown)),
                (DISPLAY_DURATION - SHOW_DELAY, Some(NotificationPhase::Leaving)),
                (REMOVE_DELAY, None),
            ];
            for (delay, phase) in steps {
                tokio::time::sleep(delay).await;
                let Some(sender) = timers.upgrade() else {
                    return;
                };
                if sender
                    .send(NotificationRequest::Advance { id, phase })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });
    }

    fn publish(&self) {
        self.updates.send_replace(self.active.clone());
    }
}
