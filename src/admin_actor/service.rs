use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument};

use crate::clients::{AdminClient, NotificationClient};
use crate::domain::{Order, StatusFilter};
use crate::sync::{Confirmation, OrderSync};
use crate::view::{AdminCommand, CsvExport, DateFormatter, OrderListView};

use super::error::AdminError;
use super::session::AdminSession;

pub type ServiceResponse<T> = oneshot::Sender<Result<T, AdminError>>;

pub const EXPORT_SUCCEEDED: &str = "Orders exported to CSV";

/// What happened to an executed row command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The remote call is running; its result arrives as a notification.
    Dispatched,
    /// The surface should open this telephone target.
    Dial { uri: String },
    /// The delete prompt was declined and nothing was sent.
    DeleteCancelled,
}

#[derive(Debug)]
pub enum AdminRequest {
    ReplaceOrders {
        orders: Vec<Order>,
    },
    SetFilter {
        filter: StatusFilter,
    },
    SetSearch {
        term: String,
    },
    Execute {
        command: AdminCommand,
        respond_to: ServiceResponse<CommandOutcome>,
    },
    ExportCsv {
        respond_to: ServiceResponse<CsvExport>,
    },
    CurrentView {
        respond_to: ServiceResponse<OrderListView>,
    },
}

/// Display and export settings of the session.
#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub formatter: DateFormatter,
    pub export_prefix: String,
}

/// Top-level controller: the only owner of the session state. Re-renders and
/// publishes the view after every push, filter change, and search change.
pub struct AdminService {
    receiver: mpsc::Receiver<AdminRequest>,
    session: AdminSession,
    sync: OrderSync,
    notifications: NotificationClient,
    settings: AdminSettings,
    views: watch::Sender<OrderListView>,
}

impl AdminService {
    pub fn new(
        buffer_size: usize,
        sync: OrderSync,
        notifications: NotificationClient,
        settings: AdminSettings,
    ) -> (Self, AdminClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (views, watcher) = watch::channel(OrderListView::Loading);
        let service = Self {
            receiver,
            session: AdminSession::new(),
            sync,
            notifications,
            settings,
            views,
        };
        (service, AdminClient::new(sender, watcher))
    }

    #[instrument(name = "admin_service", skip(self))]
    pub async fn run(mut self) {
        info!("AdminService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AdminRequest::ReplaceOrders { orders } => {
                    self.handle_replace_orders(orders);
                }
                AdminRequest::SetFilter { filter } => {
                    self.handle_set_filter(filter);
                }
                AdminRequest::SetSearch { term } => {
                    self.handle_set_search(term);
                }
                AdminRequest::Execute {
                    command,
                    respond_to,
                } => {
                    self.handle_execute(command, respond_to);
                }
                AdminRequest::ExportCsv { respond_to } => {
                    self.handle_export(respond_to).await;
                }
                AdminRequest::CurrentView { respond_to } => {
                    let _ = respond_to.send(Ok(self.current_view()));
                }
            }
        }

        info!("AdminService stopped");
    }

    #[instrument(fields(order_count = orders.len()), skip(self, orders))]
    fn handle_replace_orders(&mut self, orders: Vec<Order>) {
        self.session.replace_orders(orders);
        info!(mirrored = self.session.mirror().len(), "Mirror replaced");
        self.publish();
    }

    #[instrument(skip(self))]
    fn handle_set_filter(&mut self, filter: StatusFilter) {
        self.session.set_filter(filter);
        self.publish();
    }

    #[instrument(skip(self))]
    fn handle_set_search(&mut self, term: String) {
        self.session.set_search(term);
        self.publish();
    }

    /// **Background dispatch** - remote writes run in their own task so a
    /// pending call never holds up pushes or input.
    #[instrument(skip(self, respond_to))]
    fn handle_execute(&mut self, command: AdminCommand, respond_to: ServiceResponse<CommandOutcome>) {
        let outcome = match command {
            AdminCommand::UpdateStatus {
                external_id,
                status,
            } => {
                let sync = self.sync.clone();
                tokio::spawn(async move {
                    let _ = sync.update_status(external_id, status).await;
                });
                CommandOutcome::Dispatched
            }
            AdminCommand::Call { uri } => {
                info!(uri = %uri, "Opening telephone target");
                CommandOutcome::Dial { uri }
            }
            AdminCommand::Delete {
                confirmation: Confirmation::Declined,
                ..
            } => {
                debug!("Delete declined, nothing sent");
                CommandOutcome::DeleteCancelled
            }
            AdminCommand::Delete {
                external_id,
                confirmation,
            } => {
                let sync = self.sync.clone();
                tokio::spawn(async move {
                    if let Ok(outcome) = sync.delete_order(external_id, confirmation).await {
                        debug!(?outcome, "Delete finished");
                    }
                });
                CommandOutcome::Dispatched
            }
        };

        let _ = respond_to.send(Ok(outcome));
    }

    /// Exports the whole mirror, whatever the active filter.
    #[instrument(skip(self, respond_to))]
    async fn handle_export(&mut self, respond_to: ServiceResponse<CsvExport>) {
        let export = CsvExport::build(
            self.session.mirror().orders(),
            &self.settings.formatter,
            &self.settings.export_prefix,
            Utc::now().date_naive(),
        );
        info!(
            file_name = %export.file_name,
            rows = self.session.mirror().len(),
            "Orders exported"
        );

        let _ = respond_to.send(Ok(export));
        self.notifications.notify_success(EXPORT_SUCCEEDED).await;
    }

    fn current_view(&self) -> OrderListView {
        self.session.view(&self.settings.formatter)
    }

    fn publish(&self) {
        let view = self.current_view();
        debug!(
            filter = %self.session.filter(),
            cards = view.cards().len(),
            "View rendered"
        );
        self.views.send_replace(view);
    }
}
