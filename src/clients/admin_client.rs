use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

use crate::admin_actor::{AdminError, AdminRequest, CommandOutcome};
use crate::domain::{Order, StatusFilter};
use crate::view::{AdminCommand, CsvExport, OrderListView};

/// Client for the admin session, used by the sync task and by surfaces.
#[derive(Clone)]
pub struct AdminClient {
    sender: mpsc::Sender<AdminRequest>,
    views: watch::Receiver<OrderListView>,
}

impl AdminClient {
    pub fn new(sender: mpsc::Sender<AdminRequest>, views: watch::Receiver<OrderListView>) -> Self {
        Self { sender, views }
    }

    /// Latest rendered view; changes after every re-render.
    pub fn views(&self) -> watch::Receiver<OrderListView> {
        self.views.clone()
    }

    #[instrument(fields(order_count = orders.len()), skip(self, orders))]
    pub async fn replace_orders(&self, orders: Vec<Order>) -> Result<(), AdminError> {
        debug!("Sending request");
        self.send(AdminRequest::ReplaceOrders { orders }).await
    }

    #[instrument(skip(self))]
    pub async fn set_filter(&self, filter: StatusFilter) -> Result<(), AdminError> {
        debug!("Sending request");
        self.send(AdminRequest::SetFilter { filter }).await
    }

    #[instrument(skip(self))]
    pub async fn set_search(&self, term: String) -> Result<(), AdminError> {
        debug!("Sending request");
        self.send(AdminRequest::SetSearch { term }).await
    }

    async fn send(&self, request: AdminRequest) -> Result<(), AdminError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| AdminError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(AdminClient => fn execute(command: AdminCommand) -> CommandOutcome as AdminRequest::Execute, Error = AdminError::ActorCommunicationError);
client_method!(AdminClient => fn export_csv() -> CsvExport as AdminRequest::ExportCsv, Error = AdminError::ActorCommunicationError);
client_method!(AdminClient => fn current_view() -> OrderListView as AdminRequest::CurrentView, Error = AdminError::ActorCommunicationError);
