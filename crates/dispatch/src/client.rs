use geocoding::ResolvedAddress;
use model::{
    delivery::{DeliveryPoint, Placement},
    route::MapView,
    WithDistance,
};
use tokio::sync::{mpsc, oneshot};

use crate::{DispatchResult, Request};

/// Handle to a running [`Planner`](crate::planner::Planner). Cheap to clone;
/// every clone talks to the same delivery set.
#[derive(Debug, Clone)]
pub struct PlannerClient {
    sender: mpsc::Sender<Request>,
}

impl PlannerClient {
    pub(crate) fn new(sender: mpsc::Sender<Request>) -> Self {
        Self { sender }
    }

    /// Creates a delivery point for `resolved` and returns where it landed.
    pub async fn insert(
        &self,
        label: impl Into<String>,
        resolved: ResolvedAddress,
    ) -> DispatchResult<Placement> {
        let (responder, response) = oneshot::channel();
        self.sender
            .send(Request::Insert {
                label: label.into(),
                resolved,
                responder,
            })
            .await?;
        Ok(response.await??)
    }

    /// Delivery points nearest first.
    pub async fn current_order(&self) -> DispatchResult<Vec<WithDistance<DeliveryPoint>>> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::CurrentOrder { responder }).await?;
        Ok(response.await?)
    }

    pub async fn map_view(&self) -> DispatchResult<MapView> {
        let (responder, response) = oneshot::channel();
        self.sender.send(Request::MapView { responder }).await?;
        Ok(response.await?)
    }
}
