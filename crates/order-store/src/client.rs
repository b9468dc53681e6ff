//! # Store Client
//!
//! Async handle for talking to an [`OrderActor`](crate::OrderActor). Cheap to
//! clone: it only holds the channel sender.

use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::model::{NewOrder, Order, OrderId, OrderStatus};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    /// Records a new pending order and returns its id.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn place(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Place { order, respond_to })
            .await
    }

    /// Reads the current state of an order. `None` if it has not been
    /// materialized yet.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.request(|respond_to| StoreRequest::Get { id, respond_to })
            .await
    }

    /// Marks a pending order as paid.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        id: OrderId,
        receipt_url: Option<String>,
    ) -> Result<Order, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Transition {
            id,
            to: OrderStatus::Completed,
            receipt_url,
            respond_to,
        })
        .await
    }

    /// Marks an order as refunded.
    #[instrument(skip(self))]
    pub async fn refund(&self, id: OrderId) -> Result<Order, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Transition {
            id,
            to: OrderStatus::Refunded,
            receipt_url: None,
            respond_to,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_store_reports_actor_closed() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let client = StoreClient::new(sender);

        let result = client.get(OrderId(1)).await;
        assert_eq!(result, Err(StoreError::ActorClosed));
    }

    #[tokio::test]
    async fn dropped_responder_reports_actor_dropped() {
        let (sender, mut receiver) = mpsc::channel(1);
        let client = StoreClient::new(sender);

        let store = tokio::spawn(async move {
            // Swallow the request without answering it.
            let _ = receiver.recv().await;
        });

        let result = client.get(OrderId(1)).await;
        assert_eq!(result, Err(StoreError::ActorDropped));
        store.await.unwrap();
    }
}
