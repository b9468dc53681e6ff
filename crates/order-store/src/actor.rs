//! # Order Store Actor
//!
//! The `OrderActor` owns every order the backend has materialized and answers
//! [`StoreRequest`]s one at a time. Payment webhooks place and complete orders;
//! the checkout page only ever reads them.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::model::{NewOrder, Order, OrderId, OrderStatus};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns the order table.
///
/// **Concurrency Model**:
/// The actor processes its messages *sequentially* in a single task, so the
/// `orders` map needs no `Mutex`. Status transitions are checked and applied in
/// the same step, which keeps them monotonic even with many concurrent clients.
pub struct OrderActor {
    receiver: mpsc::Receiver<StoreRequest>,
    orders: HashMap<OrderId, Order>,
    next_id: u64,
}

impl OrderActor {
    /// Creates the actor and its client. Ids are handed out from `first_id`
    /// upward.
    pub fn new(buffer_size: usize, first_id: u64) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            orders: HashMap::new(),
            next_id: first_id,
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self) {
        info!("Order store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Place { order, respond_to } => {
                    debug!(?order, "Place");
                    let _ = respond_to.send(self.place(order));
                }
                StoreRequest::Get { id, respond_to } => {
                    let order = self.orders.get(&id).cloned();
                    debug!(order_id = %id, found = order.is_some(), "Get");
                    let _ = respond_to.send(Ok(order));
                }
                StoreRequest::Transition {
                    id,
                    to,
                    receipt_url,
                    respond_to,
                } => {
                    debug!(order_id = %id, %to, "Transition");
                    let _ = respond_to.send(self.transition(id, to, receipt_url));
                }
            }
        }

        info!(size = self.orders.len(), "Order store shutdown");
    }

    fn place(&mut self, params: NewOrder) -> Result<OrderId, StoreError> {
        if params.items.is_empty() {
            warn!("Place rejected: no line items");
            return Err(StoreError::EmptyOrder);
        }
        if params.checked_total().is_none() {
            warn!(items = params.items.len(), "Place rejected: total overflows");
            return Err(StoreError::TotalOverflow);
        }

        let id = OrderId(self.next_id);
        self.next_id += 1;

        let order = Order::from_new(id, params);
        info!(order_id = %id, total = order.total, size = self.orders.len() + 1, "Placed");
        self.orders.insert(id, order);
        Ok(id)
    }

    fn transition(
        &mut self,
        id: OrderId,
        to: OrderStatus,
        receipt_url: Option<String>,
    ) -> Result<Order, StoreError> {
        let Some(order) = self.orders.get_mut(&id) else {
            warn!(order_id = %id, "Not found");
            return Err(StoreError::NotFound(id));
        };

        if !order.status.can_transition_to(to) {
            warn!(order_id = %id, from = %order.status, %to, "Transition rejected");
            return Err(StoreError::InvalidTransition {
                id,
                from: order.status,
                to,
            });
        }

        order.status = to;
        if receipt_url.is_some() {
            order.receipt_url = receipt_url;
        }
        info!(order_id = %id, status = %to, "Status changed");
        Ok(order.clone())
    }
}
