//! # Store Messages
//!
//! The requests an [`OrderActor`](crate::OrderActor) understands. Each carries a
//! oneshot sender the actor answers on.

use crate::error::StoreError;
use crate::model::{NewOrder, Order, OrderId, OrderStatus};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Internal message type sent to the store actor.
///
/// There is no generic update or delete: once placed, an order only changes by
/// moving its status forward.
#[derive(Debug)]
pub enum StoreRequest {
    Place {
        order: NewOrder,
        respond_to: Response<OrderId>,
    },
    Get {
        id: OrderId,
        respond_to: Response<Option<Order>>,
    },
    Transition {
        id: OrderId,
        to: OrderStatus,
        receipt_url: Option<String>,
        respond_to: Response<Order>,
    },
}
