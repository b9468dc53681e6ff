//! # Store Errors
//!
//! Errors raised by the order store actor and its client.

use crate::model::{OrderId, OrderStatus};

/// Errors that can occur while talking to the order store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Order store closed")]
    ActorClosed,
    #[error("Order store dropped response channel")]
    ActorDropped,
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
    #[error("Order has no line items")]
    EmptyOrder,
    #[error("Order total exceeds the representable amount")]
    TotalOverflow,
}
