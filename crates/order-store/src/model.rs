//! # Order Model
//!
//! Plain data types shared by the store actor and everything that reads orders.
//! Field names serialize in camelCase and statuses in lowercase, which is the
//! JSON shape the order endpoint speaks.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an order.
///
/// Orders start out `Pending` and move forward only:
///
/// ```text
/// Pending ──► Completed ──► Refunded
///    └──────────────────────► Refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Refunded,
}

impl OrderStatus {
    /// `Completed` and `Refunded` are terminal: no poller needs to look again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether moving from `self` to `next` respects the forward-only ordering.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Refunded)
                | (OrderStatus::Completed, OrderStatus::Refunded)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Refunded => "refunded",
        };
        f.write_str(name)
    }
}

/// One purchased product inside an order. `total` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_name: String,
    pub quantity: u32,
    pub total: u64,
}

impl LineItem {
    /// Builds a line item, computing `total = unit_price × quantity`.
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: u64) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            total: unit_price.saturating_mul(u64::from(quantity)),
        }
    }
}

/// Represents a customer order as served by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total: u64,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

impl Order {
    /// Materializes a placed order. The order starts `Pending` and its total is
    /// the sum of its line items, saturating at `u64::MAX`. The store rejects
    /// such orders up front via [`NewOrder::checked_total`].
    pub fn from_new(id: OrderId, params: NewOrder) -> Self {
        let total = params
            .items
            .iter()
            .fold(0u64, |sum, item| sum.saturating_add(item.total));
        Self {
            id,
            status: OrderStatus::Pending,
            items: params.items,
            total,
            customer_email: params.customer_email,
            receipt_url: None,
        }
    }
}

/// Payload for placing a new order.
#[derive(Debug, Clone, Default)]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    pub customer_email: Option<String>,
}

impl NewOrder {
    /// Sum of the line item totals, or `None` if it overflows.
    pub fn checked_total(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |sum, item| sum.checked_add(item.total))
    }
}
