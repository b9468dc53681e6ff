//! Error types for the checkout confirmation flow.

use crate::query::QueryError;
use order_store::OrderId;
use thiserror::Error;

/// Why the confirmation page could not show a settled order.
///
/// None of these are fatal to the host application: each one maps to a
/// user-facing message via [`PollError::user_message`], and
/// [`PollError::is_retryable`] tells the view whether to offer a manual retry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PollError {
    /// The redirect URL carried no order identifier.
    #[error("missing order identifier")]
    MissingIdentifier,

    /// The redirect URL carried an identifier that is not an integer.
    #[error("invalid order identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Status queries kept failing after the retry budget, or were rejected.
    #[error("order query failed after {attempts} attempt(s): {source}")]
    Query { attempts: u32, source: QueryError },

    /// The order stayed pending (or absent) for the whole polling budget.
    #[error("order {order_id} still pending after {rounds} poll(s)")]
    Timeout { order_id: OrderId, rounds: u32 },

    /// The poller was disposed before it reached a result.
    #[error("polling cancelled")]
    Cancelled,
}

impl PollError {
    /// Whether a "try again" button makes sense for this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PollError::Query { .. } | PollError::Timeout { .. })
    }

    /// Guidance text for the buyer.
    pub fn user_message(&self) -> &'static str {
        match self {
            PollError::MissingIdentifier | PollError::InvalidIdentifier(_) => {
                "We couldn't find that order. Please use the link from your confirmation email."
            }
            PollError::Query { .. } => {
                "We couldn't load your order right now. Please try again in a moment."
            }
            PollError::Timeout { .. } => {
                "Your payment is still being processed. Check your email for a receipt, or try again shortly."
            }
            PollError::Cancelled => "Order lookup was cancelled.",
        }
    }
}
