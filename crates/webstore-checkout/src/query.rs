//! # Order Query Contract
//!
//! The poller only needs one thing from the backend: "what does order `id` look
//! like right now?". [`OrderQuery`] is that seam. Implementations must keep the
//! three failure modes apart so the poller can choose between retrying and
//! giving up:
//!
//! | Outcome | Meaning | Poller reaction |
//! |---------|---------|-----------------|
//! | `Ok(None)` | not found (yet) | wait one poll interval, ask again |
//! | `Err(Network)` / `Err(Server)` | transient | back off and retry |
//! | `Err(Rejected)` | the request itself is wrong | surface immediately |

use async_trait::async_trait;
use order_store::{Order, OrderId, StoreClient, StoreError};
use std::sync::Arc;

/// Why a status query failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The endpoint could not be reached (connect error, dropped channel, timeout).
    #[error("network failure: {0}")]
    Network(String),

    /// The endpoint answered with a 5xx status.
    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    /// The endpoint refused the request or sent something unreadable.
    #[error("query rejected: {0}")]
    Rejected(String),
}

impl QueryError {
    /// Transient failures are worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::Network(_) | QueryError::Server { .. })
    }
}

/// Read-only access to order state.
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetches the current order record, or `None` if it does not exist yet.
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, QueryError>;
}

#[async_trait]
impl<T: OrderQuery + ?Sized> OrderQuery for Arc<T> {
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, QueryError> {
        (**self).fetch(id).await
    }
}

#[async_trait]
impl OrderQuery for StoreClient {
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, QueryError> {
        self.get(id).await.map_err(|e| match e {
            StoreError::ActorClosed | StoreError::ActorDropped => {
                QueryError::Network(e.to_string())
            }
            other => QueryError::Rejected(other.to_string()),
        })
    }
}
