//! # HTTP Order Query
//!
//! [`OrderQuery`] over the store's HTTP API: `GET {base}/orders/{id}`.

use crate::query::{OrderQuery, QueryError};
use async_trait::async_trait;
use order_store::{Order, OrderId};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

/// Per-request limit for [`HttpOrderQuery::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How a response status maps onto the query contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusClass {
    Found,
    Missing,
    Failed(QueryError),
}

/// Maps an HTTP status onto the query contract: 2xx carries an order, 404 means
/// "not materialized yet", 5xx is transient, anything else is a rejection.
pub fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Found
    } else if status == StatusCode::NOT_FOUND {
        StatusClass::Missing
    } else if status.is_server_error() {
        StatusClass::Failed(QueryError::Server {
            status: status.as_u16(),
        })
    } else {
        StatusClass::Failed(QueryError::Rejected(format!("HTTP {}", status.as_u16())))
    }
}

#[derive(Clone)]
pub struct HttpOrderQuery {
    client: Client,
    base_url: String,
}

impl HttpOrderQuery {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// A query whose requests fail with [`QueryError::Network`] once
    /// `timeout` passes without a complete response.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn order_url(&self, id: OrderId) -> String {
        format!("{}/orders/{}", self.base_url, id)
    }
}

fn transport_error(e: reqwest::Error) -> QueryError {
    if e.is_timeout() {
        QueryError::Network(format!("request timed out: {e}"))
    } else {
        QueryError::Network(e.to_string())
    }
}

#[async_trait]
impl OrderQuery for HttpOrderQuery {
    #[instrument(skip(self), fields(order_id = %id))]
    async fn fetch(&self, id: OrderId) -> Result<Option<Order>, QueryError> {
        let url = self.order_url(id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = status.as_u16(), "Order endpoint answered");

        match classify_status(status) {
            StatusClass::Found => response
                .json::<Order>()
                .await
                .map(Some)
                .map_err(|e| {
                    if e.is_decode() {
                        QueryError::Rejected(format!("malformed order: {e}"))
                    } else {
                        transport_error(e)
                    }
                }),
            StatusClass::Missing => Ok(None),
            StatusClass::Failed(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_store::OrderStatus;

    #[test]
    fn status_classes() {
        assert_eq!(classify_status(StatusCode::OK), StatusClass::Found);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), StatusClass::Missing);
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            StatusClass::Failed(QueryError::Server { status: 502 })
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            StatusClass::Failed(QueryError::Rejected("HTTP 401".into()))
        );
    }

    #[test]
    fn order_url_ignores_trailing_slash() {
        let query = HttpOrderQuery::new("https://shop.example.com/api/").unwrap();
        assert_eq!(
            query.order_url(OrderId(12345)),
            "https://shop.example.com/api/orders/12345"
        );
    }

    #[test]
    fn endpoint_payload_decodes() {
        let body = r#"{
            "id": 12345,
            "status": "completed",
            "items": [{"productName": "VIP Rank", "quantity": 1, "total": 2599}],
            "total": 2599,
            "customerEmail": "steve@example.com"
        }"#;

        let order: Order = serde_json::from_str(body).unwrap();
        assert_eq!(order.id, OrderId(12345));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.items[0].product_name, "VIP Rank");
        assert_eq!(order.receipt_url, None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transient() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let query = HttpOrderQuery::new("http://127.0.0.1:9").unwrap();
        let err = query.fetch(OrderId(1)).await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn silent_endpoint_times_out_as_network_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let query =
            HttpOrderQuery::with_timeout(format!("http://{addr}"), Duration::from_millis(200))
                .unwrap();
        let err = query.fetch(OrderId(1)).await.unwrap_err();

        assert!(
            matches!(&err, QueryError::Network(msg) if msg.contains("timed out")),
            "unexpected error: {err:?}"
        );
        assert!(err.is_transient());
    }
}
