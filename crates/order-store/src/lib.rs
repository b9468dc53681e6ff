//! # Order Store
//!
//! In-memory order backend for the webstore checkout.
//!
//! After a payment provider confirms a purchase, the backend materializes the
//! order and later flips it from `pending` to `completed` (or `refunded`). This
//! crate models that backend as a single actor:
//!
//! - [`OrderActor`] owns the order table and processes requests sequentially.
//! - [`StoreClient`] is the cloneable async handle used by webhooks and readers.
//! - [`model`] holds the [`Order`] types and their JSON shape.
//!
//! Status changes are forward-only (see [`OrderStatus::can_transition_to`]);
//! readers such as the checkout poller never mutate orders.
//!
//! ```rust
//! use order_store::{LineItem, NewOrder, OrderActor, OrderStatus};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = OrderActor::new(16, 1);
//!     let handle = tokio::spawn(actor.run());
//!
//!     let id = client
//!         .place(NewOrder { items: vec![LineItem::new("VIP", 1, 2599)], customer_email: None })
//!         .await
//!         .unwrap();
//!     let order = client.complete(id, None).await.unwrap();
//!     assert_eq!(order.status, OrderStatus::Completed);
//!
//!     drop(client);
//!     handle.await.unwrap();
//! }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod model;
pub mod tracing;

pub use actor::OrderActor;
pub use client::StoreClient;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use model::{LineItem, NewOrder, Order, OrderId, OrderStatus};
