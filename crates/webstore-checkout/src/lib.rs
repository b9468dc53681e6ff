//! # Webstore Checkout
//!
//! The post-payment side of the webstore: once the payment provider redirects
//! the buyer back, confirm the order and hand out what was bought.
//!
//! - **[poller]**: polls order status until it settles, with capped exponential
//!   backoff on transient failures and cancellation on dispose.
//! - **[query]**: the [`OrderQuery`] seam, implemented by the in-process
//!   [`StoreClient`](order_store::StoreClient) and by [`http::HttpOrderQuery`].
//! - **[delivery]**: posts rendered in-game commands to the Minecraft server.
//! - **[lifecycle]**: [`CheckoutSystem`](lifecycle::CheckoutSystem), which starts
//!   and stops everything.
//! - **[mock]**: a scripted [`OrderQuery`] for tests.
//!
//! Configuration comes from the environment, see [`config`].

pub mod config;
pub mod delivery;
pub mod error;
pub mod http;
pub mod identifier;
pub mod lifecycle;
pub mod mock;
pub mod poller;
pub mod query;

pub use config::{CheckoutConfig, ConfigError};
pub use error::PollError;
pub use identifier::order_id_from_query;
pub use poller::{
    OrderPoller, PollPhase, PollReport, PollView, PollerConfig, PollerHandle, RetryPolicy,
};
pub use query::{OrderQuery, QueryError};
