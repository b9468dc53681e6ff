//! # Order Status Poller
//!
//! After the payment provider redirects the buyer back, the backend may not
//! have materialized (or completed) the order yet. The poller bridges that gap:
//!
//! 1. Query the order status.
//! 2. Absent or `pending`: wait [`PollerConfig::poll_interval`] and ask again.
//! 3. `completed` / `refunded`: done.
//! 4. Transient query failure: back off per [`RetryPolicy`], then give up with
//!    [`PollError::Query`](crate::PollError::Query).
//! 5. Wall-clock budget or poll count exhausted:
//!    [`PollError::Timeout`](crate::PollError::Timeout).
//!
//! A confirmation page spawns one poller per mount and drops the
//! [`PollerHandle`] on unmount.

pub mod config;
pub mod handle;
pub mod runner;
pub mod state;

pub use config::{PollerConfig, RetryPolicy};
pub use handle::{PollReport, PollerHandle};
pub use runner::OrderPoller;
pub use state::{PollPhase, PollView};
