//! # System Lifecycle
//!
//! Starts the in-process order store, decides which backend the confirmation
//! pollers talk to, and shuts everything down in order.
//!
//! ```rust,ignore
//! let system = CheckoutSystem::new(CheckoutConfig::from_env()?)?;
//!
//! // Payment provider redirected back with ?orderId=1
//! let report = system.confirm("?orderId=1")?.join().await?;
//!
//! system.shutdown().await?;
//! ```
//!
//! ## Shutdown
//!
//! 1. Abort every poller that is still running.
//! 2. Drop the store client so the actor's receiver closes.
//! 3. Await the actor task.
//!
//! Pollers hold their own clone of the store client, so step 1 has to finish
//! before the store can observe a closed channel.

pub mod checkout_system;

pub use checkout_system::*;
pub use order_store::tracing::setup_tracing;
