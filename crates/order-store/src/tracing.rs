//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing` subscriber shared by the store and
//! the checkout binary.
//!
//! Log lines carry structured fields instead of prose, so filtering by
//! `order_id` works across the store and every poller:
//!
//! ```text
//! INFO Placed order_id=1 total=2599 size=1
//! INFO poll{order_id=1}: Order pending, retry armed round=1 interval_ms=2000
//! INFO Status changed order_id=1 status=completed
//! INFO poll{order_id=1}: Order confirmed status=completed rounds=3
//! ```
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run          # transitions and outcomes
//! RUST_LOG=debug cargo run         # every store request and payload
//! RUST_LOG=webstore_checkout=debug,order_store=warn cargo run
//! ```

/// Initializes the global subscriber. `RUST_LOG` controls verbosity; output is
/// compact and hides module paths (`order_id` fields identify the flow instead).
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
