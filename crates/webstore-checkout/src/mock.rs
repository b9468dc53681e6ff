//! # Mock Order Query
//!
//! [`MockOrderQuery`] answers [`OrderQuery::fetch`] from a script of expected
//! calls, so poller behavior can be tested without a store or a network.
//!
//! | Feature | MockOrderQuery | Real store |
//! |---------|----------------|------------|
//! | **Determinism** | Scripted answers, in order | Depends on webhook timing |
//! | **Error injection** | `return_err(QueryError::Server { .. })` | Hard |
//! | **Timing** | Records when each call happened | Not recorded |
//!
//! Pair it with `#[tokio::test(start_paused = true)]`: the clock only moves
//! when every task is waiting, so recorded call times are exact multiples of
//! the poll interval and backoff delays.
//!
//! ```rust,ignore
//! let mock = MockOrderQuery::new();
//! mock.expect_fetch(OrderId(1)).times(2).return_missing();
//! mock.expect_fetch(OrderId(1)).return_found(completed_order);
//!
//! let report = OrderPoller::new(mock.clone(), PollerConfig::default())
//!     .spawn(OrderId(1))
//!     .join()
//!     .await
//!     .unwrap();
//! mock.verify();
//! ```

use crate::query::{OrderQuery, QueryError};
use async_trait::async_trait;
use order_store::{Order, OrderId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

type FetchResult = Result<Option<Order>, QueryError>;

struct Expectation {
    id: OrderId,
    response: FetchResult,
}

#[derive(Default)]
struct Script {
    expected: VecDeque<Expectation>,
    fallback: Option<Expectation>,
    calls: Vec<Duration>,
    unexpected: Vec<OrderId>,
}

/// A scripted [`OrderQuery`]. Clones share the same script and call log.
#[derive(Clone)]
pub struct MockOrderQuery {
    script: Arc<Mutex<Script>>,
    origin: Instant,
}

impl Default for MockOrderQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderQuery {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            origin: Instant::now(),
        }
    }

    /// Expects a `fetch` for `id`. Expectations are consumed in order.
    pub fn expect_fetch(&self, id: OrderId) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            id,
            times: Some(1),
            script: self.script.clone(),
        }
    }

    /// When each call happened, measured from the mock's creation.
    pub fn calls(&self) -> Vec<Duration> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    /// Panics unless every scripted expectation was consumed and no call went
    /// unanswered.
    pub fn verify(&self) {
        let script = self.script.lock().unwrap();
        if !script.unexpected.is_empty() {
            panic!("Unexpected fetch calls for {:?}", script.unexpected);
        }
        if !script.expected.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                script.expected.len()
            );
        }
    }
}

#[async_trait]
impl OrderQuery for MockOrderQuery {
    async fn fetch(&self, id: OrderId) -> FetchResult {
        let mut guard = self.script.lock().unwrap();
        let script = &mut *guard;
        script.calls.push(self.origin.elapsed());

        let matched = match script.expected.front().map(|next| next.id == id) {
            Some(true) => script.expected.pop_front().map(|exp| exp.response),
            Some(false) => None,
            None => script
                .fallback
                .as_ref()
                .filter(|exp| exp.id == id)
                .map(|exp| exp.response.clone()),
        };

        matched.unwrap_or_else(|| {
            script.unexpected.push(id);
            Err(QueryError::Rejected(format!("unexpected fetch for order {id}")))
        })
    }
}

/// Builder for `fetch` expectations.
pub struct FetchExpectationBuilder {
    id: OrderId,
    /// `None` means "answer every remaining call this way".
    times: Option<u32>,
    script: Arc<Mutex<Script>>,
}

impl FetchExpectationBuilder {
    /// Repeats the answer for `n` consecutive calls.
    pub fn times(mut self, n: u32) -> Self {
        self.times = Some(n);
        self
    }

    /// Uses the answer for every call once the scripted ones run out.
    pub fn always(mut self) -> Self {
        self.times = None;
        self
    }

    pub fn return_found(self, order: Order) {
        self.push(Ok(Some(order)));
    }

    pub fn return_missing(self) {
        self.push(Ok(None));
    }

    pub fn return_err(self, error: QueryError) {
        self.push(Err(error));
    }

    fn push(self, response: FetchResult) {
        let mut script = self.script.lock().unwrap();
        match self.times {
            Some(n) => {
                for _ in 0..n {
                    script.expected.push_back(Expectation {
                        id: self.id,
                        response: response.clone(),
                    });
                }
            }
            None => {
                script.fallback = Some(Expectation {
                    id: self.id,
                    response,
                });
            }
        }
    }
}
