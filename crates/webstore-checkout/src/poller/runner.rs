//! # Order Poller
//!
//! Drives the confirmation state machine for one order id. The poller is a
//! single cooperative task: it suspends only while a query is in flight and
//! while a timer is armed, and it checks the cancel signal first at both
//! points. The wall-clock budget is a hard deadline: a query that never
//! answers, or a backoff that would outlast it, ends the run in `Timeout`.

use super::config::PollerConfig;
use super::handle::{PollReport, PollerHandle};
use super::state::{PollPhase, PollView};
use crate::error::PollError;
use crate::query::OrderQuery;
use order_store::{Order, OrderId};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::{sleep, sleep_until, timeout_at, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};

pub struct OrderPoller<Q> {
    query: Q,
    config: PollerConfig,
}

/// Bookkeeping for one run: the current phase plus everything the report needs.
struct Progress {
    order_id: OrderId,
    phase: PollPhase,
    view: watch::Sender<PollView>,
    transitions: Vec<PollPhase>,
    queries: u32,
    rounds: u32,
    backoff_delays: Vec<Duration>,
}

impl Progress {
    fn new(order_id: OrderId, view: watch::Sender<PollView>) -> Self {
        Self {
            order_id,
            phase: PollPhase::Init,
            view,
            transitions: Vec::new(),
            queries: 0,
            rounds: 0,
            backoff_delays: Vec::new(),
        }
    }

    fn enter(&mut self, next: PollPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal poll transition {} -> {}",
            self.phase,
            next
        );
        debug!(from = %self.phase, to = %next, "Transition");
        self.phase = next;
        self.transitions.push(next);
    }

    fn publish(&self, view: PollView) {
        // Nobody watching is fine; the report still carries the result.
        let _ = self.view.send(view);
    }

    /// Enters `Timeout` and builds the matching error.
    fn time_out(&mut self, elapsed: Duration) -> PollError {
        warn!(
            elapsed_ms = elapsed.as_millis() as u64,
            rounds = self.rounds,
            phase = %self.phase,
            "Order still pending, giving up"
        );
        self.enter(PollPhase::Timeout);
        self.publish(PollView::NotFoundOrPending {
            order_id: self.order_id,
            polling: false,
        });
        PollError::Timeout {
            order_id: self.order_id,
            rounds: self.rounds,
        }
    }

    fn finish(self, result: Result<Order, PollError>) -> PollReport {
        PollReport {
            order_id: self.order_id,
            result,
            transitions: self.transitions,
            queries: self.queries,
            rounds: self.rounds,
            backoff_delays: self.backoff_delays,
        }
    }
}

impl<Q: OrderQuery + 'static> OrderPoller<Q> {
    pub fn new(query: Q, config: PollerConfig) -> Self {
        Self { query, config }
    }

    /// Starts polling `order_id` in its own task.
    pub fn spawn(self, order_id: OrderId) -> PollerHandle {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (view_tx, view_rx) = watch::channel(PollView::Loading);

        let span = info_span!("poll", %order_id);
        let task = tokio::spawn(self.run(order_id, cancel_rx, view_tx).instrument(span));

        PollerHandle::new(order_id, view_rx, cancel_tx, task)
    }

    /// Runs the state machine to completion on the current task.
    ///
    /// The run ends with `Err(PollError::Cancelled)` as soon as `cancel`
    /// resolves, whether a value was sent or the sender was dropped.
    pub async fn run(
        self,
        order_id: OrderId,
        mut cancel: oneshot::Receiver<()>,
        view: watch::Sender<PollView>,
    ) -> PollReport {
        let mut progress = Progress::new(order_id, view);
        let started = Instant::now();
        let deadline = started + self.config.timeout;
        info!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "Polling order status"
        );

        let result = loop {
            progress.enter(PollPhase::Loading);
            progress.rounds += 1;

            // The deadline also bounds a stalled query and the backoff sleeps.
            let fetched = tokio::select! {
                biased;
                _ = &mut cancel => break Err(PollError::Cancelled),
                fetched = timeout_at(deadline, self.fetch_with_retry(order_id, &mut progress)) => fetched,
            };
            let Ok(fetched) = fetched else {
                break Err(progress.time_out(started.elapsed()));
            };

            match fetched {
                Ok(Some(order)) if order.status.is_terminal() => {
                    info!(status = %order.status, rounds = progress.rounds, "Order confirmed");
                    progress.enter(PollPhase::FoundTerminal);
                    progress.publish(PollView::Found(order.clone()));
                    break Ok(order);
                }
                Ok(found) => {
                    info!(
                        found = found.is_some(),
                        round = progress.rounds,
                        interval_ms = self.config.poll_interval.as_millis() as u64,
                        "Order pending, retry armed"
                    );
                    progress.enter(PollPhase::PendingRetry);
                    progress.publish(PollView::NotFoundOrPending {
                        order_id,
                        polling: true,
                    });
                }
                Err(err) => {
                    progress.enter(PollPhase::Error);
                    progress.publish(PollView::QueryError(err.clone()));
                    break Err(err);
                }
            }

            let wake = (Instant::now() + self.config.poll_interval).min(deadline);
            tokio::select! {
                biased;
                _ = &mut cancel => break Err(PollError::Cancelled),
                _ = sleep_until(wake) => {}
            }

            let elapsed = started.elapsed();
            if elapsed >= self.config.timeout || progress.rounds >= self.config.max_polls {
                break Err(progress.time_out(elapsed));
            }
        };

        if matches!(result, Err(PollError::Cancelled)) {
            info!(phase = %progress.phase, "Poller disposed");
        }
        progress.finish(result)
    }

    /// One LOADING round: the first query plus up to `max_retries` backed-off
    /// retries on transient failures.
    async fn fetch_with_retry(
        &self,
        order_id: OrderId,
        progress: &mut Progress,
    ) -> Result<Option<Order>, PollError> {
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            progress.queries += 1;
            match self.query.fetch(order_id).await {
                Ok(found) => {
                    if attempt > 0 {
                        info!(attempt = attempt + 1, "Order query succeeded after retry");
                    }
                    return Ok(found);
                }
                Err(err) if err.is_transient() && attempt < policy.max_retries => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Order query failed, retrying after delay"
                    );
                    progress.backoff_delays.push(delay);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(attempts = attempt + 1, error = %err, "Order query failed");
                    return Err(PollError::Query {
                        attempts: attempt + 1,
                        source: err,
                    });
                }
            }
        }
    }
}
