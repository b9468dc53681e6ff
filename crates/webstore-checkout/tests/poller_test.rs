//! Poller behavior against a scripted query, on a paused clock.

use async_trait::async_trait;
use order_store::{LineItem, NewOrder, Order, OrderId, OrderStatus};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::{sleep, Instant};
use webstore_checkout::mock::MockOrderQuery;
use webstore_checkout::{
    OrderPoller, OrderQuery, PollError, PollPhase, PollView, PollerConfig, QueryError,
};

const ID: OrderId = OrderId(12345);

fn order(status: OrderStatus) -> Order {
    let mut order = Order::from_new(
        ID,
        NewOrder {
            items: vec![LineItem::new("VIP", 1, 2599)],
            customer_email: None,
        },
    );
    order.status = status;
    order
}

/// Call offsets rounded to whole seconds.
fn secs(calls: &[Duration]) -> Vec<u64> {
    calls
        .iter()
        .map(|d| ((d.as_millis() + 500) / 1000) as u64)
        .collect()
}

fn poller(mock: &MockOrderQuery) -> OrderPoller<MockOrderQuery> {
    OrderPoller::new(mock.clone(), PollerConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_not_found_twice_then_completed() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID).times(2).return_missing();
    mock.expect_fetch(ID).return_found(order(OrderStatus::Completed));

    let handle = poller(&mock).spawn(ID);
    let view = handle.subscribe();
    let report = handle.join().await.unwrap();

    assert_eq!(report.result, Ok(order(OrderStatus::Completed)));
    assert_eq!(
        report.transitions,
        vec![
            PollPhase::Loading,
            PollPhase::PendingRetry,
            PollPhase::Loading,
            PollPhase::PendingRetry,
            PollPhase::Loading,
            PollPhase::FoundTerminal,
        ]
    );
    assert_eq!(report.queries, 3);
    assert_eq!(report.rounds, 3);
    assert!(report.backoff_delays.is_empty());
    assert_eq!(secs(&mock.calls()), vec![0, 2, 4]);
    assert_eq!(*view.borrow(), PollView::Found(order(OrderStatus::Completed)));
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_refunded_is_terminal() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID).return_found(order(OrderStatus::Refunded));

    let report = poller(&mock).spawn(ID).join().await.unwrap();

    assert_eq!(report.final_phase(), PollPhase::FoundTerminal);
    assert_eq!(report.result.unwrap().status, OrderStatus::Refunded);
    assert_eq!(mock.call_count(), 1);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_pending_view_while_polling() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID).always().return_missing();

    let handle = poller(&mock).spawn(ID);
    sleep(Duration::from_secs(1)).await;

    assert_eq!(
        handle.view(),
        PollView::NotFoundOrPending {
            order_id: ID,
            polling: true
        }
    );
    assert!(!handle.view().is_settled());
}

#[tokio::test(start_paused = true)]
async fn test_wall_clock_budget_times_out() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID)
        .always()
        .return_found(order(OrderStatus::Pending));

    let config = PollerConfig {
        max_polls: 100,
        ..PollerConfig::default()
    };
    let handle = OrderPoller::new(mock.clone(), config).spawn(ID);
    let view = handle.subscribe();
    let report = handle.join().await.unwrap();

    assert_eq!(
        report.result,
        Err(PollError::Timeout {
            order_id: ID,
            rounds: 15
        })
    );
    assert_eq!(report.final_phase(), PollPhase::Timeout);
    assert_eq!(report.queries, 15);
    let expected: Vec<u64> = (0..15).map(|n| n * 2).collect();
    assert_eq!(secs(&mock.calls()), expected);
    assert_eq!(
        *view.borrow(),
        PollView::NotFoundOrPending {
            order_id: ID,
            polling: false
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_poll_count_cap_times_out() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID).always().return_missing();

    let config = PollerConfig {
        max_polls: 3,
        ..PollerConfig::default()
    };
    let report = OrderPoller::new(mock.clone(), config)
        .spawn(ID)
        .join()
        .await
        .unwrap();

    assert_eq!(
        report.result,
        Err(PollError::Timeout {
            order_id: ID,
            rounds: 3
        })
    );
    assert_eq!(secs(&mock.calls()), vec![0, 2, 4]);
}

/// An endpoint that accepts the request and never answers.
struct StalledQuery;

#[async_trait]
impl OrderQuery for StalledQuery {
    async fn fetch(&self, _id: OrderId) -> Result<Option<Order>, QueryError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_stalled_query_hits_deadline() {
    let started = Instant::now();
    let handle = OrderPoller::new(StalledQuery, PollerConfig::default()).spawn(ID);
    let view = handle.subscribe();
    let report = handle.join().await.unwrap();

    assert_eq!(started.elapsed().as_secs(), 30);
    assert_eq!(
        report.result,
        Err(PollError::Timeout {
            order_id: ID,
            rounds: 1
        })
    );
    assert_eq!(report.transitions, vec![PollPhase::Loading, PollPhase::Timeout]);
    assert_eq!(
        *view.borrow(),
        PollView::NotFoundOrPending {
            order_id: ID,
            polling: false
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_backoff_does_not_outlast_deadline() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID).times(14).return_missing();
    mock.expect_fetch(ID)
        .always()
        .return_err(QueryError::Server { status: 503 });

    let started = Instant::now();
    let report = poller(&mock).spawn(ID).join().await.unwrap();

    // Round 15 starts at 28s, fails at 28s and 29s, and the 2s backoff is cut
    // short by the 30s deadline.
    assert_eq!(started.elapsed().as_secs(), 30);
    assert_eq!(
        report.result,
        Err(PollError::Timeout {
            order_id: ID,
            rounds: 15
        })
    );
    assert_eq!(report.final_phase(), PollPhase::Timeout);
    assert_eq!(
        report.backoff_delays,
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
    let calls = secs(&mock.calls());
    assert_eq!(calls.len(), 16);
    assert_eq!(&calls[13..], &[26, 28, 29]);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_back_off_then_recover() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID)
        .times(2)
        .return_err(QueryError::Server { status: 503 });
    mock.expect_fetch(ID).return_found(order(OrderStatus::Completed));

    let report = poller(&mock).spawn(ID).join().await.unwrap();

    assert!(report.result.is_ok());
    assert_eq!(
        report.backoff_delays,
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
    assert_eq!(report.transitions, vec![PollPhase::Loading, PollPhase::FoundTerminal]);
    assert_eq!(report.queries, 3);
    assert_eq!(report.rounds, 1);
    assert_eq!(secs(&mock.calls()), vec![0, 1, 3]);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_retry_budget_exhausted() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID)
        .always()
        .return_err(QueryError::Network("connection reset".into()));

    let handle = poller(&mock).spawn(ID);
    let view = handle.subscribe();
    let report = handle.join().await.unwrap();

    let expected = PollError::Query {
        attempts: 4,
        source: QueryError::Network("connection reset".into()),
    };
    assert_eq!(report.result, Err(expected.clone()));
    assert_eq!(report.transitions, vec![PollPhase::Loading, PollPhase::Error]);
    assert_eq!(
        report.backoff_delays,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );
    assert_eq!(secs(&mock.calls()), vec![0, 1, 3, 7]);
    assert_eq!(*view.borrow(), PollView::QueryError(expected));

    // Nothing is scheduled after an error.
    sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_query_fails_fast() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID)
        .return_err(QueryError::Rejected("HTTP 403".into()));

    let report = poller(&mock).spawn(ID).join().await.unwrap();

    assert!(matches!(
        report.result,
        Err(PollError::Query { attempts: 1, .. })
    ));
    assert!(report.backoff_delays.is_empty());
    assert_eq!(mock.call_count(), 1);
    mock.verify();
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_polling() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID).always().return_missing();

    let handle = poller(&mock).spawn(ID);
    let mut view = handle.subscribe();
    sleep(Duration::from_secs(3)).await;
    assert_eq!(mock.call_count(), 2);
    view.borrow_and_update();

    handle.dispose();

    // The view sender goes away with the task.
    assert!(view.changed().await.is_err());
    sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_during_backoff_stops_retries() {
    let mock = MockOrderQuery::new();
    mock.expect_fetch(ID)
        .always()
        .return_err(QueryError::Server { status: 502 });

    let handle = poller(&mock).spawn(ID);
    sleep(Duration::from_secs(2)).await;
    assert_eq!(secs(&mock.calls()), vec![0, 1]);

    drop(handle);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_cancel_sender_cancels_run() {
    let mock = MockOrderQuery::new();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let (view_tx, _view_rx) = watch::channel(PollView::Loading);
    drop(cancel_tx);

    let report = poller(&mock).run(ID, cancel_rx, view_tx).await;

    assert_eq!(report.result, Err(PollError::Cancelled));
    assert_eq!(report.transitions, vec![PollPhase::Loading]);
    assert_eq!(report.queries, 0);
    mock.verify();
}
