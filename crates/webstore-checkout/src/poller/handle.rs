//! The caller's side of a running poller.

use super::state::{PollPhase, PollView};
use crate::error::PollError;
use order_store::{Order, OrderId};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::debug;

/// What a finished poller did.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub order_id: OrderId,
    pub result: Result<Order, PollError>,
    /// Every phase entered after `Init`, in order.
    pub transitions: Vec<PollPhase>,
    /// Raw queries issued, retries included.
    pub queries: u32,
    /// Loading phases entered.
    pub rounds: u32,
    /// Waits taken between failed attempts.
    pub backoff_delays: Vec<Duration>,
}

impl PollReport {
    pub fn final_phase(&self) -> PollPhase {
        self.transitions.last().copied().unwrap_or(PollPhase::Init)
    }
}

/// Owns a spawned poller the way a mounted view owns its polling effect.
///
/// Dropping the handle disposes the poller: the cancel signal fires, any
/// armed timer is dropped, and no further query is issued.
pub struct PollerHandle {
    order_id: OrderId,
    view: watch::Receiver<PollView>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<PollReport>,
}

impl PollerHandle {
    pub(crate) fn new(
        order_id: OrderId,
        view: watch::Receiver<PollView>,
        cancel: oneshot::Sender<()>,
        task: JoinHandle<PollReport>,
    ) -> Self {
        Self {
            order_id,
            view,
            cancel: Some(cancel),
            task,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Latest snapshot.
    pub fn view(&self) -> PollView {
        self.view.borrow().clone()
    }

    /// A receiver that wakes on every view change.
    pub fn subscribe(&self) -> watch::Receiver<PollView> {
        self.view.clone()
    }

    /// Waits for the poller to settle.
    pub async fn join(mut self) -> Result<PollReport, JoinError> {
        (&mut self.task).await
    }

    pub(crate) fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }

    /// Stops polling now. Equivalent to dropping the handle.
    pub fn dispose(self) {
        drop(self);
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            if !self.task.is_finished() {
                debug!(order_id = %self.order_id, "Disposing poller");
            }
            let _ = cancel.send(());
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
