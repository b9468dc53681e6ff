//! # Poller State Machine
//!
//! ```text
//! INIT ──► LOADING ──► FOUND_TERMINAL
//!             │  ▲ ├──► ERROR
//!             │  │ └──► TIMEOUT (deadline hit mid-query)
//!             ▼  │
//!        PENDING_RETRY ──► TIMEOUT
//! ```
//!
//! [`PollPhase`] is the machine itself; [`PollView`] is what a confirmation
//! page renders from it.

use crate::error::PollError;
use order_store::{Order, OrderId};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Init,
    Loading,
    PendingRetry,
    FoundTerminal,
    Error,
    Timeout,
}

impl PollPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollPhase::FoundTerminal | PollPhase::Error | PollPhase::Timeout
        )
    }

    pub fn can_transition_to(self, next: PollPhase) -> bool {
        use PollPhase::*;
        matches!(
            (self, next),
            (Init, Loading)
                | (Loading, FoundTerminal)
                | (Loading, PendingRetry)
                | (Loading, Error)
                | (Loading, Timeout)
                | (PendingRetry, Loading)
                | (PendingRetry, Timeout)
        )
    }
}

impl Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PollPhase::Init => "init",
            PollPhase::Loading => "loading",
            PollPhase::PendingRetry => "pending_retry",
            PollPhase::FoundTerminal => "found_terminal",
            PollPhase::Error => "error",
            PollPhase::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// The snapshot a confirmation page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum PollView {
    Loading,
    Found(Order),
    /// The order is absent or still pending. `polling` is false once the budget
    /// ran out and the page should offer a manual retry instead of a spinner.
    NotFoundOrPending { order_id: OrderId, polling: bool },
    QueryError(PollError),
}

impl PollView {
    /// Whether the page will not change any more without user action.
    pub fn is_settled(&self) -> bool {
        match self {
            PollView::Loading => false,
            PollView::Found(_) | PollView::QueryError(_) => true,
            PollView::NotFoundOrPending { polling, .. } => !polling,
        }
    }
}
