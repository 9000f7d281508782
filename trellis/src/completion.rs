//! Activation outcomes and the completion signal layouts hand back.
//!
//! A `Completion` is either already resolved or waits on the single
//! in-flight placement cycle of a layout. It is cloneable: callers whose
//! requests are coalesced onto an in-flight cycle all hold clones of the same
//! signal and all observe the same outcome.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::Shared;

/// Result of asking a layout to activate a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivateOutcome {
    /// The component was activated.
    Activated,
    /// The component was already the active one.
    AlreadyActivated,
    /// The layout does not manage the component (or has no target).
    NotPresent,
}

/// Sending half of a pending completion, held by the layout.
#[derive(Debug)]
pub struct Resolver(oneshot::Sender<ActivateOutcome>);

impl Resolver {
    pub fn resolve(self, outcome: ActivateOutcome) {
        // The receiver may have been dropped by every caller; nothing to do then.
        let _ = self.0.send(outcome);
    }
}

#[derive(Clone)]
enum State {
    Ready(ActivateOutcome),
    Pending(Shared<oneshot::Receiver<ActivateOutcome>>),
}

/// A cloneable future resolving to an `ActivateOutcome`.
#[derive(Clone)]
pub struct Completion {
    state: State,
}

impl Completion {
    /// An already-resolved completion.
    pub fn ready(outcome: ActivateOutcome) -> Self {
        Self {
            state: State::Ready(outcome),
        }
    }

    /// A pending completion and the resolver that fulfils it.
    pub fn pending() -> (Resolver, Self) {
        let (tx, rx) = oneshot::channel();
        (
            Resolver(tx),
            Self {
                state: State::Pending(rx.shared()),
            },
        )
    }

    /// The outcome if it is available without waiting.
    pub fn try_outcome(&self) -> Option<ActivateOutcome> {
        self.clone().now_or_never()
    }

    pub fn is_ready(&self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for Completion {
    type Output = ActivateOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Ready(outcome) => Poll::Ready(*outcome),
            // A dropped resolver means the layout went away before its
            // cycle ran; the component is no longer managed.
            State::Pending(rx) => rx
                .poll_unpin(cx)
                .map(|r| r.unwrap_or(ActivateOutcome::NotPresent)),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Ready(outcome) => f.debug_tuple("Completion::Ready").field(outcome).finish(),
            State::Pending(_) => f.write_str("Completion::Pending"),
        }
    }
}
