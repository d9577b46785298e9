//! Active mode: programmatic navigation
//!
//! Every request hands back a [`NavigationHandle`], a future that resolves
//! exactly once with the terminal [`NavigationOutcome`]. Handles never resolve
//! to an error; interruption is a normal outcome.

pub mod controller;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::engine::{CancelToken, PlaybackOutcome};

pub use controller::NavigationController;

pub type NavigationId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationRequest {
    /// Direct tween to a page slot
    GoToPage(usize),
    /// Natural flip (successive turns when more than one page away)
    FlipToPage(usize),
    LastPage,
    GoToContact,
    /// Flip to the last page, pause, then reveal the contact panel
    SmartGoToContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationOutcome {
    Completed,
    Interrupted,
    /// Refused because another navigation owned the viewport
    Skipped,
}

impl From<PlaybackOutcome> for NavigationOutcome {
    fn from(outcome: PlaybackOutcome) -> Self {
        match outcome {
            PlaybackOutcome::Completed => NavigationOutcome::Completed,
            PlaybackOutcome::Interrupted => NavigationOutcome::Interrupted,
        }
    }
}

/// Stage of an active navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavStage {
    Flip,
    Gap,
    ContactScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavState {
    Idle,
    Navigating(NavStage),
}

/// Caller side of a navigation
#[derive(Debug)]
pub struct NavigationHandle {
    id: NavigationId,
    rx: oneshot::Receiver<NavigationOutcome>,
    cancel: CancelToken,
    outcome: Option<NavigationOutcome>,
}

/// Controller side of a navigation: resolves the paired handle
#[derive(Debug)]
pub struct Ticket {
    id: NavigationId,
    tx: oneshot::Sender<NavigationOutcome>,
    cancel: CancelToken,
}

impl NavigationHandle {
    /// Create a linked handle/ticket pair
    pub fn pair() -> (NavigationHandle, Ticket) {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        let cancel = CancelToken::new();
        (
            NavigationHandle {
                id,
                rx,
                cancel: cancel.clone(),
                outcome: None,
            },
            Ticket { id, tx, cancel },
        )
    }

    pub fn id(&self) -> NavigationId {
        self.id
    }

    /// Ask the navigation to stop; it resolves `Interrupted` on the next frame
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Non-blocking check for the outcome
    pub fn try_outcome(&mut self) -> Option<NavigationOutcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => None,
                // Ticket dropped without resolving (session torn down)
                Err(oneshot::error::TryRecvError::Closed) => Some(NavigationOutcome::Interrupted),
            };
        }
        self.outcome
    }

    pub fn is_resolved(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for NavigationHandle {
    type Output = NavigationOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        let polled = Pin::new(&mut self.rx).poll(cx);
        match polled {
            Poll::Ready(result) => {
                let outcome = result.unwrap_or(NavigationOutcome::Interrupted);
                self.outcome = Some(outcome);
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Ticket {
    pub fn id(&self) -> NavigationId {
        self.id
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolve the paired handle; a dropped handle is not an error
    pub fn resolve(self, outcome: NavigationOutcome) {
        let _ = self.tx.send(outcome);
    }

    pub(crate) fn into_parts(
        self,
    ) -> (NavigationId, oneshot::Sender<NavigationOutcome>, CancelToken) {
        (self.id, self.tx, self.cancel)
    }
}
