//! Single-flight coordination of the token refresh cycle.
//!
//! At most one refresh runs at a time. Requests that hit a 401 while a
//! refresh is in flight queue up behind it and are all released with the
//! same outcome, in arrival order, when the cycle ends.

use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use super::error::ApiError;

/// New access token, or the error every waiter fails with.
pub type RefreshOutcome = Result<String, ApiError>;

#[derive(Debug, Default)]
struct State {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    cycles: u64,
}

/// Refreshing flag plus pending queue, behind one lock.
///
/// The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<State>,
}

/// Result of [`RefreshCoordinator::join`].
pub enum Ticket<'a> {
    /// Caller must run the refresh and release the lease.
    Lead(RefreshLease<'a>),
    /// A refresh is already running; wait for its outcome.
    Wait(Waiter),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cycle if none is running.
    pub fn try_enter(&self) -> Option<RefreshLease<'_>> {
        let mut state = self.lock();
        if state.refreshing {
            return None;
        }
        Some(self.enter(&mut state))
    }

    /// Queues behind the running cycle. `None` when idle.
    pub fn enqueue(&self) -> Option<Waiter> {
        let mut state = self.lock();
        state.refreshing.then(|| push_waiter(&mut state))
    }

    /// Queues behind the running cycle, or starts one if idle.
    ///
    /// Check and enqueue happen under the same lock, so a waiter can never
    /// land in a queue that has already been drained.
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if state.refreshing {
            Ticket::Wait(push_waiter(&mut state))
        } else {
            Ticket::Lead(self.enter(&mut state))
        }
    }

    /// Ends the current cycle: clears the flag and hands `outcome` to every
    /// queued waiter in arrival order. Returns how many were released.
    pub fn release(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            mem::take(&mut state.waiters)
        };

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
        released
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of requests currently waiting.
    pub fn pending(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Number of cycles started since creation.
    pub fn cycles(&self) -> u64 {
        self.lock().cycles
    }

    fn enter(&self, state: &mut State) -> RefreshLease<'_> {
        state.refreshing = true;
        state.cycles += 1;
        RefreshLease {
            coordinator: self,
            released: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn push_waiter(state: &mut State) -> Waiter {
    let (tx, rx) = oneshot::channel();
    state.waiters.push(tx);
    Waiter(rx)
}

/// Held by the request running the refresh.
///
/// Dropping it without calling [`RefreshLease::release`] (for example when
/// the leading future is cancelled) fails the cycle so waiters never hang.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    released: bool,
}

impl RefreshLease<'_> {
    pub fn release(mut self, outcome: RefreshOutcome) -> usize {
        self.released = true;
        self.coordinator.release(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.coordinator.release(Err(ApiError::refresh_aborted()));
        }
    }
}

/// A queued request awaiting the outcome of the running cycle.
#[derive(Debug)]
pub struct Waiter(oneshot::Receiver<RefreshOutcome>);

impl Waiter {
    pub async fn wait(self) -> RefreshOutcome {
        self.0
            .await
            .unwrap_or_else(|_closed| Err(ApiError::refresh_aborted()))
    }
}
