//! Client-side request cache slots.
//!
//! A [`Lookup`] holds the last response for one remote resource and applies
//! "last issued wins" revalidation: every request takes a [`Ticket`], and a
//! response is only applied if no newer request has been issued since.
//! Requests are never aborted; stale responses are dropped on arrival.
//!
//! Requests against a slot behind a lock go through [`Pending`], which gives
//! the ticket back if the request future is dropped before it settles.

use std::sync::{PoisonError, RwLock};

use crate::api::ApiError;

/// Handle for one in-flight request against a [`Lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Cached state of one remote resource.
///
/// Data survives a failed revalidation (the error is recorded alongside it),
/// matching the usual request-cache behavior.
#[derive(Debug, Clone)]
pub struct Lookup<T> {
    data: Option<T>,
    error: Option<ApiError>,
    issued: u64,
    applied: u64,
    received: bool,
}

impl<T> Default for Lookup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lookup<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            error: None,
            issued: 0,
            applied: 0,
            received: false,
        }
    }

    /// Start a request. Any earlier outstanding ticket becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply a response. Returns `false` (and changes nothing) if `ticket`
    /// has been superseded by a newer request or a [`Lookup::clear`].
    pub fn settle(&mut self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        if ticket.0 != self.issued || ticket.0 <= self.applied {
            return false;
        }

        self.applied = ticket.0;
        self.received = true;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err);
            }
        }
        true
    }

    /// Give up on `ticket` without a response. Data and error are kept.
    ///
    /// Only the current ticket counts: a superseded request never held the
    /// slot in its fetching state.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        if ticket.0 != self.issued || ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        true
    }

    /// Forget everything and invalidate outstanding tickets.
    pub fn clear(&mut self) {
        self.issued += 1;
        self.applied = self.issued;
        self.data = None;
        self.error = None;
        self.received = false;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// A request is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.applied < self.issued
    }

    /// A request is outstanding and nothing has been received yet.
    ///
    /// Background revalidation of an already-answered slot is not "loading".
    pub fn is_loading(&self) -> bool {
        self.is_fetching() && !self.received
    }

    /// The most recent applied response was a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Selects one [`Lookup`] inside the lock-guarded state `S`.
pub type Slot<S, T> = fn(&mut S) -> &mut Lookup<T>;

/// An in-flight request against a lock-guarded [`Lookup`].
///
/// Settle it with the response; if it is dropped first (timeout, aborted
/// task, losing `select!` branch) its ticket is abandoned so the slot does
/// not stay loading.
pub struct Pending<'a, S, T> {
    state: &'a RwLock<S>,
    slot: Slot<S, T>,
    ticket: Ticket,
    settled: bool,
}

impl<'a, S, T> Pending<'a, S, T> {
    pub fn begin(state: &'a RwLock<S>, slot: Slot<S, T>) -> Self {
        let ticket = {
            let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
            slot(&mut guard).begin()
        };
        Self {
            state,
            slot,
            ticket,
            settled: false,
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// See [`Lookup::settle`].
    pub fn settle(mut self, result: Result<T, ApiError>) -> bool {
        self.settled = true;
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        (self.slot)(&mut guard).settle(self.ticket, result)
    }
}

impl<S, T> Drop for Pending<'_, S, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if (self.slot)(&mut guard).abandon(self.ticket) {
            tracing::debug!("in-flight lookup dropped before settling");
        }
    }
}
