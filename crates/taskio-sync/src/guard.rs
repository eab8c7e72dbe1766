//! Stale-response guard
//!
//! A view that may close while its fetch is still pending takes a ticket
//! before the request and checks it when the result arrives. Opening,
//! closing or switching the view revokes every outstanding ticket.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct StaleGuard {
    current: Rc<Cell<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardTicket(u64);

impl StaleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke older tickets and hand out a new one.
    pub fn issue(&self) -> GuardTicket {
        self.revoke();
        GuardTicket(self.current.get())
    }

    pub fn revoke(&self) {
        self.current.set(self.current.get() + 1);
    }

    pub fn is_current(&self, ticket: GuardTicket) -> bool {
        self.current.get() == ticket.0
    }

    /// Await `future` under a fresh ticket; `None` if the ticket was revoked
    /// in the meantime.
    pub async fn guarded<T>(&self, future: impl Future<Output = T>) -> Option<T> {
        let ticket = self.issue();
        let output = future.await;
        self.is_current(ticket).then_some(output)
    }
}
