//! Ordering guard for overlapping catalog fetches.
//!
//! Every fetch takes a ticket before it starts. When it completes, its result
//! is applied only if no later ticket has been issued in the meantime, so a
//! slow periodic refresh can never overwrite a newer user-initiated one.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RefreshSequencer {
    issued: AtomicU64,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn latest(&self) -> Option<RefreshTicket> {
        match self.issued.load(Ordering::SeqCst) {
            0 => None,
            value => Some(RefreshTicket(value)),
        }
    }

    pub fn is_latest(&self, ticket: RefreshTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }
}
