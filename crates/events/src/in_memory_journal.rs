//! In-memory event journal for tests/dev.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::journal::{EventJournal, JournalEntry};

#[derive(Debug, Error)]
pub enum InMemoryJournalError {
    /// Append failed due to internal lock poisoning.
    #[error("journal lock poisoned")]
    Poisoned,

    /// The journal was closed and no longer accepts entries.
    #[error("journal is closed")]
    Closed,
}

/// In-memory append-only journal.
///
/// - No IO / no async
/// - Entries are kept in append order
#[derive(Debug, Default)]
pub struct InMemoryEventJournal {
    entries: Mutex<Vec<JournalEntry>>,
    closed: AtomicBool,
}

impl InMemoryEventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject every subsequent append (simulates an unavailable sink).
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl EventJournal for InMemoryEventJournal {
    type Error = InMemoryJournalError;

    fn append(&self, entry: JournalEntry) -> Result<(), Self::Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(InMemoryJournalError::Closed);
        }
        let mut entries = self.entries.lock().map_err(|_| InMemoryJournalError::Poisoned)?;
        entries.push(entry);
        Ok(())
    }
}
