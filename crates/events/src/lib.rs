//! Domain events and the append-only event journal.

pub mod event;
pub mod in_memory_journal;
pub mod journal;

pub use event::Event;
pub use in_memory_journal::{InMemoryEventJournal, InMemoryJournalError};
pub use journal::{EventJournal, JournalEntry, JournalSubject};
