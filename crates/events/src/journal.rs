//! Event journal: an append-only audit sink.
//!
//! Every mutating inventory operation writes one entry per fact it produced.
//! The journal is never read back by domain logic; it exists for auditing.
//!
//! ## Delivery
//!
//! The journal is written **after** the inventory document was replaced. A
//! failed append does not undo the write, it only leaves a gap in the audit
//! trail. Callers decide whether such a failure is logged or surfaced.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::event::Event;

/// Who an entry is about: the inventory subject and the owning company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSubject {
    /// "material" or "servant".
    pub kind: String,
    /// SAP number for material, grade display name for servants.
    pub key: String,
    pub company: String,
}

impl JournalSubject {
    pub fn new(kind: impl Into<String>, key: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            company: company.into(),
        }
    }
}

/// One immutable journal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    event_id: Uuid,
    subject_kind: String,
    subject_key: String,
    company: String,
    location: Option<String>,
    timestamp: DateTime<Utc>,
    event_type: String,
    event_version: u32,
    payload: JsonValue,
}

impl JournalEntry {
    /// Build an entry from a typed domain event.
    ///
    /// Captures the event metadata (type, version, business time) next to the
    /// JSON payload so the journal stays readable without the domain types.
    pub fn from_typed<E>(
        subject: &JournalSubject,
        location: Option<&str>,
        event: &E,
    ) -> Result<Self, serde_json::Error>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event)?;
        Ok(Self {
            event_id: Uuid::now_v7(),
            subject_kind: subject.kind.clone(),
            subject_key: subject.key.clone(),
            company: subject.company.clone(),
            location: location.map(str::to_string),
            timestamp: event.occurred_at(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            payload,
        })
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn subject_kind(&self) -> &str {
        &self.subject_kind
    }

    pub fn subject_key(&self) -> &str {
        &self.subject_key
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }
}

/// Append-only journal sink.
///
/// Implementations must be safe to share across threads; appends from
/// different requests may interleave in any order.
pub trait EventJournal: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn append(&self, entry: JournalEntry) -> Result<(), Self::Error>;
}

impl<J> EventJournal for Arc<J>
where
    J: EventJournal + ?Sized,
{
    type Error = J::Error;

    fn append(&self, entry: JournalEntry) -> Result<(), Self::Error> {
        (**self).append(entry)
    }
}
