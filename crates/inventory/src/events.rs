//! Facts emitted by inventory items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispo_events::{Event, JournalEntry, JournalSubject};

use crate::allocation::Allocation;
use crate::subject::{InventorySubject, SubjectKind};

/// Event: the whole distribution was replaced.
///
/// Journaled as one [`DistributionChanged`] per allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReplaced<S> {
    pub subject: S,
    pub company: String,
    pub distribution: Vec<Allocation>,
    pub occurred_at: DateTime<Utc>,
}

impl<S: InventorySubject> DistributionReplaced<S> {
    pub fn changes(&self) -> Vec<DistributionChanged<S>> {
        self.distribution
            .iter()
            .map(|allocation| DistributionChanged {
                subject: self.subject.clone(),
                company: self.company.clone(),
                allocation: allocation.clone(),
                occurred_at: self.occurred_at,
            })
            .collect()
    }
}

/// Journal fact: the allocation at one location was set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionChanged<S> {
    pub subject: S,
    pub company: String,
    pub allocation: Allocation,
    pub occurred_at: DateTime<Utc>,
}

impl<S: InventorySubject> Event for DistributionChanged<S> {
    fn event_type(&self) -> &'static str {
        "DistributionChanged"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Event: damaged/detached count moved by `amount` at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountReported<S> {
    pub subject: S,
    pub company: String,
    pub location: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Whether usage was booked on an existing allocation or on one created for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationOrigin {
    Existing,
    CreatedWithZeroStock,
}

/// Event: `used` changed by a signed `amount` at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecorded<S> {
    pub subject: S,
    pub company: String,
    pub location: String,
    pub amount: i64,
    pub origin: AllocationOrigin,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCorrected<S> {
    pub subject: S,
    pub company: String,
    pub location: String,
    pub stock: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdealCorrected<S> {
    pub subject: S,
    pub company: String,
    pub ideal: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: allocations at removed locations were folded into `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRelocated<S> {
    pub subject: S,
    pub company: String,
    pub removed: Vec<Allocation>,
    pub target: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InventoryEvent<S> {
    DistributionReplaced(DistributionReplaced<S>),
    Damaged(AmountReported<S>),
    Repaired(AmountReported<S>),
    Used(UsageRecorded<S>),
    StockCorrected(StockCorrected<S>),
    IdealCorrected(IdealCorrected<S>),
    StockRelocated(StockRelocated<S>),
}

impl<S: InventorySubject> Event for InventoryEvent<S> {
    fn event_type(&self) -> &'static str {
        match (self, S::KIND) {
            (InventoryEvent::DistributionReplaced(_), _) => "DistributionReplaced",
            (InventoryEvent::Damaged(_), SubjectKind::Material) => "Defected",
            (InventoryEvent::Damaged(_), SubjectKind::Servant) => "Detached",
            (InventoryEvent::Repaired(_), SubjectKind::Material) => "Repaired",
            (InventoryEvent::Repaired(_), SubjectKind::Servant) => "Available",
            (InventoryEvent::Used(_), _) => "Used",
            (InventoryEvent::StockCorrected(_), _) => "StockCorrected",
            (InventoryEvent::IdealCorrected(_), _) => "IdealCorrected",
            (InventoryEvent::StockRelocated(_), _) => "StockRelocated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::DistributionReplaced(e) => e.occurred_at,
            InventoryEvent::Damaged(e) | InventoryEvent::Repaired(e) => e.occurred_at,
            InventoryEvent::Used(e) => e.occurred_at,
            InventoryEvent::StockCorrected(e) => e.occurred_at,
            InventoryEvent::IdealCorrected(e) => e.occurred_at,
            InventoryEvent::StockRelocated(e) => e.occurred_at,
        }
    }
}

impl<S: InventorySubject> InventoryEvent<S> {
    pub fn subject(&self) -> &S {
        match self {
            InventoryEvent::DistributionReplaced(e) => &e.subject,
            InventoryEvent::Damaged(e) | InventoryEvent::Repaired(e) => &e.subject,
            InventoryEvent::Used(e) => &e.subject,
            InventoryEvent::StockCorrected(e) => &e.subject,
            InventoryEvent::IdealCorrected(e) => &e.subject,
            InventoryEvent::StockRelocated(e) => &e.subject,
        }
    }

    pub fn company(&self) -> &str {
        match self {
            InventoryEvent::DistributionReplaced(e) => &e.company,
            InventoryEvent::Damaged(e) | InventoryEvent::Repaired(e) => &e.company,
            InventoryEvent::Used(e) => &e.company,
            InventoryEvent::StockCorrected(e) => &e.company,
            InventoryEvent::IdealCorrected(e) => &e.company,
            InventoryEvent::StockRelocated(e) => &e.company,
        }
    }

    /// Location the fact is about, if it is about a single one.
    pub fn location(&self) -> Option<&str> {
        match self {
            InventoryEvent::Damaged(e) | InventoryEvent::Repaired(e) => Some(&e.location),
            InventoryEvent::Used(e) => Some(&e.location),
            InventoryEvent::StockCorrected(e) => Some(&e.location),
            InventoryEvent::StockRelocated(e) => Some(&e.target),
            InventoryEvent::DistributionReplaced(_) | InventoryEvent::IdealCorrected(_) => None,
        }
    }

    /// Journal entries for this event, one per journaled fact.
    pub fn journal_entries(&self) -> Result<Vec<JournalEntry>, serde_json::Error> {
        let subject = JournalSubject::new(S::KIND.as_str(), self.subject().key(), self.company());
        match self {
            InventoryEvent::DistributionReplaced(e) => e
                .changes()
                .iter()
                .map(|change| {
                    JournalEntry::from_typed(&subject, Some(change.allocation.location.as_str()), change)
                })
                .collect(),
            other => Ok(vec![JournalEntry::from_typed(&subject, other.location(), other)?]),
        }
    }
}
