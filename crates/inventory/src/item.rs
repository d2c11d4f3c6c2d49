use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispo_core::{Aggregate, AggregateRoot, DomainError, DomainResult};

use crate::allocation::{Allocation, MAX_COUNT, Totals};
use crate::events::{
    AllocationOrigin, AmountReported, DistributionReplaced, IdealCorrected, InventoryEvent,
    StockCorrected, StockRelocated, UsageRecorded,
};
use crate::grade::Grade;
use crate::subject::{InventorySubject, SapNr, SubjectKind};

const NO_INVENTORY: &str = "No inventory available";
const NO_INITIAL_DISTRIBUTION: &str = "No inventory available - initial distribution required first";

/// Identity of an inventory item: what is counted, for which company.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryKey<S> {
    pub subject: S,
    pub company: String,
}

impl<S> InventoryKey<S> {
    pub fn new(subject: S, company: impl Into<String>) -> Self {
        Self {
            subject,
            company: company.into(),
        }
    }
}

/// Aggregate root: the stock of one subject held by one company.
///
/// Totals are always summed from the distribution and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: serde::de::DeserializeOwned"))]
pub struct InventoryItem<S> {
    subject: S,
    company: String,
    /// Target headcount, tracked for servants only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ideal: Option<i64>,
    distribution: Vec<Allocation>,
    #[serde(default)]
    version: u64,
}

pub type MaterialInventoryItem = InventoryItem<SapNr>;
pub type ServantInventoryItem = InventoryItem<Grade>;

impl<S: InventorySubject> InventoryItem<S> {
    /// An item without any allocation (not persisted until first distributed).
    pub fn new(subject: S, company: impl Into<String>) -> Self {
        Self {
            subject,
            company: company.into(),
            ideal: match S::KIND {
                SubjectKind::Servant => Some(0),
                SubjectKind::Material => None,
            },
            distribution: Vec::new(),
            version: 0,
        }
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn key(&self) -> InventoryKey<S> {
        InventoryKey::new(self.subject.clone(), self.company.clone())
    }

    pub fn ideal(&self) -> Option<i64> {
        self.ideal
    }

    pub fn distribution(&self) -> &[Allocation] {
        &self.distribution
    }

    pub fn allocation_at(&self, location: &str) -> Option<&Allocation> {
        self.distribution.iter().find(|a| a.location == location)
    }

    pub fn totals(&self) -> Totals {
        Totals::of(&self.distribution)
    }

    pub fn stock(&self) -> i64 {
        self.totals().stock
    }

    pub fn used(&self) -> i64 {
        self.totals().used
    }

    pub fn damaged_or_detached(&self) -> i64 {
        self.totals().damaged_or_detached
    }

    pub fn available(&self) -> i64 {
        self.totals().available()
    }

    pub fn has_allocation_at_any(&self, locations: &[String]) -> bool {
        self.distribution
            .iter()
            .any(|a| locations.iter().any(|l| *l == a.location))
    }

    /// Load-or-init, decide and evolve in one step.
    ///
    /// Only a distribution may create an item; every other command requires
    /// `current` to exist. The returned transition carries the version the
    /// stored document had, for conditional replaces.
    pub fn execute(
        current: Option<Self>,
        key: InventoryKey<S>,
        command: &InventoryCommand,
    ) -> DomainResult<Transition<S>> {
        let item = match current {
            Some(item) => item,
            None if command.creates_item() => Self::new(key.subject, key.company),
            None => return Err(DomainError::not_found(command.missing_item_reason())),
        };

        let events = item.handle(command)?;
        let expected_version = item.version;
        let mut next = item;
        for event in &events {
            next.apply(event);
        }
        if !events.is_empty() {
            next.version += 1;
        }

        Ok(Transition {
            expected_version,
            item: next,
            events,
        })
    }
}

/// Outcome of [`InventoryItem::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<S> {
    pub expected_version: u64,
    pub item: InventoryItem<S>,
    pub events: Vec<InventoryEvent<S>>,
}

impl<S> Transition<S> {
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

impl<S: InventorySubject> AggregateRoot for InventoryItem<S> {
    type Id = InventoryKey<S>;

    fn id(&self) -> Self::Id {
        self.key()
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: replace the whole distribution (creates the item if needed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributeForCompany {
    pub distribution: Vec<Allocation>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: report damaged material / detached servants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDamaged {
    pub location: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: report repaired material / available servants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRepaired {
    pub location: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: change `used` by a signed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportUsed {
    pub location: String,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectStock {
    pub location: String,
    pub stock: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectIdeal {
    pub ideal: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: fold allocations at removed locations into `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocateStock {
    pub removed_locations: Vec<String>,
    pub target: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    Distribute(DistributeForCompany),
    ReportDamaged(ReportDamaged),
    ReportRepaired(ReportRepaired),
    ReportUsed(ReportUsed),
    CorrectStock(CorrectStock),
    CorrectIdeal(CorrectIdeal),
    Relocate(RelocateStock),
}

impl InventoryCommand {
    pub fn creates_item(&self) -> bool {
        matches!(self, InventoryCommand::Distribute(_))
    }

    fn missing_item_reason(&self) -> &'static str {
        match self {
            InventoryCommand::CorrectStock(_) | InventoryCommand::CorrectIdeal(_) => {
                NO_INITIAL_DISTRIBUTION
            }
            _ => NO_INVENTORY,
        }
    }
}

impl<S: InventorySubject> Aggregate for InventoryItem<S> {
    type Command = InventoryCommand;
    type Event = InventoryEvent<S>;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::DistributionReplaced(e) => {
                self.distribution = e.distribution.clone();
            }
            InventoryEvent::Damaged(e) => {
                if let Some(a) = self.allocation_mut(&e.location) {
                    a.damaged_or_detached += e.amount;
                }
            }
            InventoryEvent::Repaired(e) => {
                if let Some(a) = self.allocation_mut(&e.location) {
                    a.damaged_or_detached -= e.amount;
                }
            }
            InventoryEvent::Used(e) => {
                if e.origin == AllocationOrigin::CreatedWithZeroStock {
                    self.distribution.push(Allocation::empty(e.location.clone()));
                }
                if let Some(a) = self.allocation_mut(&e.location) {
                    a.used += e.amount;
                }
            }
            InventoryEvent::StockCorrected(e) => {
                if let Some(a) = self.allocation_mut(&e.location) {
                    a.stock = e.stock;
                }
            }
            InventoryEvent::IdealCorrected(e) => {
                self.ideal = Some(e.ideal);
            }
            InventoryEvent::StockRelocated(e) => {
                self.distribution
                    .retain(|a| !e.removed.iter().any(|r| r.location == a.location));
                if let Some(target) = self.allocation_mut(&e.target) {
                    for removed in &e.removed {
                        target.absorb(removed);
                    }
                }
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::Distribute(cmd) => self.handle_distribute(cmd),
            InventoryCommand::ReportDamaged(cmd) => self.handle_damaged(cmd),
            InventoryCommand::ReportRepaired(cmd) => self.handle_repaired(cmd),
            InventoryCommand::ReportUsed(cmd) => self.handle_used(cmd),
            InventoryCommand::CorrectStock(cmd) => self.handle_correct_stock(cmd),
            InventoryCommand::CorrectIdeal(cmd) => self.handle_correct_ideal(cmd),
            InventoryCommand::Relocate(cmd) => self.handle_relocate(cmd),
        }
    }
}

impl<S: InventorySubject> InventoryItem<S> {
    fn allocation_mut(&mut self, location: &str) -> Option<&mut Allocation> {
        self.distribution.iter_mut().find(|a| a.location == location)
    }

    fn require_allocation(&self, location: &str) -> DomainResult<&Allocation> {
        self.allocation_at(location).ok_or_else(|| {
            DomainError::validation(format!(
                "No allocation of {} at {} for {}",
                self.subject, location, self.company
            ))
        })
    }

    fn handle_distribute(&self, cmd: &DistributeForCompany) -> DomainResult<Vec<InventoryEvent<S>>> {
        for (i, a) in cmd.distribution.iter().enumerate() {
            if a.has_negative_counter() {
                return Err(DomainError::validation(format!(
                    "Stock, used and damaged must not be negative at {}",
                    a.location
                )));
            }
            if a.exceeds_max_count() {
                return Err(DomainError::validation(format!(
                    "Stock, used and damaged must not exceed {MAX_COUNT} at {}",
                    a.location
                )));
            }
            // Counters are within 0..=MAX_COUNT here, so the difference fits.
            let available = a.available();
            if available < 0 {
                return Err(DomainError::validation(format!(
                    "Available is below Zero: Stock {} - Used {} - Damage {} = {available}",
                    a.stock, a.used, a.damaged_or_detached
                )));
            }
            if cmd.distribution[..i].iter().any(|b| b.location == a.location) {
                return Err(DomainError::validation(format!(
                    "Location {} is distributed twice",
                    a.location
                )));
            }
        }

        Ok(vec![InventoryEvent::DistributionReplaced(DistributionReplaced {
            subject: self.subject.clone(),
            company: self.company.clone(),
            distribution: cmd.distribution.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_damaged(&self, cmd: &ReportDamaged) -> DomainResult<Vec<InventoryEvent<S>>> {
        ensure_not_negative(cmd.amount)?;
        let available = self.available();
        if cmd.amount > available {
            return Err(DomainError::validation(format!(
                "Can not damage more than stock {available} at {}",
                self.company
            )));
        }
        let allocation = self.require_allocation(&cmd.location)?;
        if cmd.amount > allocation.available() {
            return Err(DomainError::validation(format!(
                "Can not damage more than stock {} at {}",
                allocation.available(),
                cmd.location
            )));
        }

        Ok(vec![InventoryEvent::Damaged(self.amount_reported(&cmd.location, cmd.amount, cmd.occurred_at))])
    }

    fn handle_repaired(&self, cmd: &ReportRepaired) -> DomainResult<Vec<InventoryEvent<S>>> {
        ensure_not_negative(cmd.amount)?;
        if cmd.amount > self.damaged_or_detached() {
            return Err(DomainError::validation("Can not repair more than damaged"));
        }
        let allocation = self.require_allocation(&cmd.location)?;
        if cmd.amount > allocation.damaged_or_detached {
            return Err(DomainError::validation(format!(
                "Can not repair more than damaged at {}",
                cmd.location
            )));
        }

        Ok(vec![InventoryEvent::Repaired(self.amount_reported(&cmd.location, cmd.amount, cmd.occurred_at))])
    }

    fn handle_used(&self, cmd: &ReportUsed) -> DomainResult<Vec<InventoryEvent<S>>> {
        let (origin, mut projected) = match self.allocation_at(&cmd.location) {
            Some(existing) => (AllocationOrigin::Existing, existing.clone()),
            None => (
                AllocationOrigin::CreatedWithZeroStock,
                Allocation::empty(cmd.location.clone()),
            ),
        };
        let fits = match projected.used.checked_add(cmd.amount) {
            Some(used) => {
                projected.used = used;
                used >= 0 && projected.available() >= 0
            }
            None => false,
        };
        if !fits {
            return Err(DomainError::validation("Can not use more than on stock"));
        }

        Ok(vec![InventoryEvent::Used(UsageRecorded {
            subject: self.subject.clone(),
            company: self.company.clone(),
            location: cmd.location.clone(),
            amount: cmd.amount,
            origin,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_correct_stock(&self, cmd: &CorrectStock) -> DomainResult<Vec<InventoryEvent<S>>> {
        if cmd.stock < 0 {
            return Err(DomainError::validation("Stock must be a positive value"));
        }
        if cmd.stock > MAX_COUNT {
            return Err(DomainError::validation(format!("Stock must not exceed {MAX_COUNT}")));
        }
        let totals = self.totals();
        if cmd.stock < totals.used.saturating_add(totals.damaged_or_detached) {
            return Err(DomainError::validation(
                "you are not allowed to correct stock to lower number than (used + damaged) please redistribute",
            ));
        }
        self.require_allocation(&cmd.location)?;

        Ok(vec![InventoryEvent::StockCorrected(StockCorrected {
            subject: self.subject.clone(),
            company: self.company.clone(),
            location: cmd.location.clone(),
            stock: cmd.stock,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_correct_ideal(&self, cmd: &CorrectIdeal) -> DomainResult<Vec<InventoryEvent<S>>> {
        if S::KIND != SubjectKind::Servant {
            return Err(DomainError::validation("Ideal is only tracked for servants"));
        }
        if cmd.ideal < 0 {
            return Err(DomainError::validation("Ideal must be a positive value"));
        }
        if cmd.ideal > MAX_COUNT {
            return Err(DomainError::validation(format!("Ideal must not exceed {MAX_COUNT}")));
        }

        Ok(vec![InventoryEvent::IdealCorrected(IdealCorrected {
            subject: self.subject.clone(),
            company: self.company.clone(),
            ideal: cmd.ideal,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_relocate(&self, cmd: &RelocateStock) -> DomainResult<Vec<InventoryEvent<S>>> {
        let removed: Vec<Allocation> = self
            .distribution
            .iter()
            .filter(|a| cmd.removed_locations.iter().any(|l| *l == a.location))
            .cloned()
            .collect();
        if removed.is_empty() {
            return Ok(Vec::new());
        }
        if removed.iter().any(|a| a.location == cmd.target) {
            return Err(DomainError::validation(format!(
                "Relocation target {} is being removed",
                cmd.target
            )));
        }
        let Some(target) = self.allocation_at(&cmd.target) else {
            return Err(DomainError::validation(format!(
                "No allocation of {} at relocation target {} for {}",
                self.subject, cmd.target, self.company
            )));
        };
        let merged = removed
            .iter()
            .try_fold(target.clone(), |acc, r| acc.checked_absorb(r));
        if merged.is_none() {
            return Err(DomainError::validation(format!(
                "Relocated stock at {} would exceed {MAX_COUNT}",
                cmd.target
            )));
        }

        Ok(vec![InventoryEvent::StockRelocated(StockRelocated {
            subject: self.subject.clone(),
            company: self.company.clone(),
            removed,
            target: cmd.target.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn amount_reported(&self, location: &str, amount: i64, occurred_at: DateTime<Utc>) -> AmountReported<S> {
        AmountReported {
            subject: self.subject.clone(),
            company: self.company.clone(),
            location: location.to_string(),
            amount,
            occurred_at,
        }
    }
}

fn ensure_not_negative(amount: i64) -> DomainResult<()> {
    if amount < 0 {
        return Err(DomainError::validation("Amount must be a positive value"));
    }
    Ok(())
}
