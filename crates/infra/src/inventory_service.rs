//! Read-modify-write pipeline for inventory items.
//!
//! ```text
//! call
//!   ↓
//! 1. Load the item document for (subject, company)
//!   ↓
//! 2. Decide + evolve (pure, `InventoryItem::execute`)
//!   ↓
//! 3. Replace the document (upsert, optionally version-checked)
//!   ↓
//! 4. Append journal entries (best effort)
//! ```
//!
//! Every domain check runs before the replace, so a rejected call writes
//! nothing. Journal failures never roll back a replace.

use std::marker::PhantomData;

use chrono::Utc;
use tracing::{debug, info, warn};

use dispo_core::{AggregateRoot, ExpectedVersion};
use dispo_events::{Event, EventJournal};
use dispo_inventory::{
    Allocation, CorrectIdeal, CorrectStock, DistributeForCompany, Grade, InventoryCommand,
    InventoryEvent, InventoryItem, InventoryKey, InventorySubject, RelocateStock, ReportDamaged,
    ReportRepaired, ReportUsed, SapNr, Transition,
};

use crate::config::DispositionConfig;
use crate::document_store::{Collection, ReplaceOptions};
use crate::error::ServiceError;

/// Inventory operations for one subject kind (material or servant).
pub struct InventoryService<S, C, J> {
    items: C,
    journal: J,
    config: DispositionConfig,
    _subject: PhantomData<fn() -> S>,
}

pub type MaterialInventoryService<C, J> = InventoryService<SapNr, C, J>;
pub type ServantInventoryService<C, J> = InventoryService<Grade, C, J>;

fn same_key<S: InventorySubject>(key: &InventoryKey<S>) -> impl Fn(&InventoryItem<S>) -> bool + '_ {
    move |item| *item.subject() == key.subject && item.company() == key.company
}

impl<S, C, J> InventoryService<S, C, J>
where
    S: InventorySubject,
    C: Collection<InventoryItem<S>>,
    J: EventJournal,
{
    pub fn new(items: C, journal: J, config: DispositionConfig) -> Self {
        Self {
            items,
            journal,
            config,
            _subject: PhantomData,
        }
    }

    /// Replace the whole distribution of `subject` at `company`.
    pub fn distribute(
        &self,
        subject: S,
        company: &str,
        distribution: Vec<Allocation>,
    ) -> Result<InventoryItem<S>, ServiceError> {
        self.execute(
            InventoryKey::new(subject, company),
            InventoryCommand::Distribute(DistributeForCompany {
                distribution,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Report damaged material (or detached servants) at a location.
    pub fn report_damaged(
        &self,
        subject: S,
        company: &str,
        location: &str,
        amount: i64,
    ) -> Result<InventoryItem<S>, ServiceError> {
        self.execute(
            InventoryKey::new(subject, company),
            InventoryCommand::ReportDamaged(ReportDamaged {
                location: location.to_string(),
                amount,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Report repaired material (or servants available again) at a location.
    pub fn report_repaired(
        &self,
        subject: S,
        company: &str,
        location: &str,
        amount: i64,
    ) -> Result<InventoryItem<S>, ServiceError> {
        self.execute(
            InventoryKey::new(subject, company),
            InventoryCommand::ReportRepaired(ReportRepaired {
                location: location.to_string(),
                amount,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Change `used` at a location by a signed amount.
    pub fn report_used(
        &self,
        subject: S,
        company: &str,
        location: &str,
        amount: i64,
    ) -> Result<InventoryItem<S>, ServiceError> {
        self.execute(
            InventoryKey::new(subject, company),
            InventoryCommand::ReportUsed(ReportUsed {
                location: location.to_string(),
                amount,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn correct_stock(
        &self,
        subject: S,
        company: &str,
        location: &str,
        stock: i64,
    ) -> Result<InventoryItem<S>, ServiceError> {
        self.execute(
            InventoryKey::new(subject, company),
            InventoryCommand::CorrectStock(CorrectStock {
                location: location.to_string(),
                stock,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Set the target headcount; rejected for material items.
    pub fn correct_ideal(&self, subject: S, company: &str, ideal: i64) -> Result<InventoryItem<S>, ServiceError> {
        self.execute(
            InventoryKey::new(subject, company),
            InventoryCommand::CorrectIdeal(CorrectIdeal {
                ideal,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Run one command against the stored item and persist the outcome.
    pub fn execute(&self, key: InventoryKey<S>, command: InventoryCommand) -> Result<InventoryItem<S>, ServiceError> {
        let transition = self.plan(key, &command)?;
        self.commit(transition)
    }

    /// Decide a command against the stored item without writing.
    pub fn plan(&self, key: InventoryKey<S>, command: &InventoryCommand) -> Result<Transition<S>, ServiceError> {
        let current = self.items.find_one(&same_key(&key))?;
        let transition = InventoryItem::execute(current, key, command).inspect_err(|err| {
            debug!(kind = %S::KIND, reason = err.reason(), "inventory command rejected");
        })?;
        Ok(transition)
    }

    /// Persist a decided transition, then journal its events.
    pub fn commit(&self, transition: Transition<S>) -> Result<InventoryItem<S>, ServiceError> {
        let Transition {
            expected_version,
            item,
            events,
        } = transition;
        if events.is_empty() {
            return Ok(item);
        }

        let expected = if self.config.optimistic_concurrency {
            ExpectedVersion::Exact(expected_version)
        } else {
            ExpectedVersion::Any
        };
        let key = item.key();
        self.items.replace_one(
            &same_key(&key),
            item.clone(),
            ReplaceOptions::upsert().expecting(expected),
        )?;

        info!(
            kind = %S::KIND,
            subject = %item.subject(),
            company = item.company(),
            version = item.version(),
            events = events.len(),
            "inventory item replaced"
        );

        self.journal(&events)?;
        Ok(item)
    }

    fn journal(&self, events: &[InventoryEvent<S>]) -> Result<(), ServiceError> {
        let mut failures = Vec::new();
        for event in events {
            let entries = match event.journal_entries() {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(event_type = event.event_type(), error = %err, "journal payload not serializable");
                    failures.push(err.to_string());
                    continue;
                }
            };
            for entry in entries {
                if let Err(err) = self.journal.append(entry) {
                    warn!(
                        event_type = event.event_type(),
                        company = event.company(),
                        error = %err,
                        "journal append failed"
                    );
                    failures.push(err.to_string());
                }
            }
        }

        if self.config.strict_journal && !failures.is_empty() {
            return Err(ServiceError::Journal(failures.join("; ")));
        }
        Ok(())
    }

    /// Items of `company` that hold an allocation at any of `locations`.
    pub fn items_at(&self, company: &str, locations: &[String]) -> Result<Vec<InventoryItem<S>>, ServiceError> {
        Ok(self
            .items
            .find(&|item: &InventoryItem<S>| item.company() == company && item.has_allocation_at_any(locations))?)
    }

    /// Decide the relocation of every given item without writing anything.
    ///
    /// Fails on the first item that can not be relocated.
    pub fn plan_relocation(
        &self,
        items: Vec<InventoryItem<S>>,
        removed: &[String],
        target: &str,
    ) -> Result<Vec<Transition<S>>, ServiceError> {
        let command = InventoryCommand::Relocate(RelocateStock {
            removed_locations: removed.to_vec(),
            target: target.to_string(),
            occurred_at: Utc::now(),
        });

        let mut plan = Vec::new();
        for item in items {
            let key = item.key();
            let transition = InventoryItem::execute(Some(item), key, &command)?;
            if !transition.is_noop() {
                plan.push(transition);
            }
        }
        Ok(plan)
    }

    pub fn inventory_item(&self, subject: &S, company: &str) -> Result<Option<InventoryItem<S>>, ServiceError> {
        let key = InventoryKey::new(subject.clone(), company);
        Ok(self.items.find_one(&same_key(&key))?)
    }

    pub fn inventory_for_company(&self, company: &str) -> Result<Vec<InventoryItem<S>>, ServiceError> {
        Ok(self.items.find(&|item: &InventoryItem<S>| item.company() == company)?)
    }

    pub fn inventory_for_all(&self) -> Result<Vec<InventoryItem<S>>, ServiceError> {
        Ok(self.items.find(&|_: &InventoryItem<S>| true)?)
    }

    pub fn allocation_at(&self, subject: &S, company: &str, location: &str) -> Result<Option<Allocation>, ServiceError> {
        Ok(self
            .inventory_item(subject, company)?
            .and_then(|item| item.allocation_at(location).cloned()))
    }

    pub fn delete_for_company(&self, company: &str) -> Result<usize, ServiceError> {
        Ok(self.items.delete_many(&|item: &InventoryItem<S>| item.company() == company)?)
    }

    pub fn delete_for_subject(&self, subject: &S) -> Result<usize, ServiceError> {
        Ok(self.items.delete_many(&|item: &InventoryItem<S>| item.subject() == subject)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dispo_events::InMemoryEventJournal;
    use proptest::prelude::*;

    use crate::document_store::InMemoryCollection;

    type Service<S> = InventoryService<S, Arc<InMemoryCollection<InventoryItem<S>>>, Arc<InMemoryEventJournal>>;

    fn service<S: InventorySubject>(config: DispositionConfig) -> (Service<S>, Arc<InMemoryEventJournal>) {
        let journal = Arc::new(InMemoryEventJournal::new());
        let service = InventoryService::new(Arc::new(InMemoryCollection::new()), journal.clone(), config);
        (service, journal)
    }

    fn radio() -> SapNr {
        SapNr::new("256.156")
    }

    #[test]
    fn distribution_is_stored_and_journaled_per_allocation() {
        let (service, journal) = service::<SapNr>(DispositionConfig::default());

        service
            .distribute(
                radio(),
                "Stab",
                vec![Allocation::at("KP Rw", 10, 2, 1), Allocation::at("Bern", 4, 0, 0)],
            )
            .unwrap();

        let item = service.inventory_item(&radio(), "Stab").unwrap().unwrap();
        assert_eq!(item.stock(), 14);
        assert_eq!(item.available(), 11);
        assert_eq!(journal.len(), 2);
        assert!(journal.entries().iter().all(|e| e.event_type() == "DistributionChanged"));
    }

    #[test]
    fn rejected_distribution_writes_nothing() {
        let (service, journal) = service::<SapNr>(DispositionConfig::default());

        let err = service
            .distribute(radio(), "Stab", vec![Allocation::at("KP Rw", 1, 2, 0)])
            .unwrap_err();

        assert_eq!(err.reason(), Some("Available is below Zero: Stock 1 - Used 2 - Damage 0 = -1"));
        assert!(service.inventory_for_all().unwrap().is_empty());
        assert!(journal.is_empty());
    }

    #[test]
    fn damage_and_repair_round_trip() {
        let (service, journal) = service::<SapNr>(DispositionConfig::default());
        service.distribute(radio(), "Stab", vec![Allocation::at("Bern", 10, 0, 1)]).unwrap();

        service.report_damaged(radio(), "Stab", "Bern", 3).unwrap();
        assert_eq!(service.allocation_at(&radio(), "Stab", "Bern").unwrap().unwrap().damaged_or_detached, 4);

        service.report_repaired(radio(), "Stab", "Bern", 3).unwrap();
        assert_eq!(service.allocation_at(&radio(), "Stab", "Bern").unwrap().unwrap().damaged_or_detached, 1);

        let types: Vec<_> = journal.entries().iter().map(|e| e.event_type().to_string()).collect();
        assert_eq!(types, ["DistributionChanged", "Defected", "Repaired"]);
    }

    #[test]
    fn servant_reports_use_servant_event_names() {
        let (service, journal) = service::<Grade>(DispositionConfig::default());
        service.distribute(Grade::Ncos, "Stab", vec![Allocation::at("KP Rw", 5, 0, 0)]).unwrap();

        service.report_damaged(Grade::Ncos, "Stab", "KP Rw", 1).unwrap();
        service.report_repaired(Grade::Ncos, "Stab", "KP Rw", 1).unwrap();

        let entries = journal.entries();
        assert_eq!(entries[1].event_type(), "Detached");
        assert_eq!(entries[2].event_type(), "Available");
    }

    #[test]
    fn reports_on_missing_items_are_not_found() {
        let (service, _) = service::<SapNr>(DispositionConfig::default());

        let damaged = service.report_damaged(radio(), "Stab", "KP Rw", 1).unwrap_err();
        let corrected = service.correct_stock(radio(), "Stab", "KP Rw", 4).unwrap_err();

        assert!(damaged.is_not_found());
        assert_eq!(damaged.reason(), Some("No inventory available"));
        assert_eq!(
            corrected.reason(),
            Some("No inventory available - initial distribution required first")
        );
    }

    #[test]
    fn usage_beyond_stock_is_rejected_and_state_kept() {
        let (service, _) = service::<SapNr>(DispositionConfig::default());
        service.distribute(radio(), "Stab", vec![Allocation::at("Bern", 5, 3, 0)]).unwrap();

        let err = service.report_used(radio(), "Stab", "Bern", 3).unwrap_err();

        assert_eq!(err.reason(), Some("Can not use more than on stock"));
        assert_eq!(service.allocation_at(&radio(), "Stab", "Bern").unwrap().unwrap().used, 3);
    }

    #[test]
    fn usage_at_new_location_creates_zero_stock_allocation() {
        let (service, _) = service::<SapNr>(DispositionConfig::default());
        service.distribute(radio(), "Stab", vec![Allocation::at("Bern", 5, 3, 0)]).unwrap();

        service.report_used(radio(), "Stab", "Thun", 0).unwrap();

        assert_eq!(
            service.allocation_at(&radio(), "Stab", "Thun").unwrap(),
            Some(Allocation::at("Thun", 0, 0, 0))
        );
    }

    #[test]
    fn ideal_is_servant_only() {
        let (servants, _) = service::<Grade>(DispositionConfig::default());
        servants.distribute(Grade::Officers, "Stab", vec![Allocation::at("KP Rw", 3, 0, 0)]).unwrap();
        let item = servants.correct_ideal(Grade::Officers, "Stab", 5).unwrap();
        assert_eq!(item.ideal(), Some(5));

        let (materials, _) = service::<SapNr>(DispositionConfig::default());
        materials.distribute(radio(), "Stab", vec![Allocation::at("KP Rw", 3, 0, 0)]).unwrap();
        assert!(materials.correct_ideal(radio(), "Stab", 5).unwrap_err().is_validation());
    }

    #[test]
    fn stale_writer_loses_with_optimistic_concurrency() {
        let config = DispositionConfig {
            optimistic_concurrency: true,
            ..DispositionConfig::default()
        };
        let (service, _) = service::<SapNr>(config);
        service.distribute(radio(), "Stab", vec![Allocation::at("Bern", 10, 0, 0)]).unwrap();

        let stale = service.inventory_item(&radio(), "Stab").unwrap();
        service.report_used(radio(), "Stab", "Bern", 1).unwrap();

        let key = InventoryKey::new(radio(), "Stab");
        let command = InventoryCommand::ReportUsed(ReportUsed {
            location: "Bern".into(),
            amount: 2,
            occurred_at: Utc::now(),
        });
        let transition = InventoryItem::execute(stale, key, &command).unwrap();
        let err = service.commit(transition).unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(service.allocation_at(&radio(), "Stab", "Bern").unwrap().unwrap().used, 1);
    }

    #[test]
    fn journal_failures_are_tolerated_unless_strict() {
        let (lenient, journal) = service::<SapNr>(DispositionConfig::default());
        journal.close();
        assert!(lenient.distribute(radio(), "Stab", vec![Allocation::at("KP Rw", 1, 0, 0)]).is_ok());

        let strict_config = DispositionConfig {
            strict_journal: true,
            ..DispositionConfig::default()
        };
        let (strict, journal) = service::<SapNr>(strict_config);
        journal.close();
        let err = strict
            .distribute(radio(), "Stab", vec![Allocation::at("KP Rw", 1, 0, 0)])
            .unwrap_err();

        assert!(matches!(err, ServiceError::Journal(_)));
        // The write stands.
        assert!(strict.inventory_item(&radio(), "Stab").unwrap().is_some());
    }

    #[test]
    fn relocation_plan_skips_unaffected_items() {
        let (service, journal) = service::<SapNr>(DispositionConfig::default());
        service
            .distribute(radio(), "Stab", vec![Allocation::at("KP Rw", 1, 0, 0), Allocation::at("Bern", 2, 1, 0)])
            .unwrap();
        service
            .distribute(SapNr::new("1"), "Stab", vec![Allocation::at("KP Rw", 1, 0, 0)])
            .unwrap();
        let removed = vec!["Bern".to_string()];

        let affected = service.items_at("Stab", &removed).unwrap();
        let plan = service.plan_relocation(affected, &removed, "KP Rw").unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(journal.len(), 3);

        for transition in plan {
            service.commit(transition).unwrap();
        }
        let item = service.inventory_item(&radio(), "Stab").unwrap().unwrap();
        assert_eq!(item.distribution(), [Allocation::at("KP Rw", 3, 1, 0)]);
    }

    proptest! {
        /// Property: damaging then repairing the same amount restores the count.
        #[test]
        fn damage_then_repair_is_identity(stock in 0i64..100, d in 0i64..100, a in 0i64..100) {
            let damaged = d % (stock + 1);
            let amount = a % (stock - damaged + 1);
            let (service, _) = service::<SapNr>(DispositionConfig::default());
            service.distribute(radio(), "Stab", vec![Allocation::at("KP Rw", stock, 0, damaged)]).unwrap();

            service.report_damaged(radio(), "Stab", "KP Rw", amount).unwrap();
            let item = service.report_repaired(radio(), "Stab", "KP Rw", amount).unwrap();

            prop_assert_eq!(item.damaged_or_detached(), damaged);
        }

        /// Property: correcting stock below used + damaged is always rejected.
        #[test]
        fn stock_below_usage_is_rejected(used in 0i64..50, damaged in 0i64..50, stock in 0i64..100) {
            let (service, _) = service::<SapNr>(DispositionConfig::default());
            service.distribute(radio(), "Stab", vec![Allocation::at("KP Rw", used + damaged, used, damaged)]).unwrap();

            let result = service.correct_stock(radio(), "Stab", "KP Rw", stock);

            prop_assert_eq!(result.is_err(), stock < used + damaged);
        }
    }
}
