//! Companies, materials and grades.
//!
//! Changing a company's locations relocates stock first; deleting a company
//! or a material removes its inventory.

use tracing::{debug, info, warn};

use dispo_core::{CompanyId, DomainError, ExpectedVersion, MaterialId};
use dispo_events::EventJournal;
use dispo_inventory::ordering::{COMPANY_NAMES, sort_materials, sorted_grades};
use dispo_inventory::{Company, Grade, Material, SapNr};

use crate::document_store::{ReplaceOptions, by_id};
use crate::error::ServiceError;
use crate::services::Disposition;

/// Plan-and-commit rounds before a lost race is reported to the caller.
const RELOCATION_ATTEMPTS: usize = 3;

impl<J: EventJournal> Disposition<J> {
    /// All companies in company name order.
    pub fn companies(&self) -> Result<Vec<Company>, ServiceError> {
        let mut companies = self.companies.find(&|_: &Company| true)?;
        companies.sort_by(|a, b| COMPANY_NAMES.compare(&a.name, &b.name));
        Ok(companies)
    }

    pub fn company_names(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.companies()?.into_iter().map(|c| c.name).collect())
    }

    pub fn company(&self, id: CompanyId) -> Result<Company, ServiceError> {
        self.companies
            .find_one(&by_id::<Company>(id))?
            .ok_or_else(|| DomainError::not_found(format!("Company {id} not found")).into())
    }

    pub fn company_by_name(&self, name: &str) -> Result<Company, ServiceError> {
        self.companies
            .find_one(&|c: &Company| c.name == name)?
            .ok_or_else(|| DomainError::not_found("Company not found").into())
    }

    pub fn create_company(&self, company: Company) -> Result<Company, ServiceError> {
        let company = company.normalized();
        company.validate()?;
        if self.companies.find_one(&|c: &Company| c.name == company.name)?.is_some() {
            return Err(DomainError::conflict(format!("Company name {} is already in use", company.name)).into());
        }

        self.companies.insert_one(company.clone())?;
        info!(company = %company.name, locations = company.locations.len(), "company created");
        Ok(company)
    }

    /// Replace a company. Stock at locations the update drops is moved first.
    pub fn update_company(&self, updated: Company) -> Result<Company, ServiceError> {
        let updated = updated.normalized();
        updated.validate()?;
        let current = self.company(updated.id)?;

        if current.name != updated.name {
            self.check_rename(&current, &updated)?;
        }

        let removed = current.removed_locations(&updated);
        self.relocate(&current, &removed)?;

        let id = updated.id;
        self.companies.replace_one(
            &by_id::<Company>(id),
            updated.clone(),
            ReplaceOptions {
                upsert: false,
                expected_version: ExpectedVersion::Any,
            },
        )?;
        info!(company = %updated.name, removed = ?removed, "company updated");
        Ok(updated)
    }

    fn check_rename(&self, current: &Company, updated: &Company) -> Result<(), ServiceError> {
        if self.companies.find_one(&|c: &Company| c.name == updated.name && c.id != updated.id)?.is_some() {
            return Err(DomainError::conflict(format!("Company name {} is already in use", updated.name)).into());
        }
        let holds_inventory = !self.material_inventory().inventory_for_company(&current.name)?.is_empty()
            || !self.servant_inventory().inventory_for_company(&current.name)?.is_empty();
        if holds_inventory {
            return Err(DomainError::validation(format!(
                "Company {} holds inventory and can not be renamed",
                current.name
            ))
            .into());
        }
        Ok(())
    }

    /// Delete a company together with its material and servant inventory.
    pub fn delete_company(&self, id: CompanyId) -> Result<(), ServiceError> {
        let company = self.company(id)?;
        let materials = self.material_inventory().delete_for_company(&company.name)?;
        let servants = self.servant_inventory().delete_for_company(&company.name)?;
        self.companies.delete_one(&by_id::<Company>(id))?;
        info!(company = %company.name, materials, servants, "company deleted");
        Ok(())
    }

    /// Fold the stock at `removed` locations of the stored company into its
    /// front location (or default location). Returns the number of moved items.
    pub fn move_stock_to_default_location(&self, company_id: CompanyId, removed: &[String]) -> Result<usize, ServiceError> {
        let company = self.company(company_id)?;
        self.relocate(&company, removed)
    }

    /// Every affected item of both kinds is checked before the first write.
    ///
    /// Items are replaced one at a time, not as one transaction. An item that
    /// was already moved holds nothing at the removed locations, so a lost
    /// concurrency race re-plans the remaining items from the store. A backend
    /// failure part way leaves the earlier items moved; calling again with the
    /// same locations finishes the move.
    fn relocate(&self, company: &Company, removed: &[String]) -> Result<usize, ServiceError> {
        if removed.is_empty() {
            return Ok(0);
        }
        let mut moved = 0;
        let mut attempt = 1;
        loop {
            match self.relocate_once(company, removed, &mut moved) {
                Err(err) if err.is_conflict() && attempt < RELOCATION_ATTEMPTS => {
                    warn!(company = %company.name, attempt, error = %err, "relocation lost a race, re-planning");
                    attempt += 1;
                }
                Err(err) => return Err(err),
                Ok(()) => return Ok(moved),
            }
        }
    }

    fn relocate_once(&self, company: &Company, removed: &[String], moved: &mut usize) -> Result<(), ServiceError> {
        let materials = self.material_inventory().items_at(&company.name, removed)?;
        let servants = self.servant_inventory().items_at(&company.name, removed)?;
        if materials.is_empty() && servants.is_empty() {
            debug!(company = %company.name, removed = ?removed, "nothing to relocate");
            return Ok(());
        }

        let target = company.relocation_target(removed)?;
        let material_plan = self.material_inventory().plan_relocation(materials, removed, &target)?;
        let servant_plan = self.servant_inventory().plan_relocation(servants, removed, &target)?;

        for transition in material_plan {
            self.material_inventory().commit(transition)?;
            *moved += 1;
        }
        for transition in servant_plan {
            self.servant_inventory().commit(transition)?;
            *moved += 1;
        }

        info!(company = %company.name, target = %target, items = *moved, "stock relocated");
        Ok(())
    }

    /// All materials in category / short description order.
    pub fn materials(&self) -> Result<Vec<Material>, ServiceError> {
        let mut materials = self.materials.find(&|_: &Material| true)?;
        sort_materials(&mut materials);
        Ok(materials)
    }

    pub fn material(&self, id: MaterialId) -> Result<Material, ServiceError> {
        self.materials
            .find_one(&by_id::<Material>(id))?
            .ok_or_else(|| DomainError::not_found(format!("Material {id} not found")).into())
    }

    pub fn create_material(&self, material: Material) -> Result<Material, ServiceError> {
        material.validate()?;
        self.ensure_sap_nr_free(&material.sap_nr, material.id)?;

        self.materials.insert_one(material.clone())?;
        info!(sap_nr = %material.sap_nr, "material created");
        Ok(material)
    }

    /// Insert or replace the material stored under `id`.
    pub fn update_material(&self, id: MaterialId, mut material: Material) -> Result<Material, ServiceError> {
        material.id = id;
        material.validate()?;
        self.ensure_sap_nr_free(&material.sap_nr, id)?;

        let current = self.materials.find_one(&by_id::<Material>(id))?;
        if let Some(current) = current.filter(|c| c.sap_nr != material.sap_nr) {
            let holds_inventory = self
                .material_inventory()
                .inventory_for_all()?
                .iter()
                .any(|i| *i.subject() == current.sap_nr);
            if holds_inventory {
                return Err(DomainError::validation(format!(
                    "SapNr {} has inventory and can not be changed",
                    current.sap_nr
                ))
                .into());
            }
        }

        self.materials
            .replace_one(&by_id::<Material>(id), material.clone(), ReplaceOptions::upsert())?;
        info!(sap_nr = %material.sap_nr, "material updated");
        Ok(material)
    }

    fn ensure_sap_nr_free(&self, sap_nr: &SapNr, id: MaterialId) -> Result<(), ServiceError> {
        if self.materials.find_one(&|m: &Material| m.sap_nr == *sap_nr && m.id != id)?.is_some() {
            return Err(DomainError::conflict("SapNr is already in use").into());
        }
        Ok(())
    }

    /// Delete a material together with its inventory in every company.
    pub fn delete_material(&self, id: MaterialId) -> Result<(), ServiceError> {
        let material = self.material(id)?;
        let removed = self.material_inventory().delete_for_subject(&material.sap_nr)?;
        self.materials.delete_one(&by_id::<Material>(id))?;
        info!(sap_nr = %material.sap_nr, items = removed, "material deleted");
        Ok(())
    }

    /// Grades in rank order.
    pub fn grades(&self) -> Vec<Grade> {
        sorted_grades(Grade::ALL)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use chrono::Utc;

    use dispo_core::AggregateRoot;
    use dispo_events::InMemoryEventJournal;
    use dispo_inventory::{Allocation, InventoryCommand, InventoryItem, Location, ReportUsed, ServantInventoryItem};

    use crate::config::DispositionConfig;
    use crate::document_store::{Collection, Filter, InMemoryCollection, ReplaceOutcome, StoreError};
    use crate::services::{Disposition, DispositionStores};

    use super::*;

    fn disposition() -> Disposition<Arc<InMemoryEventJournal>> {
        Disposition::new(
            DispositionStores::in_memory(),
            Arc::new(InMemoryEventJournal::new()),
            &DispositionConfig::default(),
        )
    }

    fn locations(names: &[&str]) -> Vec<Location> {
        names.iter().map(|n| Location::at(*n)).collect()
    }

    #[test]
    fn created_company_always_has_the_rear_location() {
        let dispo = disposition();

        let company = dispo.create_company(Company::new("Stab", locations(&["Bern"]))).unwrap();

        assert_eq!(company.location_names(), ["KP Rw", "Bern"]);
        assert_eq!(company.default_location.name, "Bern");
    }

    #[test]
    fn company_names_are_unique() {
        let dispo = disposition();
        dispo.create_company(Company::new("Stab", locations(&["KP Rw"]))).unwrap();

        let err = dispo.create_company(Company::new("Stab", locations(&["KP Rw"]))).unwrap_err();

        assert!(err.is_conflict());
    }

    #[test]
    fn companies_are_listed_in_company_order() {
        let dispo = disposition();
        for name in ["Ristl Kp 17/2", "Bat", "Stab", "Ristl Kp 17/1"] {
            dispo.create_company(Company::new(name, locations(&["KP Rw"]))).unwrap();
        }

        assert_eq!(dispo.company_names().unwrap(), ["Stab", "Ristl Kp 17/1", "Ristl Kp 17/2", "Bat"]);
    }

    #[test]
    fn removing_a_location_moves_stock_to_the_front() {
        let dispo = disposition();
        let company = dispo
            .create_company(Company::new("Stab", locations(&["KP Rw", "KP Front", "Bern"])))
            .unwrap();
        dispo
            .material_inventory()
            .distribute(
                SapNr::new("1"),
                "Stab",
                vec![Allocation::at("KP Front", 1, 0, 0), Allocation::at("Bern", 4, 2, 1)],
            )
            .unwrap();

        let mut updated = company.clone();
        updated.locations.retain(|l| l.name != "Bern");
        dispo.update_company(updated).unwrap();

        let item = dispo.material_inventory().inventory_item(&SapNr::new("1"), "Stab").unwrap().unwrap();
        assert_eq!(item.distribution(), [Allocation::at("KP Front", 5, 2, 1)]);
        assert_eq!(dispo.company(company.id).unwrap().location_names(), ["KP Rw", "KP Front"]);
    }

    #[test]
    fn missing_target_allocation_aborts_every_write() {
        let dispo = disposition();
        let company = dispo
            .create_company(Company::new("Stab", locations(&["KP Rw", "Bern"])))
            .unwrap();
        dispo
            .servant_inventory()
            .distribute(Grade::Ncos, "Stab", vec![Allocation::at("KP Rw", 1, 0, 0), Allocation::at("Bern", 1, 0, 0)])
            .unwrap();
        dispo
            .material_inventory()
            .distribute(SapNr::new("1"), "Stab", vec![Allocation::at("Bern", 2, 0, 0)])
            .unwrap();

        let err = dispo
            .move_stock_to_default_location(company.id, &["Bern".to_string()])
            .unwrap_err();

        assert!(err.is_validation());
        let servants = dispo.servant_inventory().inventory_item(&Grade::Ncos, "Stab").unwrap().unwrap();
        assert_eq!(servants.distribution().len(), 2);
    }

    /// Servant collection where another writer changes the item right before
    /// the first conditional replace lands.
    struct RacedServants {
        inner: InMemoryCollection<ServantInventoryItem>,
        raced: AtomicBool,
    }

    impl Collection<ServantInventoryItem> for RacedServants {
        fn find(&self, filter: Filter<'_, ServantInventoryItem>) -> Result<Vec<ServantInventoryItem>, StoreError> {
            self.inner.find(filter)
        }

        fn find_one(&self, filter: Filter<'_, ServantInventoryItem>) -> Result<Option<ServantInventoryItem>, StoreError> {
            self.inner.find_one(filter)
        }

        fn insert_one(&self, doc: ServantInventoryItem) -> Result<(), StoreError> {
            self.inner.insert_one(doc)
        }

        fn insert_many(&self, docs: Vec<ServantInventoryItem>) -> Result<(), StoreError> {
            self.inner.insert_many(docs)
        }

        fn replace_one(
            &self,
            filter: Filter<'_, ServantInventoryItem>,
            doc: ServantInventoryItem,
            options: ReplaceOptions,
        ) -> Result<ReplaceOutcome, StoreError> {
            let conditional = options.expected_version != ExpectedVersion::Any;
            if conditional && !self.raced.load(Ordering::SeqCst) {
                if let Some(current) = self.inner.find_one(filter)? {
                    self.raced.store(true, Ordering::SeqCst);
                    let used = InventoryCommand::ReportUsed(ReportUsed {
                        location: "KP Rw".into(),
                        amount: 1,
                        occurred_at: Utc::now(),
                    });
                    let other = InventoryItem::execute(Some(current.clone()), current.key(), &used).unwrap().item;
                    self.inner.replace_one(filter, other, ReplaceOptions::upsert())?;
                }
            }
            self.inner.replace_one(filter, doc, options)
        }

        fn delete_one(&self, filter: Filter<'_, ServantInventoryItem>) -> Result<usize, StoreError> {
            self.inner.delete_one(filter)
        }

        fn delete_many(&self, filter: Filter<'_, ServantInventoryItem>) -> Result<usize, StoreError> {
            self.inner.delete_many(filter)
        }
    }

    #[test]
    fn relocation_replans_after_losing_a_race() {
        let servants = Arc::new(RacedServants {
            inner: InMemoryCollection::new(),
            raced: AtomicBool::new(false),
        });
        let stores = DispositionStores {
            servant_inventory: servants.clone(),
            ..DispositionStores::in_memory()
        };
        let config = DispositionConfig {
            optimistic_concurrency: true,
            ..DispositionConfig::default()
        };
        let dispo = Disposition::new(stores, Arc::new(InMemoryEventJournal::new()), &config);
        let company = dispo
            .create_company(Company::new("Stab", locations(&["KP Rw", "Bern"])))
            .unwrap();
        dispo
            .servant_inventory()
            .distribute(Grade::Ncos, "Stab", vec![Allocation::at("KP Rw", 1, 0, 0), Allocation::at("Bern", 2, 0, 0)])
            .unwrap();

        let moved = dispo
            .move_stock_to_default_location(company.id, &["Bern".to_string()])
            .unwrap();

        assert_eq!(moved, 1);
        assert!(servants.raced.load(Ordering::SeqCst));
        let item = dispo.servant_inventory().inventory_item(&Grade::Ncos, "Stab").unwrap().unwrap();
        assert_eq!(item.distribution(), [Allocation::at("KP Rw", 3, 1, 0)]);
        assert_eq!(item.version(), 3);
    }

    #[test]
    fn unknown_company_is_not_found() {
        let dispo = disposition();
        let err = dispo.move_stock_to_default_location(CompanyId::new(), &[]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn renaming_a_company_with_inventory_is_rejected() {
        let dispo = disposition();
        let company = dispo.create_company(Company::new("Stab", locations(&["KP Rw"]))).unwrap();
        dispo
            .servant_inventory()
            .distribute(Grade::Officers, "Stab", vec![Allocation::at("KP Rw", 2, 0, 0)])
            .unwrap();

        let mut renamed = company;
        renamed.name = "Stabskp".into();

        assert!(dispo.update_company(renamed).unwrap_err().is_validation());
    }

    #[test]
    fn deleting_a_company_removes_its_inventory() {
        let dispo = disposition();
        let stab = dispo.create_company(Company::new("Stab", locations(&["KP Rw"]))).unwrap();
        dispo.create_company(Company::new("Ristl Kp 17/1", locations(&["KP Rw"]))).unwrap();
        for company in ["Stab", "Ristl Kp 17/1"] {
            dispo
                .material_inventory()
                .distribute(SapNr::new("1"), company, vec![Allocation::at("KP Rw", 1, 0, 0)])
                .unwrap();
            dispo
                .servant_inventory()
                .distribute(Grade::Ncos, company, vec![Allocation::at("KP Rw", 1, 0, 0)])
                .unwrap();
        }

        dispo.delete_company(stab.id).unwrap();

        assert!(dispo.material_inventory().inventory_for_company("Stab").unwrap().is_empty());
        assert!(dispo.servant_inventory().inventory_for_company("Stab").unwrap().is_empty());
        assert_eq!(dispo.material_inventory().inventory_for_all().unwrap().len(), 1);
        assert_eq!(dispo.company_names().unwrap(), ["Ristl Kp 17/1"]);
    }

    #[test]
    fn sap_numbers_are_unique() {
        let dispo = disposition();
        dispo.create_material(Material::new("256.156", "Funk", "SE-235", "")).unwrap();

        let err = dispo.create_material(Material::new("256.156", "Funk", "SE-240", "")).unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.reason(), Some("SapNr is already in use"));
    }

    #[test]
    fn update_material_upserts_by_id() {
        let dispo = disposition();
        let material = Material::new("1", "Funk", "SE-235", "");
        let id = material.id;

        dispo.update_material(id, material.clone()).unwrap();
        let mut renamed = material;
        renamed.short_description = "SE-235 neu".into();
        dispo.update_material(id, renamed).unwrap();

        let stored = dispo.materials().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].short_description, "SE-235 neu");
    }

    #[test]
    fn deleting_a_material_removes_its_inventory_everywhere() {
        let dispo = disposition();
        let radio = dispo.create_material(Material::new("1", "Funk", "SE-235", "")).unwrap();
        for company in ["Stab", "Ristl Kp 17/1"] {
            dispo
                .material_inventory()
                .distribute(SapNr::new("1"), company, vec![Allocation::at("KP Rw", 1, 0, 0)])
                .unwrap();
        }
        dispo
            .material_inventory()
            .distribute(SapNr::new("2"), "Stab", vec![Allocation::at("KP Rw", 1, 0, 0)])
            .unwrap();

        dispo.delete_material(radio.id).unwrap();

        let remaining = dispo.material_inventory().inventory_for_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].subject().as_str(), "2");
        assert!(dispo.material(radio.id).unwrap_err().is_not_found());
    }
}
