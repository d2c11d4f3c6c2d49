//! Service wiring: the collections and the inventory services built on them.

use std::sync::Arc;

use dispo_events::EventJournal;
use dispo_inventory::{Company, Material, MaterialInventoryItem, ServantInventoryItem};
use dispo_reporting::DispositionReport;

use crate::config::DispositionConfig;
use crate::document_store::{Collection, InMemoryCollection};
use crate::inventory_service::{MaterialInventoryService, ServantInventoryService};

pub type SharedCollection<D> = Arc<dyn Collection<D>>;

/// All document collections of the disposition system.
#[derive(Clone)]
pub struct DispositionStores {
    pub companies: SharedCollection<Company>,
    pub materials: SharedCollection<Material>,
    pub material_inventory: SharedCollection<MaterialInventoryItem>,
    pub servant_inventory: SharedCollection<ServantInventoryItem>,
    pub reports: SharedCollection<DispositionReport>,
}

impl DispositionStores {
    pub fn in_memory() -> Self {
        Self {
            companies: Arc::new(InMemoryCollection::<Company>::new()),
            materials: Arc::new(InMemoryCollection::<Material>::new()),
            material_inventory: Arc::new(InMemoryCollection::<MaterialInventoryItem>::new()),
            servant_inventory: Arc::new(InMemoryCollection::<ServantInventoryItem>::new()),
            reports: Arc::new(InMemoryCollection::<DispositionReport>::new()),
        }
    }
}

/// Entry point for every disposition operation.
///
/// Reference data, imports and reports are implemented in their own modules
/// as `impl` blocks on this type.
pub struct Disposition<J> {
    pub(crate) companies: SharedCollection<Company>,
    pub(crate) materials: SharedCollection<Material>,
    pub(crate) reports: SharedCollection<DispositionReport>,
    material_inventory: MaterialInventoryService<SharedCollection<MaterialInventoryItem>, J>,
    servant_inventory: ServantInventoryService<SharedCollection<ServantInventoryItem>, J>,
}

impl<J> Disposition<J>
where
    J: EventJournal + Clone,
{
    pub fn new(stores: DispositionStores, journal: J, config: &DispositionConfig) -> Self {
        Self {
            material_inventory: MaterialInventoryService::new(
                stores.material_inventory,
                journal.clone(),
                config.clone(),
            ),
            servant_inventory: ServantInventoryService::new(stores.servant_inventory, journal, config.clone()),
            companies: stores.companies,
            materials: stores.materials,
            reports: stores.reports,
        }
    }
}

impl<J: EventJournal> Disposition<J> {
    pub fn material_inventory(&self) -> &MaterialInventoryService<SharedCollection<MaterialInventoryItem>, J> {
        &self.material_inventory
    }

    pub fn servant_inventory(&self) -> &ServantInventoryService<SharedCollection<ServantInventoryItem>, J> {
        &self.servant_inventory
    }
}
