//! Process wiring: logging, configuration, in-memory stores and sample data.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use dispo_events::{EventJournal, InMemoryEventJournal};
use dispo_inventory::{Company, Location, Material};

use crate::config::DispositionConfig;
use crate::services::{Disposition, DispositionStores};

pub const COMPANIES_SEED_FILE: &str = "companies.json";
pub const MATERIALS_SEED_FILE: &str = "materials.json";

pub type InMemoryDisposition = Disposition<Arc<InMemoryEventJournal>>;

pub struct Bootstrapped {
    pub disposition: InMemoryDisposition,
    pub journal: Arc<InMemoryEventJournal>,
    pub config: DispositionConfig,
}

#[derive(Debug, Deserialize)]
struct CompanySeed {
    name: String,
    #[serde(default)]
    locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MaterialSeed {
    sap_nr: String,
    category: String,
    short_description: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub companies: usize,
    pub materials: usize,
}

/// Initialize logging, read the environment and build the services.
pub fn bootstrap() -> anyhow::Result<Bootstrapped> {
    dispo_observability::init();
    bootstrap_with(DispositionConfig::from_env())
}

pub fn bootstrap_with(config: DispositionConfig) -> anyhow::Result<Bootstrapped> {
    let journal = Arc::new(InMemoryEventJournal::new());
    let disposition = Disposition::new(DispositionStores::in_memory(), journal.clone(), &config);

    if let Some(dir) = &config.seed_dir {
        let summary = seed(&disposition, dir)
            .with_context(|| format!("failed to seed sample data from {}", dir.display()))?;
        info!(companies = summary.companies, materials = summary.materials, "sample data loaded");
    }

    info!(
        optimistic_concurrency = config.optimistic_concurrency,
        strict_journal = config.strict_journal,
        "disposition services ready"
    );
    Ok(Bootstrapped {
        disposition,
        journal,
        config,
    })
}

/// Load sample companies and materials into empty collections.
///
/// Missing files are skipped; a collection that already holds documents is
/// left alone.
pub fn seed<J: EventJournal>(disposition: &Disposition<J>, dir: &Path) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let companies = read_seed::<CompanySeed>(&dir.join(COMPANIES_SEED_FILE))?.unwrap_or_default();
    if !companies.is_empty() && disposition.companies()?.is_empty() {
        for seed in companies {
            let locations = seed.locations.into_iter().map(Location::at).collect();
            disposition
                .create_company(Company::new(seed.name.clone(), locations))
                .with_context(|| format!("invalid sample company {}", seed.name))?;
            summary.companies += 1;
        }
    }

    let materials = read_seed::<MaterialSeed>(&dir.join(MATERIALS_SEED_FILE))?.unwrap_or_default();
    if !materials.is_empty() && disposition.materials()?.is_empty() {
        for seed in materials {
            let sap_nr = seed.sap_nr.clone();
            disposition
                .create_material(Material::new(
                    seed.sap_nr,
                    seed.category,
                    seed.short_description,
                    seed.description,
                ))
                .with_context(|| format!("invalid sample material {sap_nr}"))?;
            summary.materials += 1;
        }
    }

    Ok(summary)
}

fn read_seed<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let records = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(records))
}
