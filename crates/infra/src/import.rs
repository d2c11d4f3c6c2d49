//! Company inventory import from a filled-in template workbook.

use chrono::Utc;
use tracing::{info, warn};

use dispo_events::EventJournal;
use dispo_import::{ImportCatalog, InMemoryWorkbook, Workbook, company_template, extract_company_inventory};
use dispo_inventory::{Allocation, DistributeForCompany, InventoryCommand, InventoryKey};

use crate::error::ServiceError;
use crate::services::Disposition;

/// Number of distributions written by an import.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub servants: usize,
    pub materials: usize,
}

fn distribute(distribution: Vec<Allocation>) -> InventoryCommand {
    InventoryCommand::Distribute(DistributeForCompany {
        distribution,
        occurred_at: Utc::now(),
    })
}

impl<J: EventJournal> Disposition<J> {
    /// Company, grades and materials an import of `company_name` is checked against.
    pub fn import_catalog(&self, company_name: &str) -> Result<ImportCatalog, ServiceError> {
        let company = self.company_by_name(company_name)?;
        Ok(ImportCatalog::new(company, self.grades(), self.materials()?))
    }

    /// Blank distribution template for a company.
    pub fn company_template(&self, company_name: &str) -> Result<InMemoryWorkbook, ServiceError> {
        Ok(company_template(&self.import_catalog(company_name)?))
    }

    /// Validate `workbook` and distribute every grade and material it lists.
    ///
    /// Either all distributions are written or none: an invalid workbook or
    /// any rejected distribution fails before the first write.
    pub fn import_company_inventory<W: Workbook>(
        &self,
        company_name: &str,
        workbook: &W,
    ) -> Result<ImportSummary, ServiceError> {
        let catalog = self.import_catalog(company_name)?;
        let extraction = extract_company_inventory(workbook, &catalog);
        if !extraction.is_valid() {
            warn!(company = company_name, failed_checks = extraction.errors.len(), "workbook rejected");
            return Err(extraction.errors.into());
        }

        let company = catalog.company().name.as_str();
        let servant_plan = extraction
            .servants
            .into_iter()
            .map(|(grade, distribution)| {
                self.servant_inventory()
                    .plan(InventoryKey::new(grade, company), &distribute(distribution))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let material_plan = extraction
            .materials
            .into_iter()
            .map(|(material, distribution)| {
                self.material_inventory()
                    .plan(InventoryKey::new(material.sap_nr, company), &distribute(distribution))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let summary = ImportSummary {
            servants: servant_plan.len(),
            materials: material_plan.len(),
        };
        for transition in servant_plan {
            self.servant_inventory().commit(transition)?;
        }
        for transition in material_plan {
            self.material_inventory().commit(transition)?;
        }

        info!(company, servants = summary.servants, materials = summary.materials, "company inventory imported");
        Ok(summary)
    }
}
