//! Battalion reporter: folds the current inventory into stored snapshots.

use chrono::{DateTime, Utc};
use tracing::info;

use dispo_core::{DomainError, ReportId};
use dispo_events::EventJournal;
use dispo_reporting::{DispositionReport, ReportInputs, ReportSummary, build_report};

use crate::document_store::by_id;
use crate::error::ServiceError;
use crate::services::Disposition;

impl<J: EventJournal> Disposition<J> {
    /// Snapshot every material and grade over all companies and store it.
    ///
    /// Reads only; inventory is never touched.
    pub fn generate_report(&self, report_date: DateTime<Utc>) -> Result<DispositionReport, ServiceError> {
        let company_names = self.company_names()?;
        let materials = self.materials()?;
        let grades = self.grades();
        let material_items = self.material_inventory().inventory_for_all()?;
        let servant_items = self.servant_inventory().inventory_for_all()?;

        let report = build_report(
            ReportId::new(),
            report_date,
            ReportInputs {
                company_names: &company_names,
                materials: &materials,
                grades: &grades,
                material_items: &material_items,
                servant_items: &servant_items,
            },
        );
        self.reports.insert_one(report.clone())?;

        info!(
            report = %report.id,
            companies = company_names.len(),
            materials = report.material_report_items.len(),
            "battalion report generated"
        );
        Ok(report)
    }

    /// Stored reports, newest first.
    pub fn reports(&self) -> Result<Vec<ReportSummary>, ServiceError> {
        let mut summaries: Vec<ReportSummary> = self
            .reports
            .find(&|_: &DispositionReport| true)?
            .iter()
            .map(DispositionReport::summary)
            .collect();
        summaries.sort_by(|a, b| b.report_date.cmp(&a.report_date));
        Ok(summaries)
    }

    pub fn report(&self, id: ReportId) -> Result<DispositionReport, ServiceError> {
        self.reports
            .find_one(&by_id::<DispositionReport>(id))?
            .ok_or_else(|| DomainError::not_found(format!("Report {id} not found")).into())
    }

    pub fn delete_report(&self, id: ReportId) -> Result<(), ServiceError> {
        if self.reports.delete_one(&by_id::<DispositionReport>(id))? == 0 {
            return Err(DomainError::not_found(format!("Report {id} not found")).into());
        }
        Ok(())
    }
}
