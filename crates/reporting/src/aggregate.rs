//! The battalion fold: per subject, one row per company, summed into totals.

use chrono::{DateTime, Utc};

use dispo_core::ReportId;
use dispo_inventory::ordering::{COMPANY_LOCATIONS, COMPANY_NAMES, sort_materials, sorted_grades};
use dispo_inventory::{
    Grade, InventoryItem, InventorySubject, Material, MaterialInventoryItem, ServantInventoryItem,
    SubjectKind, Totals,
};

use crate::report::{
    CompanyReportItem, DispositionReport, MaterialReportItem, ReportType, ServantReportItem,
};

/// Everything a report is folded from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub company_names: &'a [String],
    pub materials: &'a [Material],
    pub grades: &'a [Grade],
    pub material_items: &'a [MaterialInventoryItem],
    pub servant_items: &'a [ServantInventoryItem],
}

pub fn build_report(id: ReportId, report_date: DateTime<Utc>, inputs: ReportInputs<'_>) -> DispositionReport {
    DispositionReport {
        id,
        report_date,
        report_type: ReportType::MaterialLevelCompany,
        material_report_items: aggregate_materials(inputs.company_names, inputs.materials, inputs.material_items),
        servant_report_items: aggregate_servants(inputs.company_names, inputs.grades, inputs.servant_items),
    }
}

pub fn aggregate_materials(
    company_names: &[String],
    materials: &[Material],
    items: &[MaterialInventoryItem],
) -> Vec<MaterialReportItem> {
    let mut materials = materials.to_vec();
    sort_materials(&mut materials);

    materials
        .into_iter()
        .map(|material| {
            let per_company = per_company(&material.sap_nr, company_names, items);
            MaterialReportItem {
                totals: per_company.iter().map(|c| c.totals).sum(),
                per_company,
                material,
            }
        })
        .collect()
}

pub fn aggregate_servants(
    company_names: &[String],
    grades: &[Grade],
    items: &[ServantInventoryItem],
) -> Vec<ServantReportItem> {
    sorted_grades(grades.iter().copied())
        .into_iter()
        .map(|grade| {
            let per_company = per_company(&grade, company_names, items);
            ServantReportItem {
                grade,
                ideal: per_company.iter().filter_map(|c| c.ideal).sum(),
                totals: per_company.iter().map(|c| c.totals).sum(),
                per_company,
            }
        })
        .collect()
}

/// Rows for every company: actual holdings first, then a zero row for each
/// named company without any. At most one row per company name.
fn per_company<S: InventorySubject>(
    subject: &S,
    company_names: &[String],
    items: &[InventoryItem<S>],
) -> Vec<CompanyReportItem> {
    let mut rows: Vec<CompanyReportItem> = Vec::new();

    for item in items.iter().filter(|item| item.subject() == subject) {
        if rows.iter().any(|r| r.company == item.company()) {
            continue;
        }
        let mut per_location = item.distribution().to_vec();
        per_location.sort_by(|a, b| COMPANY_LOCATIONS.compare(&a.location, &b.location));
        rows.push(CompanyReportItem {
            company: item.company().to_string(),
            ideal: item.ideal(),
            totals: Totals::of(&per_location),
            per_location,
        });
    }

    let ideal = match S::KIND {
        SubjectKind::Servant => Some(0),
        SubjectKind::Material => None,
    };
    for name in company_names {
        if !rows.iter().any(|r| r.company == *name) {
            rows.push(CompanyReportItem::placeholder(name.clone(), ideal));
        }
    }

    rows.sort_by(|a, b| COMPANY_NAMES.compare(&a.company, &b.company));
    rows
}
