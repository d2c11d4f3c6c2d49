use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dispo_core::{Entity, ReportId};
use dispo_inventory::{Allocation, Grade, Material, Totals};

/// Level of a stored report. Only company-level reports are generated;
/// `MaterialLevelBataillon` is kept so stored documents carrying it still load.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    MaterialLevelCompany,
    MaterialLevelBataillon,
}

/// One company's holdings of a material or grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyReportItem {
    pub company: String,
    /// Target headcount; servant reports only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal: Option<i64>,
    pub totals: Totals,
    pub per_location: Vec<Allocation>,
}

impl CompanyReportItem {
    /// Zero row for a company without inventory of the subject.
    pub fn placeholder(company: impl Into<String>, ideal: Option<i64>) -> Self {
        Self {
            company: company.into(),
            ideal,
            totals: Totals::default(),
            per_location: Vec::new(),
        }
    }

    pub fn available(&self) -> i64 {
        self.totals.available()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialReportItem {
    pub material: Material,
    pub totals: Totals,
    pub per_company: Vec<CompanyReportItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServantReportItem {
    pub grade: Grade,
    pub ideal: i64,
    pub totals: Totals,
    pub per_company: Vec<CompanyReportItem>,
}

/// Snapshot of the battalion inventory at `report_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispositionReport {
    pub id: ReportId,
    pub report_date: DateTime<Utc>,
    pub report_type: ReportType,
    pub material_report_items: Vec<MaterialReportItem>,
    pub servant_report_items: Vec<ServantReportItem>,
}

impl DispositionReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id,
            report_date: self.report_date,
            report_type: self.report_type,
        }
    }
}

impl Entity for DispositionReport {
    type Id = ReportId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Listing entry for stored reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: ReportId,
    pub report_date: DateTime<Utc>,
    pub report_type: ReportType,
}
