//! Battalion disposition reports.
//!
//! Reports are immutable snapshots folded from the current inventory. The fold
//! is pure; persisting and listing reports is the infra layer's concern.

pub mod aggregate;
pub mod report;

pub use aggregate::{ReportInputs, aggregate_materials, aggregate_servants, build_report};
pub use report::{
    CompanyReportItem, DispositionReport, MaterialReportItem, ReportSummary, ReportType,
    ServantReportItem,
};
