//! Spreadsheet import for company inventory.
//!
//! A company fills in one worksheet per location of a generated template.
//! This crate validates such a workbook against the expected layout and
//! extracts one distribution per grade and per material.

pub mod error;
pub mod layout;
pub mod template;
pub mod validator;
pub mod workbook;

pub use error::ImportErrors;
pub use layout::SheetLayout;
pub use template::company_template;
pub use validator::{Extraction, ImportCatalog, extract_company_inventory, validate_workbook};
pub use workbook::{CellValue, InMemoryWorkbook, InMemoryWorksheet, Workbook, Worksheet};
