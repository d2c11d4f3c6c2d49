//! Minimal workbook abstraction: named sheets of 1-based cells.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Cell content as shown to a user; `None` for empty cells.
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) => Some(text.clone()),
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(format!("{}", *n as i64)),
            CellValue::Number(n) => Some(n.to_string()),
        }
    }

    /// Whole number content in the spreadsheet integer range, tolerating
    /// surrounding whitespace in text cells.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) => text.trim().parse().ok(),
            CellValue::Number(n)
                if n.is_finite()
                    && n.fract() == 0.0
                    && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(n) =>
            {
                Some(*n as i32)
            }
            CellValue::Number(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

pub trait Worksheet {
    fn name(&self) -> &str;

    /// Cell at 1-based `(row, column)`; empty when never written.
    fn cell(&self, row: u32, column: u32) -> CellValue;
}

pub trait Workbook {
    type Sheet: Worksheet;

    /// The workbook "company" document property.
    fn company(&self) -> Option<&str>;

    fn worksheets(&self) -> Vec<&Self::Sheet>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryWorksheet {
    name: String,
    cells: HashMap<(u32, u32), CellValue>,
}

impl InMemoryWorksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: HashMap::new(),
        }
    }

    pub fn set(&mut self, row: u32, column: u32, value: impl Into<CellValue>) {
        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(row, column));
        } else {
            self.cells.insert((row, column), value);
        }
    }
}

impl Worksheet for InMemoryWorksheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell(&self, row: u32, column: u32) -> CellValue {
        self.cells.get(&(row, column)).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryWorkbook {
    company: Option<String>,
    sheets: Vec<InMemoryWorksheet>,
}

impl InMemoryWorkbook {
    pub fn new(company: Option<String>) -> Self {
        Self {
            company,
            sheets: Vec::new(),
        }
    }

    pub fn set_company(&mut self, company: Option<String>) {
        self.company = company;
    }

    /// Appends a sheet and returns it for filling in.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut InMemoryWorksheet {
        self.sheets.push(InMemoryWorksheet::new(name));
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut InMemoryWorksheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn remove_sheet(&mut self, name: &str) {
        self.sheets.retain(|s| s.name != name);
    }
}

impl Workbook for InMemoryWorkbook {
    type Sheet = InMemoryWorksheet;

    fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    fn worksheets(&self) -> Vec<&InMemoryWorksheet> {
        self.sheets.iter().collect()
    }
}
