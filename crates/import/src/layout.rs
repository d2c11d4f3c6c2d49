//! Cell positions of the company inventory template.

use dispo_inventory::{Grade, Material};

/// Aggregated sheet, ignored on import.
pub const TOTAL_SHEET: &str = "Total";
/// Label of the row following the grade list.
pub const TOTAL_LABEL: &str = "Total";

pub const TITLE_ROW: u32 = 1;
pub const SERVANT_TITLE_ROW: u32 = 3;
pub const SERVANT_HEADER_ROW: u32 = 4;
pub const FIRST_GRADE_ROW: u32 = 5;

pub const CATEGORY_COLUMN: u32 = 1;
pub const LABEL_COLUMN: u32 = 2;
pub const STOCK_COLUMN: u32 = 4;
pub const USED_COLUMN: u32 = 5;
pub const DAMAGED_COLUMN: u32 = 6;
pub const AVAILABLE_COLUMN: u32 = 7;

/// Columns carrying stock, used and damaged/detached counts.
pub const INPUT_COLUMNS: [u32; 3] = [STOCK_COLUMN, USED_COLUMN, DAMAGED_COLUMN];

/// Rows between the servant total row and the first material row block.
const MATERIAL_SECTION_OFFSET: u32 = 4;

pub const SERVANT_COLUMN_HEADERS: [&str; 4] = ["Bestand", "Eingesetzt", "Detachiert", "Verfügbar"];
pub const MATERIAL_COLUMN_HEADERS: [&str; 4] = ["Bestand", "Eingesetzt", "Defekt", "Verfügbar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialRow {
    /// Row of the category header preceding this material, if it opens a category.
    pub category_row: Option<u32>,
    pub row: u32,
}

/// Row positions for a given (sorted) grade and material list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub grade_rows: Vec<u32>,
    pub total_row: u32,
    pub material_rows: Vec<MaterialRow>,
}

impl SheetLayout {
    pub fn new(grades: &[Grade], materials: &[Material]) -> Self {
        let grade_rows: Vec<u32> = (0..grades.len() as u32).map(|i| FIRST_GRADE_ROW + i).collect();
        let total_row = FIRST_GRADE_ROW + grades.len() as u32;

        let mut row = total_row + MATERIAL_SECTION_OFFSET;
        let mut material_rows = Vec::with_capacity(materials.len());
        for (i, material) in materials.iter().enumerate() {
            let opens_category = i == 0 || materials[i - 1].category != material.category;
            let category_row = if opens_category {
                row += 1;
                Some(row - 1)
            } else {
                None
            };
            material_rows.push(MaterialRow { category_row, row });
            row += 1;
        }

        Self {
            grade_rows,
            total_row,
            material_rows,
        }
    }

    pub fn material_title_row(&self) -> u32 {
        self.total_row + 2
    }

    pub fn material_header_row(&self) -> u32 {
        self.total_row + 3
    }
}
