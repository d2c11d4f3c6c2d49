//! Validation and extraction of a filled-in company template.
//!
//! Validation is exhaustive: every failed check adds an entry to the error
//! map and the walk continues. Extraction only runs on a clean workbook.

use dispo_inventory::ordering::{sort_materials, sorted_grades};
use dispo_inventory::{Allocation, Company, Grade, Material};

use crate::error::ImportErrors;
use crate::layout::{
    CATEGORY_COLUMN, DAMAGED_COLUMN, INPUT_COLUMNS, LABEL_COLUMN, STOCK_COLUMN, SheetLayout,
    TOTAL_LABEL, TOTAL_SHEET, USED_COLUMN,
};
use crate::workbook::{CellValue, Workbook, Worksheet};

/// Reference data an import is checked against, in template order.
#[derive(Debug, Clone)]
pub struct ImportCatalog {
    company: Company,
    grades: Vec<Grade>,
    materials: Vec<Material>,
    layout: SheetLayout,
}

impl ImportCatalog {
    pub fn new(company: Company, grades: impl IntoIterator<Item = Grade>, mut materials: Vec<Material>) -> Self {
        let grades = sorted_grades(grades);
        sort_materials(&mut materials);
        let layout = SheetLayout::new(&grades, &materials);
        Self {
            company,
            grades,
            materials,
            layout,
        }
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }
}

/// Distributions read from a workbook, one per grade and per material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub errors: ImportErrors,
    pub servants: Vec<(Grade, Vec<Allocation>)>,
    pub materials: Vec<(Material, Vec<Allocation>)>,
}

impl Extraction {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn location_sheets<W: Workbook>(workbook: &W) -> Vec<&W::Sheet> {
    workbook
        .worksheets()
        .into_iter()
        .filter(|sheet| sheet.name() != TOTAL_SHEET)
        .collect()
}

pub fn validate_workbook<W: Workbook>(workbook: &W, catalog: &ImportCatalog) -> ImportErrors {
    let mut errors = ImportErrors::new();
    let company = &catalog.company;

    if workbook.company() != Some(company.name.as_str()) {
        errors.insert(
            "Workbook validation",
            "Workbook company property is not equal to current company (i.e. wrong template for upload selected)",
        );
    }

    let sheets = location_sheets(workbook);
    if sheets.len() != company.locations.len() {
        errors.insert(
            "Location validation",
            "There is not the same number of locations within the excel file as they were found on the server",
        );
    }

    for sheet in sheets {
        let name = sheet.name();

        if !company.has_location(name) {
            errors.insert(
                format!("Location validation - {name}"),
                format!("Location validation: location {name} not found on the server"),
            );
        }
        if !servant_list_is_valid(sheet, catalog) {
            errors.insert(
                format!("Servant list validation - {name}"),
                format!("Worksheet with name {name} does not contain a valid servant list"),
            );
        }
        if !servant_inputs_are_valid(sheet, catalog) {
            errors.insert(
                format!("Servant input section validation - {name}"),
                format!("Not all servant section inputs within worksheet {name} are positive integers"),
            );
        }
        if !material_list_is_valid(sheet, catalog) {
            errors.insert(
                format!("Material list validation - {name}"),
                format!("Worksheet with name {name} does not contain a valid material list"),
            );
        }
        if !material_inputs_are_valid(sheet, catalog) {
            errors.insert(
                format!("Material input section validation - {name}"),
                format!("Not all material section inputs within worksheet {name} are positive integers"),
            );
        }
    }

    errors
}

/// Validates, then reads every location sheet into per-subject distributions.
///
/// On validation failure the distributions are empty.
pub fn extract_company_inventory<W: Workbook>(workbook: &W, catalog: &ImportCatalog) -> Extraction {
    let errors = validate_workbook(workbook, catalog);
    if !errors.is_empty() {
        return Extraction {
            errors,
            ..Extraction::default()
        };
    }

    let mut servants: Vec<(Grade, Vec<Allocation>)> =
        catalog.grades.iter().map(|g| (*g, Vec::new())).collect();
    let mut materials: Vec<(Material, Vec<Allocation>)> =
        catalog.materials.iter().map(|m| (m.clone(), Vec::new())).collect();

    for sheet in location_sheets(workbook) {
        for (i, row) in catalog.layout.grade_rows.iter().enumerate() {
            servants[i].1.push(read_allocation(sheet, *row));
        }
        for (i, material_row) in catalog.layout.material_rows.iter().enumerate() {
            materials[i].1.push(read_allocation(sheet, material_row.row));
        }
    }

    Extraction {
        errors,
        servants,
        materials,
    }
}

fn read_allocation<S: Worksheet>(sheet: &S, row: u32) -> Allocation {
    let count = |column| sheet.cell(row, column).as_integer().map_or(0, i64::from);
    Allocation::at(
        sheet.name(),
        count(STOCK_COLUMN),
        count(USED_COLUMN),
        count(DAMAGED_COLUMN),
    )
}

fn label_is<S: Worksheet>(sheet: &S, row: u32, column: u32, expected: &str) -> bool {
    sheet.cell(row, column).display().as_deref() == Some(expected)
}

fn input_is_valid(value: CellValue) -> bool {
    value.is_empty() || value.as_integer().is_some_and(|n| n >= 0)
}

fn row_inputs_are_valid<S: Worksheet>(sheet: &S, row: u32) -> bool {
    INPUT_COLUMNS
        .iter()
        .all(|column| input_is_valid(sheet.cell(row, *column)))
}

fn servant_list_is_valid<S: Worksheet>(sheet: &S, catalog: &ImportCatalog) -> bool {
    let layout = &catalog.layout;
    let grades_match = catalog
        .grades
        .iter()
        .zip(&layout.grade_rows)
        .all(|(grade, row)| label_is(sheet, *row, LABEL_COLUMN, grade.description()));
    grades_match && label_is(sheet, layout.total_row, LABEL_COLUMN, TOTAL_LABEL)
}

fn servant_inputs_are_valid<S: Worksheet>(sheet: &S, catalog: &ImportCatalog) -> bool {
    let layout = &catalog.layout;
    layout
        .grade_rows
        .iter()
        .chain(core::iter::once(&layout.total_row))
        .all(|row| row_inputs_are_valid(sheet, *row))
}

fn material_list_is_valid<S: Worksheet>(sheet: &S, catalog: &ImportCatalog) -> bool {
    catalog
        .materials
        .iter()
        .zip(&catalog.layout.material_rows)
        .all(|(material, position)| {
            let header_ok = position
                .category_row
                .is_none_or(|row| label_is(sheet, row, CATEGORY_COLUMN, &material.category));
            header_ok && label_is(sheet, position.row, LABEL_COLUMN, &material.short_description)
        })
}

fn material_inputs_are_valid<S: Worksheet>(sheet: &S, catalog: &ImportCatalog) -> bool {
    catalog
        .layout
        .material_rows
        .iter()
        .all(|position| row_inputs_are_valid(sheet, position.row))
}
