//! Blank company template: the labels an import expects, no numbers.

use dispo_inventory::ordering::sort_company_locations;

use crate::layout::{
    AVAILABLE_COLUMN, CATEGORY_COLUMN, LABEL_COLUMN, MATERIAL_COLUMN_HEADERS,
    SERVANT_COLUMN_HEADERS, SERVANT_HEADER_ROW, SERVANT_TITLE_ROW, STOCK_COLUMN, TITLE_ROW,
    TOTAL_LABEL, TOTAL_SHEET,
};
use crate::validator::ImportCatalog;
use crate::workbook::{InMemoryWorkbook, InMemoryWorksheet};

/// One sheet per company location plus the aggregated "Total" sheet.
pub fn company_template(catalog: &ImportCatalog) -> InMemoryWorkbook {
    let company = catalog.company();
    let mut book = InMemoryWorkbook::new(Some(company.name.clone()));

    let mut locations = company.location_names();
    sort_company_locations(&mut locations);

    for location in &locations {
        let title = if *location == company.default_location.name {
            format!("Dispoliste {}, {}", company.name, location)
        } else {
            format!("Dispoliste {}, Standort {}", company.name, location)
        };
        fill_sheet(book.add_sheet(location.clone()), &title, catalog);
    }

    let title = format!("Dispoliste {}, {}", company.name, TOTAL_SHEET);
    fill_sheet(book.add_sheet(TOTAL_SHEET), &title, catalog);
    book
}

fn fill_sheet(sheet: &mut InMemoryWorksheet, title: &str, catalog: &ImportCatalog) {
    let layout = catalog.layout();

    sheet.set(TITLE_ROW, CATEGORY_COLUMN, title);
    sheet.set(SERVANT_TITLE_ROW, CATEGORY_COLUMN, "Personal");
    write_headers(sheet, SERVANT_HEADER_ROW, &SERVANT_COLUMN_HEADERS);

    for (grade, row) in catalog.grades().iter().zip(&layout.grade_rows) {
        sheet.set(*row, LABEL_COLUMN, grade.description());
    }
    sheet.set(layout.total_row, LABEL_COLUMN, TOTAL_LABEL);

    sheet.set(layout.material_title_row(), CATEGORY_COLUMN, "Material");
    write_headers(sheet, layout.material_header_row(), &MATERIAL_COLUMN_HEADERS);

    for (material, position) in catalog.materials().iter().zip(&layout.material_rows) {
        if let Some(row) = position.category_row {
            sheet.set(row, CATEGORY_COLUMN, material.category.as_str());
        }
        sheet.set(position.row, LABEL_COLUMN, material.short_description.as_str());
    }
}

fn write_headers(sheet: &mut InMemoryWorksheet, row: u32, headers: &[&str]) {
    for (column, header) in (STOCK_COLUMN..=AVAILABLE_COLUMN).zip(headers) {
        sheet.set(row, column, *header);
    }
}
