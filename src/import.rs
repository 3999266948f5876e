//! Bulk disease import from CSV or XLSX uploads.
//!
//! The first row is a header and is skipped. Data rows use the column order
//! `name, class_name, type, description, solution, image_links, plant_name`,
//! where `image_links` is a comma-separated list. Each row is imported on its
//! own: a failing row is reported with its 1-based sheet row number and the
//! rest of the file is still processed.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use sqlx::SqlitePool;

use crate::error::{is_unique_violation, AppResult};
use crate::models::disease::{CreateDiseaseRequest, Disease, ImportReport, ImportRowError};
use crate::store;
use crate::validation;

pub const IMPORT_COLUMNS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
}

impl ImportFormat {
    /// Picks the format from the upload's file name, case-insensitively.
    pub fn from_filename(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        if lower.ends_with(".csv") {
            Some(ImportFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(ImportFormat::Xlsx)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImportFormat::Csv => "CSV",
            ImportFormat::Xlsx => "Excel",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Only .xlsx and .csv files are supported")]
    UnsupportedFormat,
    #[error("Failed to read CSV file: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read Excel file: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("Failed to read Excel file: workbook has no worksheets")]
    NoWorksheet,
    #[error("{0} file must have at least 2 rows (header + data)")]
    TooFewRows(&'static str),
}

impl From<ImportError> for crate::error::AppError {
    fn from(err: ImportError) -> Self {
        crate::error::AppError::BadRequest(err.to_string())
    }
}

/// Reads every row of the upload as trimmed strings, header included.
pub fn read_rows(format: ImportFormat, bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
    let rows = match format {
        ImportFormat::Csv => read_csv(bytes)?,
        ImportFormat::Xlsx => read_xlsx(bytes)?,
    };
    if rows.len() < 2 {
        return Err(ImportError::TooFewRows(format.label()));
    }
    Ok(rows)
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(bytes));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_xlsx(bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook.worksheet_range_at(0).ok_or(ImportError::NoWorksheet)??;
    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .collect())
}

/// Splits the `image_links` cell on commas, dropping blanks.
pub fn split_links(cell: &str) -> Vec<String> {
    cell.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Maps one data row to a create request, or the message reported for that row.
pub fn parse_row(cells: &[String]) -> Result<CreateDiseaseRequest, String> {
    if cells.len() < IMPORT_COLUMNS {
        return Err(format!("Row must have at least {} columns", IMPORT_COLUMNS));
    }
    let cell = |i: usize| cells[i].trim().to_string();
    let req = CreateDiseaseRequest {
        name: cell(0),
        class_name: cell(1),
        disease_type: cell(2),
        description: cell(3),
        solution: cell(4),
        image_link: split_links(&cells[5]),
        plant_name: cell(6),
    };
    if req.name.is_empty() {
        return Err("Name is required".to_string());
    }
    if req.class_name.is_empty() {
        return Err("Class name is required".to_string());
    }
    if req.disease_type.is_empty() {
        return Err("Type is required".to_string());
    }
    validation::create_disease(&req).map_err(|e| e.0)?;
    Ok(req)
}

/// Sheet row number of the data row at `index` (header is row 1).
pub fn sheet_row(index: usize) -> usize {
    index + 2
}

/// Imports the data rows (header excluded) one by one.
pub async fn import_rows(pool: &SqlitePool, data_rows: &[Vec<String>]) -> AppResult<ImportReport> {
    let mut errors = Vec::new();
    let mut created: Vec<Disease> = Vec::new();

    for (index, cells) in data_rows.iter().enumerate() {
        let row = sheet_row(index);
        let req = match parse_row(cells) {
            Ok(req) => req,
            Err(error) => {
                errors.push(ImportRowError { row, error });
                continue;
            }
        };

        if store::disease::find_by_class_name(pool, &req.class_name).await?.is_some() {
            errors.push(ImportRowError { row, error: "Disease with this class name already exists".to_string() });
            continue;
        }

        match store::disease::insert(pool, req).await {
            Ok(disease) => created.push(disease),
            Err(e) => {
                if !is_unique_violation(&e) {
                    tracing::warn!(row, "Disease import row failed: {}", e);
                }
                errors.push(ImportRowError { row, error: format!("Failed to create disease: {}", e) });
            }
        }
    }

    Ok(ImportReport {
        total_rows: data_rows.len(),
        success_count: created.len(),
        error_count: errors.len(),
        errors,
        created_diseases: created,
    })
}
