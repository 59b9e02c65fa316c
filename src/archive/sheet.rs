use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use csv::Trim;

use crate::forms::bulk_upload::UploadFormatError;

/// Spreadsheet formats accepted inside the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Csv,
    Excel,
}

impl SheetKind {
    pub fn from_path(path: &str) -> Option<Self> {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Some(SheetKind::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Some(SheetKind::Excel)
        } else {
            None
        }
    }
}

/// A data row together with its 1-based line in the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Header and rows of the first sheet, every cell rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

pub fn read_sheet(kind: SheetKind, bytes: Vec<u8>) -> Result<SheetTable, UploadFormatError> {
    match kind {
        SheetKind::Csv => read_csv(&bytes),
        SheetKind::Excel => read_workbook(bytes),
    }
}

fn read_csv(bytes: &[u8]) -> Result<SheetTable, UploadFormatError> {
    let content = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content);

    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or(index + 2);
        rows.push(SheetRow {
            line,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(SheetTable { headers, rows })
}

fn read_workbook(bytes: Vec<u8>) -> Result<SheetTable, UploadFormatError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| UploadFormatError::Spreadsheet("workbook has no sheets".to_string()))??;

    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut rows_iter = range.rows();

    let headers = rows_iter
        .next()
        .map(|cells| cells.iter().map(cell_text).collect())
        .unwrap_or_default();

    let rows = rows_iter
        .enumerate()
        .map(|(index, cells)| SheetRow {
            line: first_line + index + 1,
            cells: cells.iter().map(cell_text).collect(),
        })
        .collect();

    Ok(SheetTable { headers, rows })
}

/// Render a cell the way it reads in a spreadsheet. Whole floats lose their
/// fractional part so that quantities typed as `15` come back as `15`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_extension() {
        assert_eq!(SheetKind::from_path("a/Products.CSV"), Some(SheetKind::Csv));
        assert_eq!(SheetKind::from_path("products.xlsx"), Some(SheetKind::Excel));
        assert_eq!(SheetKind::from_path("products.xls"), Some(SheetKind::Excel));
        assert_eq!(SheetKind::from_path("products.ods"), None);
    }

    #[test]
    fn csv_keeps_line_numbers_and_strips_bom() {
        let bytes = b"\xEF\xBB\xBFproduct_name,price\nMouse, 10 \n\nPad,5\n".to_vec();

        let table = read_sheet(SheetKind::Csv, bytes).expect("csv");

        assert_eq!(table.headers, vec!["product_name", "price"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[0].cells, vec!["Mouse", "10"]);
        assert_eq!(table.rows[1].line, 4);
    }

    #[test]
    fn float_cells_render_like_spreadsheet() {
        assert_eq!(cell_text(&Data::Float(15.0)), "15");
        assert_eq!(cell_text(&Data::Float(79.99)), "79.99");
        assert_eq!(cell_text(&Data::Int(3)), "3");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn garbage_workbook_is_a_format_error() {
        let result = read_sheet(SheetKind::Excel, b"not a workbook".to_vec());

        assert!(matches!(result, Err(UploadFormatError::Spreadsheet(_))));
    }
}
