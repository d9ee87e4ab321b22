use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use serde_json::Value;

use crate::error::{UploadError, UploadResult};
use crate::record::{InventoryRecord, RawRow};

/// The tabular formats an upload can be parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    /// Detect the format from a file name's extension (case-insensitive).
    pub fn detect(file_name: &str) -> UploadResult<Self> {
        let extension = extension_of(file_name);
        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xlsx" => Ok(FileKind::Xlsx),
            "xls" => Ok(FileKind::Xls),
            _ => Err(UploadError::UnsupportedFileType { extension }),
        }
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// Parse an uploaded file into raw rows.
///
/// The format is chosen by extension. CSV and spreadsheet files both need a
/// header row; only the first sheet of a workbook is read.
///
/// # Examples
/// ```
/// use inventory_dashboard::loader::load_upload;
///
/// let rows = load_upload("sales.csv", b"ItemName,Quantity\nApple,3\n").unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0]["ItemName"], "Apple");
/// ```
pub fn load_upload(file_name: &str, bytes: &[u8]) -> UploadResult<Vec<RawRow>> {
    match FileKind::detect(file_name)? {
        FileKind::Csv => from_csv(bytes),
        FileKind::Xlsx => from_excel::<Xlsx<Cursor<Vec<u8>>>>(bytes),
        FileKind::Xls => from_excel::<Xls<Cursor<Vec<u8>>>>(bytes),
    }
}

/// Read CSV rows. Blank lines are skipped and short rows are padded with
/// empty strings so every row carries every header.
///
/// # Arguments
/// * `reader` - Any source of CSV text with a header row
///
/// # Returns
/// * `UploadResult<Vec<RawRow>>` - One map per data row, keyed by trimmed header
pub fn from_csv<R: Read>(reader: R) -> UploadResult<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| UploadError::ParseFailure(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| {
            UploadError::ParseFailure(format!("CSV parse error at line {}: {}", line_num + 2, e))
        })?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let mut row = RawRow::new();
        for (c, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = record.get(c).unwrap_or("");
            row.insert(header.to_string(), Value::String(value.to_string()));
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Read the first worksheet of an Excel workbook held in memory.
pub fn from_excel<W>(bytes: &[u8]) -> UploadResult<Vec<RawRow>>
where
    W: Reader<Cursor<Vec<u8>>>,
    W::Error: std::fmt::Display,
{
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = W::new(cursor).map_err(parse_failure)?;
    first_sheet_rows(&mut workbook)
}

fn first_sheet_rows<RS, W>(workbook: &mut W) -> UploadResult<Vec<RawRow>>
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: std::fmt::Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| UploadError::ParseFailure("No sheets found in Excel file".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(parse_failure)?;

    Ok(range_to_rows(&range))
}

fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    for sheet_row in sheet_rows {
        if sheet_row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let mut row = RawRow::new();
        for (c, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = sheet_row
                .get(c)
                .map(cell_to_value)
                .unwrap_or_else(|| Value::String(String::new()));
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }
    rows
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::from(*i),
        // Whole floats (the common case for quantities) stay integral.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(*f as i64),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        Data::String(s) => Value::String(s.trim().to_string()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Empty => Value::String(String::new()),
        other => Value::String(other.to_string()),
    }
}

fn parse_failure(e: impl std::fmt::Display) -> UploadError {
    UploadError::ParseFailure(e.to_string())
}

/// Seed an inventory collection from a CSV or Excel file on disk.
///
/// Rows without an item name are skipped.
///
/// # Arguments
/// * `path` - A `.csv`, `.xlsx` or `.xls` file with inventory headers
///
/// # Returns
/// * `UploadResult<Vec<InventoryRecord>>` - The records, in file order
///
/// # Examples
/// ```no_run
/// use inventory_dashboard::loader::load_inventory_file;
///
/// match load_inventory_file("inventory.csv") {
///     Ok(records) => println!("Loaded {} records", records.len()),
///     Err(e) => eprintln!("Error loading inventory: {}", e),
/// }
/// ```
pub fn load_inventory_file(path: impl AsRef<Path>) -> UploadResult<Vec<InventoryRecord>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        UploadError::ParseFailure(format!("Failed to open '{}': {}", path.display(), e))
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let rows = load_upload(file_name, &bytes)?;
    Ok(rows.iter().filter_map(InventoryRecord::from_raw).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_extensions() {
        assert_eq!(FileKind::detect("sales.CSV").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::detect("a.b.xlsx").unwrap(), FileKind::Xlsx);
        assert_eq!(FileKind::detect("old.xls").unwrap(), FileKind::Xls);
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(
            FileKind::detect("report.pdf").unwrap_err(),
            UploadError::UnsupportedFileType {
                extension: "pdf".into()
            }
        );
        assert_eq!(
            FileKind::detect("noextension").unwrap_err(),
            UploadError::UnsupportedFileType {
                extension: String::new()
            }
        );
    }

    #[test]
    fn csv_rows_keep_header_order_and_pad() {
        let data = "ItemName, Quantity ,Note\nApple,3\n\n Pear ,2,x\n";
        let rows = from_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        let keys: Vec<_> = rows[0].keys().cloned().collect();
        assert_eq!(keys, vec!["ItemName", "Quantity", "Note"]);
        assert_eq!(rows[0]["Note"], "");
        assert_eq!(rows[1]["ItemName"], "Pear");
    }

    #[test]
    fn header_only_csv_has_no_rows() {
        let rows = load_upload("empty.csv", b"ItemName,Quantity\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn invalid_utf8_is_a_parse_failure() {
        let err = load_upload("bad.csv", b"ItemName,Quantity\n\xff\xfe,1\n").unwrap_err();
        assert!(matches!(err, UploadError::ParseFailure(_)));
    }

    #[test]
    fn garbage_workbook_is_a_parse_failure() {
        let err = load_upload("sales.xlsx", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, UploadError::ParseFailure(_)));
    }

    #[test]
    fn excel_cells_convert_to_json() {
        assert_eq!(cell_to_value(&Data::Float(4.0)), Value::from(4));
        assert_eq!(cell_to_value(&Data::Float(2.5)), Value::from(2.5));
        assert_eq!(cell_to_value(&Data::String(" Lamp ".into())), Value::from("Lamp"));
        assert_eq!(cell_to_value(&Data::Empty), Value::from(""));
    }
}
