use std::error::Error;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::record::{InventoryRecord, RawRow};

/// Column headers of the inventory exports, in display order.
pub const INVENTORY_COLUMNS: [&str; 9] = [
    "ItemID",
    "ItemName",
    "Category",
    "Quantity",
    "Warehouse",
    "Location",
    "City",
    "State",
    "Country",
];

/// Serialize the most recently uploaded rows the way they are offered for
/// download: a pretty-printed JSON array, two-space indent.
///
/// # Examples
/// ```
/// use inventory_dashboard::downloader::raw_rows_to_pretty_json;
///
/// let json = raw_rows_to_pretty_json(&[]).unwrap();
/// assert_eq!(json, "[]");
/// ```
pub fn raw_rows_to_pretty_json(rows: &[RawRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}

/// File name the upload export is offered under.
pub fn raw_rows_download_name(upload_name: &str) -> String {
    format!("{}.json", upload_name)
}

fn record_cells(record: &InventoryRecord) -> [String; 9] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        text(&record.item_id),
        record.item_name.clone(),
        record.category.clone(),
        record.quantity.to_string(),
        text(&record.warehouse),
        text(&record.location),
        text(&record.city),
        text(&record.state),
        text(&record.country),
    ]
}

/// Convert inventory records to CSV ("Download filtered CSV").
///
/// # Arguments
/// * `records` - The rows to export, typically already filtered
///
/// # Returns
/// * `Result<String, Box<dyn Error>>` - CSV text with an `INVENTORY_COLUMNS` header
pub fn inventory_to_csv(records: &[InventoryRecord]) -> Result<String, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(INVENTORY_COLUMNS)?;
    for record in records {
        writer.write_record(record_cells(record))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Convert inventory records to an XLSX workbook held in memory.
pub fn inventory_to_xlsx(records: &[InventoryRecord]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Inventory")?;

    let header = Format::new().set_bold();
    for (c, title) in INVENTORY_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *title, &header)?;
    }

    for (r, record) in records.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, value) in record_cells(record).iter().enumerate() {
            if INVENTORY_COLUMNS[c] == "Quantity" {
                worksheet.write_number(row, c as u16, record.quantity as f64)?;
            } else if !value.is_empty() {
                worksheet.write_string(row, c as u16, value)?;
            }
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_upload;

    #[test]
    fn pretty_json_keeps_column_order() {
        let rows = load_upload("s.csv", b"Quantity,ItemName\n3,Apple\n").unwrap();
        let json = raw_rows_to_pretty_json(&rows).unwrap();
        assert_eq!(
            json,
            "[\n  {\n    \"Quantity\": \"3\",\n    \"ItemName\": \"Apple\"\n  }\n]"
        );
        assert_eq!(raw_rows_download_name("s.csv"), "s.csv.json");
    }

    #[test]
    fn csv_export_quotes_commas() {
        let records = vec![InventoryRecord::create("Desk, oak", 4).with_country("UK")];
        let csv = inventory_to_csv(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("ItemID,ItemName,Category,Quantity,Warehouse,Location,City,State,Country")
        );
        assert_eq!(lines.next(), Some(",\"Desk, oak\",Uncategorized,4,,,,,UK"));
    }

    #[test]
    fn xlsx_export_reloads() {
        let records = vec![
            InventoryRecord::create("Apple", 636).with_category("Food"),
            InventoryRecord::create("Chair", 0),
        ];
        let bytes = inventory_to_xlsx(&records).unwrap();
        let rows = load_upload("inventory.xlsx", &bytes).unwrap();
        assert_eq!(rows.len(), 2);
        let reloaded: Vec<_> = rows.iter().filter_map(InventoryRecord::from_raw).collect();
        assert_eq!(reloaded[0].item_name, "Apple");
        assert_eq!(reloaded[0].quantity, 636);
        assert_eq!(reloaded[1].quantity, 0);
    }
}
