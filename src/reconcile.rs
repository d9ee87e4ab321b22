//! Sales reconciliation.
//!
//! Applies a batch of uploaded sales rows to an inventory snapshot and returns
//! the full replacement collection. The snapshot passed in is never touched;
//! on any error the caller simply keeps it.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{UploadError, UploadResult};
use crate::record::{InventoryRecord, RawRow, SalesRow};

/// What to do with sales rows whose item is not in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Skip the row; it is only counted in the summary.
    #[default]
    Ignore,
    /// Append a new `Uncategorized` record for the item.
    Append,
    /// Fail the whole batch.
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub rows_received: usize,
    /// Rows that resolved to an item name.
    pub rows_recognized: usize,
    pub rows_applied: usize,
    pub rows_unmatched: usize,
    /// Rows whose sale exceeded the stock on hand and were floored at zero.
    pub rows_clamped: usize,
    pub units_deducted: u64,
    /// Distinct unmatched names, first-seen order.
    pub unmatched_items: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub inventory: Vec<InventoryRecord>,
    pub summary: ReconcileSummary,
}

/// Map raw rows to sales rows, dropping the ones without an item name.
pub fn resolve_sales_rows(rows: &[RawRow]) -> Vec<SalesRow> {
    rows.iter().filter_map(SalesRow::from_raw).collect()
}

/// Apply a batch of sales rows to an inventory snapshot
///
/// Each recognized row is matched to a record by trimmed, case-insensitive
/// item name and its sold quantity is subtracted, flooring at zero.
/// Unmatched rows are handled according to `policy`.
///
/// # Arguments
/// * `inventory` - The current snapshot; never modified
/// * `sales_rows` - Raw rows from the uploaded file
/// * `policy` - What to do with rows naming unknown items
///
/// # Returns
/// * `UploadResult<Reconciliation>` - The full replacement inventory and a summary,
///   or `EmptyInput` / `NoRecognizedColumns` / `UnmatchedItems`
///
/// # Examples
/// ```
/// use inventory_dashboard::{InventoryRecord, UnmatchedPolicy, reconcile};
/// use inventory_dashboard::loader::load_upload;
///
/// let inventory = vec![InventoryRecord::create("Apple", 5)];
/// let sales = load_upload("sales.csv", b"ItemName,Quantity\napple,8\n").unwrap();
/// let result = reconcile(&inventory, &sales, UnmatchedPolicy::Ignore).unwrap();
/// assert_eq!(result.inventory[0].quantity, 0);
/// ```
pub fn reconcile(
    inventory: &[InventoryRecord],
    sales_rows: &[RawRow],
    policy: UnmatchedPolicy,
) -> UploadResult<Reconciliation> {
    if sales_rows.is_empty() {
        return Err(UploadError::EmptyInput);
    }

    let sales = resolve_sales_rows(sales_rows);
    if sales.is_empty() {
        return Err(UploadError::NoRecognizedColumns);
    }

    let mut updated = inventory.to_vec();
    // Later records overwrite earlier ones, so duplicate names resolve to the last.
    let mut index: HashMap<String, usize> = updated
        .iter()
        .enumerate()
        .map(|(i, record)| (record.normalized_name(), i))
        .collect();

    let mut summary = ReconcileSummary {
        rows_received: sales_rows.len(),
        rows_recognized: sales.len(),
        ..ReconcileSummary::default()
    };

    for sale in &sales {
        let key = sale.normalized_name();
        let position = match index.get(&key).copied() {
            Some(i) => i,
            None => {
                summary.rows_unmatched += 1;
                if !summary
                    .unmatched_items
                    .iter()
                    .any(|name| crate::record::normalize_name(name) == key)
                {
                    summary.unmatched_items.push(sale.item_name.clone());
                }
                debug!("no inventory record for sales item '{}'", sale.item_name);

                match policy {
                    UnmatchedPolicy::Ignore | UnmatchedPolicy::Reject => continue,
                    UnmatchedPolicy::Append => {
                        updated.push(InventoryRecord::create(sale.item_name.clone(), 0));
                        let i = updated.len() - 1;
                        index.insert(key, i);
                        i
                    }
                }
            }
        };

        let record = &mut updated[position];
        let (quantity, deducted, clamped) = apply_sale(record.quantity, sale.qty_sold);
        record.quantity = quantity;
        summary.units_deducted = summary.units_deducted.saturating_add(deducted);
        summary.rows_applied += 1;
        if clamped {
            summary.rows_clamped += 1;
        }
    }

    if policy == UnmatchedPolicy::Reject && !summary.unmatched_items.is_empty() {
        return Err(UploadError::UnmatchedItems(summary.unmatched_items));
    }

    Ok(Reconciliation {
        inventory: updated,
        summary,
    })
}

/// Subtract `sold` from `on_hand`, flooring at zero.
///
/// Returns the new quantity, the units actually removed, and whether the
/// sale had to be clamped. A negative `sold` is a return and adds stock.
fn apply_sale(on_hand: u64, sold: i64) -> (u64, u64, bool) {
    if sold >= 0 {
        let sold = sold as u64;
        let remaining = on_hand.saturating_sub(sold);
        (remaining, on_hand - remaining, sold > on_hand)
    } else {
        (on_hand.saturating_add(sold.unsigned_abs()), 0, false)
    }
}
