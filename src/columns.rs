use serde_json::Value;

use crate::record::RawRow;

/// An ordered list of header names that may carry the same field.
///
/// Candidates are tried in sequence; the first one present in the row with a
/// non-blank value wins.
#[derive(Debug, Clone, Copy)]
pub struct ColumnAliases {
    pub field: &'static str,
    pub candidates: &'static [&'static str],
}

pub const SALES_ITEM_NAME: ColumnAliases = ColumnAliases {
    field: "ItemName",
    candidates: &["ItemName", "itemname", "item", "Item Name"],
};

pub const SALES_QUANTITY: ColumnAliases = ColumnAliases {
    field: "Quantity",
    candidates: &["Quantity", "QuantitySold", "quantity", "qty"],
};

// Inventory files come from the same kind of exports, so they get the same treatment.
pub const INVENTORY_ITEM_ID: ColumnAliases = ColumnAliases {
    field: "ItemID",
    candidates: &["ItemID", "ItemId", "itemid", "item_id", "Item ID"],
};

pub const INVENTORY_ITEM_NAME: ColumnAliases = ColumnAliases {
    field: "ItemName",
    candidates: &["ItemName", "itemname", "item", "Item Name", "Item"],
};

pub const INVENTORY_CATEGORY: ColumnAliases = ColumnAliases {
    field: "Category",
    candidates: &["Category", "category"],
};

pub const INVENTORY_QUANTITY: ColumnAliases = ColumnAliases {
    field: "Quantity",
    candidates: &["Quantity", "quantity", "qty", "QtyOnHand"],
};

pub const INVENTORY_WAREHOUSE: ColumnAliases = ColumnAliases {
    field: "Warehouse",
    candidates: &["Warehouse", "warehouse"],
};

pub const INVENTORY_LOCATION: ColumnAliases = ColumnAliases {
    field: "Location",
    candidates: &["Location", "location"],
};

pub const INVENTORY_CITY: ColumnAliases = ColumnAliases {
    field: "City",
    candidates: &["City", "city"],
};

pub const INVENTORY_STATE: ColumnAliases = ColumnAliases {
    field: "State",
    candidates: &["State", "State/Province", "state", "Province"],
};

pub const INVENTORY_COUNTRY: ColumnAliases = ColumnAliases {
    field: "Country",
    candidates: &["Country", "country"],
};

impl ColumnAliases {
    pub fn resolve<'r>(&self, row: &'r RawRow) -> Option<&'r Value> {
        self.candidates
            .iter()
            .filter_map(|key| row.get(*key))
            .find(|value| !is_blank(value))
    }

    /// Resolves the field as trimmed text; numbers are rendered as text.
    pub fn resolve_text(&self, row: &RawRow) -> Option<String> {
        self.resolve(row).and_then(value_as_text)
    }

    /// Resolves the field as a whole number, 0 when missing or unparseable.
    pub fn resolve_quantity(&self, row: &RawRow) -> i64 {
        self.resolve(row).map(coerce_quantity).unwrap_or(0)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric coercion for quantity cells.
///
/// Fractions are truncated toward zero; text that does not parse as a finite
/// number, booleans, and empty cells all become 0.
pub fn coerce_quantity(value: &Value) -> i64 {
    let number = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return i;
            }
            n.as_f64()
        }
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        // `as` saturates at the i64 bounds
        Some(f) if f.is_finite() => f.trunc() as i64,
        _ => 0,
    }
}
