use serde::{Deserialize, Serialize};

use crate::columns;

/// One parsed line of an uploaded file, keyed by header name in column order.
pub type RawRow = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const UNKNOWN: &str = "Unknown";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InventoryRecord {
    #[serde(rename = "ItemID", default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub item_name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Join-key normalization shared by inventory records and sales rows.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl InventoryRecord {
    pub fn create(item_name: impl Into<String>, quantity: u64) -> Self {
        InventoryRecord {
            item_id: None,
            item_name: item_name.into(),
            category: default_category(),
            quantity,
            warehouse: None,
            location: None,
            city: None,
            state: None,
            country: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.item_name)
    }

    /// Country used for grouping; blank or missing is "Unknown".
    pub fn country_or_unknown(&self) -> &str {
        non_blank(self.country.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn category_or_default(&self) -> &str {
        non_blank(Some(self.category.as_str())).unwrap_or(DEFAULT_CATEGORY)
    }

    /// Build a record from an inventory file row. Rows without an item name
    /// yield `None`; negative quantities are floored at zero.
    pub fn from_raw(row: &RawRow) -> Option<Self> {
        let item_name = columns::INVENTORY_ITEM_NAME.resolve_text(row)?;
        let quantity = columns::INVENTORY_QUANTITY.resolve_quantity(row).max(0) as u64;

        Some(InventoryRecord {
            item_id: columns::INVENTORY_ITEM_ID.resolve_text(row),
            item_name,
            category: columns::INVENTORY_CATEGORY
                .resolve_text(row)
                .unwrap_or_else(default_category),
            quantity,
            warehouse: columns::INVENTORY_WAREHOUSE.resolve_text(row),
            location: columns::INVENTORY_LOCATION.resolve_text(row),
            city: columns::INVENTORY_CITY.resolve_text(row),
            state: columns::INVENTORY_STATE.resolve_text(row),
            country: columns::INVENTORY_COUNTRY.resolve_text(row),
        })
    }

    /// Every displayed field as text, used by the quick search.
    pub fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.item_name.clone(),
            self.category.clone(),
            self.quantity.to_string(),
        ];
        for value in [
            &self.item_id,
            &self.warehouse,
            &self.location,
            &self.city,
            &self.state,
            &self.country,
        ]
        .into_iter()
        .flatten()
        {
            fields.push(value.clone());
        }
        fields
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// One sales line after column-alias resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SalesRow {
    pub item_name: String,
    pub qty_sold: i64,
}

impl SalesRow {
    /// `None` when no candidate column yields an item name.
    pub fn from_raw(row: &RawRow) -> Option<Self> {
        let item_name = columns::SALES_ITEM_NAME.resolve_text(row)?;
        Some(SalesRow {
            item_name,
            qty_sold: columns::SALES_QUANTITY.resolve_quantity(row),
        })
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.item_name)
    }
}
