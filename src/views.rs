//! Derived views over the current inventory.
//!
//! Every function here is a pure query over a slice of records. They are
//! recomputed from scratch after each reconciliation, so none of them cache
//! or mutate anything.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::record::{InventoryRecord, UNKNOWN, non_blank};

/// Records above this quantity count as available; 1..=this is low stock.
pub const LOW_STOCK_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemTotal {
    pub item_name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryTop {
    pub category: String,
    pub top: InventoryRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountryTotal {
    pub country: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockPartition {
    pub available: Vec<InventoryRecord>,
    pub low: Vec<InventoryRecord>,
    pub out: Vec<InventoryRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub available: usize,
    pub low: usize,
    pub out: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventoryKpis {
    pub distinct_items: usize,
    pub total_quantity: u64,
    pub locations: usize,
    pub warehouses: usize,
}

/// Distinct countries in first-seen order; missing countries read `"Unknown"`.
pub fn distinct_countries(inventory: &[InventoryRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    inventory
        .iter()
        .map(InventoryRecord::country_or_unknown)
        .filter(|country| seen.insert(*country))
        .map(str::to_string)
        .collect()
}

/// Group by item name, sum quantities, and keep the `n` largest groups.
/// Equal totals keep the order in which the groups were first seen.
///
/// # Arguments
/// * `inventory` - Records to aggregate
/// * `n` - Maximum number of groups to return
///
/// # Returns
/// * `Vec<ItemTotal>` - At most `n` totals, largest first
pub fn top_by_quantity(inventory: &[InventoryRecord], n: usize) -> Vec<ItemTotal> {
    let mut totals: Vec<ItemTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in inventory {
        let name = non_blank(Some(record.item_name.as_str())).unwrap_or(UNKNOWN);
        match positions.get(name) {
            Some(&i) => {
                totals[i].quantity = totals[i].quantity.saturating_add(record.quantity);
            }
            None => {
                positions.insert(name, totals.len());
                totals.push(ItemTotal {
                    item_name: name.to_string(),
                    quantity: record.quantity,
                });
            }
        }
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    totals.truncate(n);
    totals
}

/// The record with the highest quantity in each category
///
/// Categories are reported in first-seen order. On equal quantities the
/// earlier record wins, and categories whose records are all out of stock
/// are omitted.
///
/// # Arguments
/// * `inventory` - Records to scan
///
/// # Returns
/// * `Vec<CategoryTop>` - One entry per category with stock on hand
pub fn top_per_category(inventory: &[InventoryRecord]) -> Vec<CategoryTop> {
    let mut order: Vec<&str> = Vec::new();
    let mut best: HashMap<&str, Option<&InventoryRecord>> = HashMap::new();

    for record in inventory {
        let category = record.category_or_default();
        let slot = best.entry(category).or_insert_with(|| {
            order.push(category);
            None
        });
        if record.quantity == 0 {
            continue;
        }
        if slot.is_none_or(|current| record.quantity > current.quantity) {
            *slot = Some(record);
        }
    }

    order
        .into_iter()
        .filter_map(|category| {
            best.get(category)
                .copied()
                .flatten()
                .map(|top| CategoryTop {
                    category: category.to_string(),
                    top: top.clone(),
                })
        })
        .collect()
}

pub fn partition_by_stock_level(inventory: &[InventoryRecord]) -> StockPartition {
    partition_with_threshold(inventory, LOW_STOCK_THRESHOLD)
}

pub fn partition_with_threshold(inventory: &[InventoryRecord], threshold: u64) -> StockPartition {
    let mut partition = StockPartition::default();
    for record in inventory {
        let bucket = match record.quantity {
            0 => &mut partition.out,
            q if q <= threshold => &mut partition.low,
            _ => &mut partition.available,
        };
        bucket.push(record.clone());
    }
    partition
}

impl StockPartition {
    pub fn summary(&self) -> StockSummary {
        StockSummary {
            available: self.available.len(),
            low: self.low.len(),
            out: self.out.len(),
        }
    }
}

/// Total quantity per country, in `distinct_countries` order
///
/// Records without a country are summed under `"Unknown"`.
pub fn country_totals(inventory: &[InventoryRecord]) -> Vec<CountryTotal> {
    let mut totals: Vec<CountryTotal> = distinct_countries(inventory)
        .into_iter()
        .map(|country| CountryTotal {
            country,
            quantity: 0,
        })
        .collect();
    let positions: HashMap<String, usize> = totals
        .iter()
        .enumerate()
        .map(|(i, total)| (total.country.clone(), i))
        .collect();

    for record in inventory {
        if let Some(&i) = positions.get(record.country_or_unknown()) {
            totals[i].quantity = totals[i].quantity.saturating_add(record.quantity);
        }
    }
    totals
}

/// Headline counts for the dashboard cards
///
/// # Returns
/// * `InventoryKpis` - Distinct item names, total quantity, and the number of
///   distinct non-blank locations and warehouses
pub fn inventory_kpis(inventory: &[InventoryRecord]) -> InventoryKpis {
    fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> usize {
        values.filter_map(non_blank).collect::<HashSet<_>>().len()
    }

    InventoryKpis {
        distinct_items: distinct(inventory.iter().map(|r| Some(r.item_name.as_str()))),
        total_quantity: inventory.iter().map(|r| r.quantity).fold(0, u64::saturating_add),
        locations: distinct(inventory.iter().map(|r| r.location.as_deref())),
        warehouses: distinct(inventory.iter().map(|r| r.warehouse.as_deref())),
    }
}

/// Rows for the warehouse details table: everything with stock on hand.
pub fn in_stock(inventory: &[InventoryRecord]) -> Vec<InventoryRecord> {
    inventory
        .iter()
        .filter(|record| record.quantity > 0)
        .cloned()
        .collect()
}

/// Inventory browser filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub warehouse: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl InventoryFilter {
    pub fn is_empty(&self) -> bool {
        [
            &self.country,
            &self.state,
            &self.city,
            &self.warehouse,
            &self.category,
            &self.search,
        ]
            .iter()
            .all(|f| non_blank(f.as_deref()).is_none())
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        let dimension = |wanted: &Option<String>, actual: &str| {
            non_blank(wanted.as_deref()).is_none_or(|w| w == actual)
        };

        if !dimension(&self.country, record.country_or_unknown())
            || !dimension(&self.state, record.state.as_deref().unwrap_or(""))
            || !dimension(&self.city, record.city.as_deref().unwrap_or(""))
            || !dimension(&self.warehouse, record.warehouse.as_deref().unwrap_or(""))
            || !dimension(&self.category, record.category_or_default())
        {
            return false;
        }

        match non_blank(self.search.as_deref()) {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                record
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }

    pub fn apply(&self, inventory: &[InventoryRecord]) -> Vec<InventoryRecord> {
        inventory
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}
