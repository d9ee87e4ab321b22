use lazy_static::lazy_static;

use crate::record::InventoryRecord;

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    name: &str,
    category: &str,
    quantity: u64,
    warehouse: &str,
    city: &str,
    state: &str,
    country: &str,
) -> InventoryRecord {
    InventoryRecord {
        item_id: Some(id.to_string()),
        item_name: name.to_string(),
        category: category.to_string(),
        quantity,
        warehouse: Some(warehouse.to_string()),
        location: Some(format!("{}, {}", city, state)),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        country: Some(country.to_string()),
    }
}

lazy_static! {
    /// Stock the dashboard starts with when no inventory file is configured.
    pub static ref SAMPLE_INVENTORY: Vec<InventoryRecord> = vec![
        record("ITM0001", "Apple", "Food", 636, "Warehouse B-AUS", "Sydney", "NSW", "Australia"),
        record("ITM0002", "Bookshelf", "Furniture", 170, "Warehouse B-UK", "London", "England", "UK"),
        record("ITM0003", "Rice", "Food", 120, "Warehouse A-IN", "Mumbai", "Maharashtra", "India"),
        record("ITM0004", "Laptop", "Electronics", 8, "Warehouse A-US", "Austin", "Texas", "USA"),
        record("ITM0005", "Chair", "Furniture", 0, "Warehouse B-UK", "London", "England", "UK"),
        record("ITM0006", "Monitor", "Electronics", 5, "Warehouse A-US", "Austin", "Texas", "USA"),
        record("ITM0007", "Desk", "Furniture", 25, "Warehouse A-CA", "Toronto", "Ontario", "Canada"),
    ];
}

pub fn sample_inventory() -> Vec<InventoryRecord> {
    SAMPLE_INVENTORY.clone()
}
