//! Property-based tests for reconciliation and the derived views.

use inventory_dashboard::views::{partition_by_stock_level, top_by_quantity};
use inventory_dashboard::{InventoryRecord, RawRow, UnmatchedPolicy, UploadError, reconcile};
use proptest::prelude::*;
use serde_json::{Value, json};

fn name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Apple", "Desk", "Chair", "Rice", "Lamp", "Monitor"])
        .prop_map(String::from)
}

fn inventory_strategy() -> impl Strategy<Value = Vec<InventoryRecord>> {
    prop::collection::vec(
        (name_strategy(), 0u64..50).prop_map(|(name, qty)| InventoryRecord::create(name, qty)),
        0..12,
    )
}

/// Sales rows with varied casing, padding and quantity encodings.
fn sales_strategy() -> impl Strategy<Value = Vec<RawRow>> {
    let row = (
        name_strategy(),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![
            (-5i64..80).prop_map(Value::from),
            (-5i64..80).prop_map(|q| Value::from(q.to_string())),
            Just(Value::from("n/a")),
        ],
    )
        .prop_map(|(name, upper, pad, qty)| {
            let name = if upper { name.to_uppercase() } else { name };
            let name = if pad { format!("  {} ", name) } else { name };
            let mut row = RawRow::new();
            row.insert("ItemName".into(), Value::from(name));
            row.insert("Quantity".into(), qty);
            row
        });
    prop::collection::vec(row, 1..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn reconcile_never_drops_records_or_appends_in_ignore_mode(
        inventory in inventory_strategy(),
        sales in sales_strategy(),
    ) {
        let result = reconcile(&inventory, &sales, UnmatchedPolicy::Ignore).unwrap();
        prop_assert_eq!(result.inventory.len(), inventory.len());
        for (before, after) in inventory.iter().zip(&result.inventory) {
            prop_assert_eq!(&before.item_name, &after.item_name);
        }
    }

    #[test]
    fn deducted_units_match_quantity_change(
        inventory in inventory_strategy(),
        sales in sales_strategy(),
    ) {
        let result = reconcile(&inventory, &sales, UnmatchedPolicy::Ignore).unwrap();
        let before: u64 = inventory.iter().map(|r| r.quantity).sum();
        let after: u64 = result.inventory.iter().map(|r| r.quantity).sum();
        // Returns (negative quantities) add stock, so only the lower bound is exact.
        prop_assert!(after + result.summary.units_deducted >= before);
    }

    #[test]
    fn partition_is_disjoint_and_exhaustive(inventory in inventory_strategy()) {
        let partition = partition_by_stock_level(&inventory);
        prop_assert_eq!(
            partition.available.len() + partition.low.len() + partition.out.len(),
            inventory.len()
        );
        prop_assert!(partition.available.iter().all(|r| r.quantity > 10));
        prop_assert!(partition.low.iter().all(|r| r.quantity > 0 && r.quantity <= 10));
        prop_assert!(partition.out.iter().all(|r| r.quantity == 0));
    }

    #[test]
    fn top_by_quantity_is_bounded_and_sorted(inventory in inventory_strategy(), n in 0usize..8) {
        let top = top_by_quantity(&inventory, n);
        prop_assert!(top.len() <= n);
        prop_assert!(top.windows(2).all(|pair| pair[0].quantity >= pair[1].quantity));
    }

    #[test]
    fn batches_without_names_leave_inventory_alone(
        inventory in inventory_strategy(),
        qty in 0i64..100,
    ) {
        let sales = vec![json!({ "Sku": "X-1", "Quantity": qty }).as_object().unwrap().clone()];
        let err = reconcile(&inventory, &sales, UnmatchedPolicy::Ignore).unwrap_err();
        prop_assert_eq!(err, UploadError::NoRecognizedColumns);
    }
}

fn rows(value: Value) -> Vec<RawRow> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_object().unwrap().clone())
        .collect()
}

#[test]
fn padded_name_decrements_exact_record() {
    let inventory = vec![InventoryRecord::create("Apple", 9)];
    let result = reconcile(
        &inventory,
        &rows(json!([{ "ItemName": " Apple ", "Quantity": 4 }])),
        UnmatchedPolicy::Ignore,
    )
    .unwrap();
    assert_eq!(result.inventory[0].quantity, 5);
}

#[test]
fn oversold_apple_is_clamped() {
    let inventory = vec![InventoryRecord::create("Apple", 5)];
    let result = reconcile(
        &inventory,
        &rows(json!([{ "ItemName": "apple", "Quantity": 8 }])),
        UnmatchedPolicy::Ignore,
    )
    .unwrap();
    assert_eq!(result.inventory[0].quantity, 0);
}

#[test]
fn unknown_item_appends_nothing() {
    let inventory = vec![InventoryRecord::create("Apple", 5)];
    let result = reconcile(
        &inventory,
        &rows(json!([{ "ItemName": "Hammock", "Quantity": 1 }])),
        UnmatchedPolicy::Ignore,
    )
    .unwrap();
    assert_eq!(result.inventory, inventory);
}

#[test]
fn item_name_aliases_are_tried_in_order() {
    let inventory = vec![
        InventoryRecord::create("Desk", 10),
        InventoryRecord::create("Lamp", 10),
    ];
    let sales = rows(json!([
        { "itemname": "desk", "QuantitySold": "2" },
        { "Item Name": "lamp", "qty": 3.7 },
    ]));
    let result = reconcile(&inventory, &sales, UnmatchedPolicy::Ignore).unwrap();
    assert_eq!(result.inventory[0].quantity, 8);
    assert_eq!(result.inventory[1].quantity, 7);
}
