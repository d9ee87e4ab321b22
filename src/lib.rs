/*!
# Inventory Dashboard

Stock reconciliation and dashboard views for a small inventory, driven by
uploaded CSV/XLSX sales files.

## Overview

The inventory lives entirely in memory. It is seeded once (bundled sample
data or an inventory file) and then replaced wholesale each time a sales file
is reconciled against it. The dashboard re-derives its views from the new
snapshot after every upload.

## Architecture

Data flows one way:

```text
upload bytes -> loader -> raw rows -> reconcile -> new inventory -> views
```

- **loader**: CSV (`csv`) and Excel (`calamine`) parsing into raw rows,
  format chosen by extension
- **columns**: ordered column-alias resolution (`ItemName` / `item` / ...)
- **reconcile**: subtracts sold quantities, floored at zero, with a
  configurable policy for unknown items
- **views**: pure queries (countries, top items, top per category, stock
  buckets, KPIs, filters)
- **dashboard**: the owned state object and the "latest upload wins" ticket
  protocol
- **downloader**: JSON export of the last upload, CSV/XLSX export of stock
- **config**: TOML configuration with embedded defaults
- **app** (feature `web`): axum JSON API and a static dashboard page

## Failure model

Every upload failure (`EmptyInput`, `NoRecognizedColumns`,
`UnsupportedFileType`, `ParseFailure`, ...) is reported as a status message
and leaves the current inventory untouched.
*/

pub mod columns;
pub mod config;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod reconcile;
pub mod record;
pub mod sample;
pub mod views;

#[cfg(feature = "web")]
pub mod app;

pub use config::{Config, DashboardConfig};
pub use dashboard::{Dashboard, DashboardView, UploadTicket};
pub use error::{StatusKind, StatusMessage, UploadError};
pub use reconcile::{ReconcileSummary, Reconciliation, UnmatchedPolicy, reconcile};
pub use record::{InventoryRecord, RawRow, SalesRow};
pub use views::{
    InventoryFilter, distinct_countries, partition_by_stock_level, top_by_quantity,
    top_per_category,
};
