//! Owned dashboard state.
//!
//! `Dashboard` holds the only mutable copy of the inventory. Uploads replace
//! it wholesale; every view is derived on demand from the current snapshot.
//!
//! Upload sequencing is "latest wins": `begin_upload` hands out a ticket and
//! only the most recently issued ticket may complete. A slower, older upload
//! that finishes afterwards is discarded with [`UploadError::Superseded`].

use chrono::{DateTime, Local};
use log::{info, warn};
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::downloader;
use crate::error::{StatusMessage, UploadError, UploadResult};
use crate::loader;
use crate::reconcile::{self, ReconcileSummary};
use crate::record::{InventoryRecord, RawRow};
use crate::views::{self, CategoryTop, CountryTotal, InventoryKpis, ItemTotal, StockPartition, StockSummary};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Proof that an upload was started; consumed when it completes.
#[derive(Debug)]
pub struct UploadTicket {
    generation: u64,
    file_name: String,
}

impl UploadTicket {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// The last upload that was applied successfully, kept for re-download.
#[derive(Debug, Clone)]
pub struct UploadInfo {
    pub file_name: String,
    pub rows: Vec<RawRow>,
    pub summary: ReconcileSummary,
    pub processed_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOverview {
    pub file_name: String,
    pub rows: usize,
    pub processed_at: String,
    pub summary: ReconcileSummary,
}

/// Everything the dashboard page renders, computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub last_updated: String,
    pub kpis: InventoryKpis,
    pub countries: Vec<String>,
    pub country_cards: Vec<CountryTotal>,
    pub top_items: Vec<ItemTotal>,
    pub top_per_category: Vec<CategoryTop>,
    pub stock: StockPartition,
    pub stock_summary: StockSummary,
    pub warehouse_details: Vec<InventoryRecord>,
    pub latest_upload: Option<UploadOverview>,
    pub last_status: Option<StatusMessage>,
}

pub struct Dashboard {
    config: DashboardConfig,
    inventory: Vec<InventoryRecord>,
    latest_upload: Option<UploadInfo>,
    last_status: Option<StatusMessage>,
    last_updated: DateTime<Local>,
    generation: u64,
    pending: Option<u64>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, inventory: Vec<InventoryRecord>) -> Self {
        Dashboard {
            config,
            inventory,
            latest_upload: None,
            last_status: None,
            last_updated: Local::now(),
            generation: 0,
            pending: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn inventory(&self) -> &[InventoryRecord] {
        &self.inventory
    }

    pub fn latest_upload(&self) -> Option<&UploadInfo> {
        self.latest_upload.as_ref()
    }

    pub fn last_status(&self) -> Option<&StatusMessage> {
        self.last_status.as_ref()
    }

    pub fn last_updated(&self) -> DateTime<Local> {
        self.last_updated
    }

    /// Start an upload. Any upload still in flight is superseded.
    pub fn begin_upload(&mut self, file_name: impl Into<String>) -> UploadTicket {
        self.generation += 1;
        if let Some(stale) = self.pending.replace(self.generation) {
            info!("upload #{} superseded by #{}", stale, self.generation);
        }
        UploadTicket {
            generation: self.generation,
            file_name: file_name.into(),
        }
    }

    /// Finish an upload with the rows parsed from its file.
    ///
    /// Only the most recent ticket is honoured. On any failure the inventory,
    /// the retained upload and the timestamp are left as they were. A stale
    /// ticket does not touch `last_status` either.
    ///
    /// # Arguments
    /// * `ticket` - The ticket returned by `begin_upload`
    /// * `parsed` - The rows parsed from the file, or the parse error
    ///
    /// # Returns
    /// * `StatusMessage` - The success, warning or error line for this upload
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        parsed: UploadResult<Vec<RawRow>>,
    ) -> StatusMessage {
        let status = match self.try_complete(&ticket, parsed) {
            Ok(summary) => StatusMessage::success(&ticket.file_name, &summary),
            // The newer upload owns `last_status`; only the caller hears about this one.
            Err(UploadError::Superseded) => {
                info!("discarding stale upload '{}'", ticket.file_name);
                return StatusMessage::failure(&ticket.file_name, &UploadError::Superseded);
            }
            Err(e) => {
                warn!("upload '{}' rejected: {}", ticket.file_name, e);
                StatusMessage::failure(&ticket.file_name, &e)
            }
        };
        self.last_status = Some(status.clone());
        status
    }

    fn try_complete(
        &mut self,
        ticket: &UploadTicket,
        parsed: UploadResult<Vec<RawRow>>,
    ) -> UploadResult<ReconcileSummary> {
        if self.pending != Some(ticket.generation) {
            return Err(UploadError::Superseded);
        }
        self.pending = None;

        let rows = parsed?;
        let result = reconcile::reconcile(&self.inventory, &rows, self.config.unmatched_policy)?;

        info!(
            "processed '{}': {} of {} rows applied, {} units deducted",
            ticket.file_name,
            result.summary.rows_applied,
            result.summary.rows_received,
            result.summary.units_deducted
        );

        let now = Local::now();
        self.inventory = result.inventory;
        self.last_updated = now;
        self.latest_upload = Some(UploadInfo {
            file_name: ticket.file_name.clone(),
            rows,
            summary: result.summary.clone(),
            processed_at: now,
        });
        Ok(result.summary)
    }

    /// Load and apply an upload in one go.
    pub fn apply_upload(&mut self, file_name: &str, bytes: &[u8]) -> StatusMessage {
        let ticket = self.begin_upload(file_name);
        let parsed = loader::load_upload(file_name, bytes);
        self.complete_upload(ticket, parsed)
    }

    /// The retained upload as `(download name, pretty JSON)`.
    pub fn latest_upload_download(&self) -> Option<Result<(String, String), serde_json::Error>> {
        self.latest_upload.as_ref().map(|upload| -> Result<_, serde_json::Error> {
            let json = downloader::raw_rows_to_pretty_json(&upload.rows)?;
            Ok((downloader::raw_rows_download_name(&upload.file_name), json))
        })
    }

    /// Compute every dashboard view from the current snapshot
    ///
    /// The configured threshold, top-N size and country card count are
    /// applied here; the underlying view functions take them as arguments.
    ///
    /// # Returns
    /// * `DashboardView` - A serializable snapshot for the page and the CLI
    pub fn view(&self) -> DashboardView {
        let inventory = &self.inventory;
        let stock = views::partition_with_threshold(inventory, self.config.low_stock_threshold);
        let mut country_cards = views::country_totals(inventory);
        country_cards.truncate(self.config.country_cards);

        DashboardView {
            last_updated: self.last_updated.format(TIMESTAMP_FORMAT).to_string(),
            kpis: views::inventory_kpis(inventory),
            countries: views::distinct_countries(inventory),
            country_cards,
            top_items: views::top_by_quantity(inventory, self.config.top_items),
            top_per_category: views::top_per_category(inventory),
            stock_summary: stock.summary(),
            stock,
            warehouse_details: views::in_stock(inventory),
            latest_upload: self.latest_upload.as_ref().map(|upload| UploadOverview {
                file_name: upload.file_name.clone(),
                rows: upload.rows.len(),
                processed_at: upload.processed_at.format(TIMESTAMP_FORMAT).to_string(),
                summary: upload.summary.clone(),
            }),
            last_status: self.last_status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusKind;

    fn dashboard() -> Dashboard {
        Dashboard::new(
            DashboardConfig::default(),
            vec![
                InventoryRecord::create("Apple", 5),
                InventoryRecord::create("Chair", 0),
            ],
        )
    }

    #[test]
    fn successful_upload_replaces_inventory() {
        let mut dash = dashboard();
        let status = dash.apply_upload("sales.csv", b"ItemName,Quantity\napple,8\n");
        assert!(status.is_success(), "{:?}", status);
        assert_eq!(dash.inventory()[0].quantity, 0);
        assert_eq!(dash.latest_upload().unwrap().file_name, "sales.csv");
        assert_eq!(dash.view().stock_summary.out, 2);
    }

    #[test]
    fn failed_upload_keeps_state() {
        let mut dash = dashboard();
        dash.apply_upload("first.csv", b"ItemName,Quantity\nApple,1\n");
        let before = dash.inventory().to_vec();
        let stamp = dash.last_updated();

        let status = dash.apply_upload("report.pdf", b"%PDF-1.4");
        assert_eq!(status.kind, StatusKind::Warning);
        let status = dash.apply_upload("sales.csv", b"Product,Sold\nApple,1\n");
        assert_eq!(status.kind, StatusKind::Error);

        assert_eq!(dash.inventory(), before.as_slice());
        assert_eq!(dash.last_updated(), stamp);
        assert_eq!(dash.latest_upload().unwrap().file_name, "first.csv");
        assert_eq!(dash.last_status(), Some(&status));
    }

    #[test]
    fn older_upload_is_discarded() {
        let mut dash = dashboard();
        let first = dash.begin_upload("first.csv");
        let second = dash.begin_upload("second.csv");

        let rows = |csv: &str| loader::load_upload("x.csv", csv.as_bytes());
        let late = dash.complete_upload(first, rows("ItemName,Quantity\nApple,1\n"));
        assert_eq!(late.kind, StatusKind::Warning);
        assert_eq!(dash.inventory()[0].quantity, 5);

        let status = dash.complete_upload(second, rows("ItemName,Quantity\nApple,2\n"));
        assert!(status.is_success());
        assert_eq!(dash.inventory()[0].quantity, 3);
    }

    #[test]
    fn stale_upload_finishing_last_keeps_newest_status() {
        let mut dash = dashboard();
        let first = dash.begin_upload("first.csv");
        let second = dash.begin_upload("second.csv");

        let rows = |csv: &str| loader::load_upload("x.csv", csv.as_bytes());
        let status = dash.complete_upload(second, rows("ItemName,Quantity\nApple,2\n"));
        assert!(status.is_success());

        let late = dash.complete_upload(first, rows("ItemName,Quantity\nApple,1\n"));
        assert_eq!(late.kind, StatusKind::Warning);

        let view = dash.view();
        assert_eq!(dash.inventory()[0].quantity, 3);
        assert_eq!(view.latest_upload.unwrap().file_name, "second.csv");
        assert_eq!(view.last_status.unwrap().kind, StatusKind::Success);
    }

    #[test]
    fn view_respects_config() {
        let config = DashboardConfig {
            low_stock_threshold: 4,
            top_items: 1,
            ..DashboardConfig::default()
        };
        let dash = Dashboard::new(config, dashboard().inventory().to_vec());
        let view = dash.view();
        assert_eq!(view.top_items.len(), 1);
        assert_eq!(view.stock_summary.available, 1);
        assert_eq!(view.warehouse_details.len(), 1);
        assert!(view.latest_upload.is_none());
    }

    #[test]
    fn latest_upload_downloads_as_json() {
        let mut dash = dashboard();
        assert!(dash.latest_upload_download().is_none());
        dash.apply_upload("sales.csv", b"ItemName,Quantity\nApple,1\n");
        let (name, json) = dash.latest_upload_download().unwrap().unwrap();
        assert_eq!(name, "sales.csv.json");
        assert!(json.contains("\"ItemName\": \"Apple\""));
    }
}
