use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::info;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::downloader;
use crate::error::{StatusMessage, UploadError};
use crate::loader;
use crate::record::InventoryRecord;
use crate::views::InventoryFilter;

pub struct AppState {
    dashboard: Mutex<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        AppState {
            dashboard: Mutex::new(dashboard),
        }
    }

    // Uploads swap the inventory in one assignment, so a poisoned lock still
    // holds a whole snapshot.
    fn lock(&self) -> MutexGuard<'_, Dashboard> {
        self.dashboard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Deserialize, Default)]
struct InventoryQuery {
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    warehouse: Option<String>,
    category: Option<String>,
    q: Option<String>,
}

impl InventoryQuery {
    fn filter(self) -> InventoryFilter {
        InventoryFilter {
            country: self.country,
            state: self.state,
            city: self.city,
            warehouse: self.warehouse,
            category: self.category,
            search: self.q,
        }
    }
}

pub async fn run(
    config: Config,
    inventory: Vec<InventoryRecord>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bind = config.server.bind.clone();
    let app_state = Arc::new(AppState::new(Dashboard::new(config.dashboard, inventory)));
    let app = router(app_state);

    // Start server
    let listener = TcpListener::bind(&bind).await?;
    info!("Listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/inventory", get(get_inventory))
        .route("/api/inventory.csv", get(export_inventory_csv))
        .route("/api/inventory.xlsx", get(export_inventory_xlsx))
        .route("/api/upload", post(upload_sales))
        .route("/api/upload/latest", get(download_latest_upload))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard.html"))
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.lock().view())
}

async fn get_inventory(
    Query(query): Query<InventoryQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let records = query.filter().apply(state.lock().inventory());
    Json(records)
}

fn attachment(content_type: &'static str, file_name: &str, body: impl IntoResponse) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name.replace('"', "")),
            ),
        ],
        body,
    )
        .into_response()
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusMessage::error(message)),
    )
        .into_response()
}

async fn export_inventory_csv(
    Query(query): Query<InventoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let records = query.filter().apply(state.lock().inventory());
    match downloader::inventory_to_csv(&records) {
        Ok(csv) => attachment("text/csv", "inventory.csv", csv),
        Err(e) => internal_error(e.to_string()),
    }
}

async fn export_inventory_xlsx(
    Query(query): Query<InventoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let records = query.filter().apply(state.lock().inventory());
    match downloader::inventory_to_xlsx(&records) {
        Ok(bytes) => attachment(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "inventory.xlsx",
            bytes,
        ),
        Err(e) => internal_error(e.to_string()),
    }
}

async fn download_latest_upload(State(state): State<Arc<AppState>>) -> Response {
    let download = state.lock().latest_upload_download();
    match download {
        Some(Ok((name, json))) => attachment("application/json", &name, json),
        Some(Err(e)) => internal_error(e.to_string()),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn upload_sales(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    // Process the multipart form data
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(StatusMessage::error(format!("Malformed upload: {}", e))),
                )
                    .into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((file_name, bytes.to_vec())),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(StatusMessage::error(format!("Malformed upload: {}", e))),
                )
                    .into_response();
            }
        }
    }

    let Some((file_name, bytes)) = upload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(StatusMessage::error("No file data received")),
        )
            .into_response();
    };

    // Parse outside the lock; only the newest ticket gets applied.
    let ticket = state.lock().begin_upload(file_name.clone());
    let parsed = tokio::task::spawn_blocking(move || loader::load_upload(&file_name, &bytes))
        .await
        .unwrap_or_else(|e| Err(UploadError::ParseFailure(e.to_string())));
    let status = state.lock().complete_upload(ticket, parsed);

    let code = if status.is_success() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (code, Json(status)).into_response()
}
