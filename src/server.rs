use crate::config::AppConfig;
use crate::data;
use crate::page::INDEX_HTML;
use crate::render::{self, MapView};
use crate::types::{FileIssue, NamedUpload};
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub crs: String,
    pub records: usize,
    pub skipped_rows: usize,
}

/// Everything one render cycle produces: the sidebar readout, per-file
/// errors, the aggregate warning, and the map payload (absent when nothing
/// valid was uploaded).
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub datasets: Vec<DatasetSummary>,
    pub issues: Vec<FileIssue>,
    pub empty_warning: bool,
    pub map: Option<MapView>,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let state = Arc::new(config);

    // Uploads have no size bound; the whole batch is materialized in memory
    // for the duration of the request.
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/api/render", post(render_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// The client re-posts every chosen file plus its current selection on each
/// interaction, so the dataset collection is rebuilt from scratch per request
/// and the server keeps no session state.
async fn render_handler(
    State(config): State<Arc<AppConfig>>,
    mut multipart: Multipart,
) -> Result<Json<RenderResponse>, (StatusCode, String)> {
    let mut uploads: Vec<NamedUpload> = Vec::new();
    let mut selection: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field.bytes().await.map_err(bad_request)?;
                uploads.push(NamedUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("layers") => {
                let text = field.text().await.map_err(bad_request)?;
                selection = serde_json::from_str(&text).map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Invalid layer selection: {}", e),
                    )
                })?;
            }
            _ => {}
        }
    }

    Ok(Json(build_response(&config, &uploads, &selection)))
}

pub fn build_response(
    config: &AppConfig,
    uploads: &[NamedUpload],
    selection: &[String],
) -> RenderResponse {
    let outcome = data::ingest_uploads(uploads);

    // The warning fires only when files were uploaded and none survived;
    // an empty upload set is just a blank dashboard.
    let empty_warning = !uploads.is_empty() && outcome.datasets.is_empty();

    let map = if outcome.datasets.is_empty() {
        None
    } else {
        Some(render::build_map(config, &outcome, selection))
    };

    let datasets = outcome
        .datasets
        .iter()
        .map(|d| DatasetSummary {
            name: d.name.clone(),
            crs: d.crs.to_string(),
            records: d.records.len(),
            skipped_rows: d.skipped_rows,
        })
        .collect();

    RenderResponse {
        datasets,
        issues: outcome.issues,
        empty_warning,
        map,
    }
}

fn bad_request(err: axum::extract::multipart::MultipartError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Invalid upload: {}", err))
}
