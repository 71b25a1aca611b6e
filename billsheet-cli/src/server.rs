//! HTTP upload service: accept a PDF statement, answer with the parsed report.

use anyhow::Result;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use billsheet_ingest::{PdfSource, StatementParser, StatementSource};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::ServerSection;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
pub struct AppState {
    pub parser: Arc<StatementParser>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Parse(String),
}

impl ApiError {
    fn bad_request(msg: &str) -> Self {
        Self::BadRequest(msg.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response(),
            ApiError::Multipart(e) => (e.status(), Json(json!({ "error": e.body_text() }))).into_response(),
            ApiError::Parse(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": msg })),
            )
                .into_response(),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bill-parser",
        "build": env!("BILLSHEET_BUILD_SHA"),
    }))
}

fn is_pdf(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("no file uploaded"))?;
    if filename.trim().is_empty() {
        return Err(ApiError::bad_request("no file selected"));
    }
    if !is_pdf(&filename) {
        return Err(ApiError::bad_request("only PDF files are supported"));
    }

    info!(filename = %filename, bytes = bytes.len(), "statement uploaded");

    let parser = state.parser.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let statement = PdfSource::Bytes(bytes).extract()?;
        Ok::<_, anyhow::Error>(parser.parse(&statement))
    })
    .await
    .map_err(|e| {
        error!("parse task failed: {}", e);
        ApiError::Parse(format!("parse task failed: {}", e))
    })?
    .map_err(|e| {
        warn!(filename = %filename, "extraction failed: {:#}", e);
        ApiError::Parse(format!("{:#}", e))
    })?;

    info!(
        filename = %filename,
        transactions = outcome.report.transactions.len(),
        rejected = outcome.stats.rejections.len(),
        "statement parsed"
    );

    Ok(Json(json!({
        "success": true,
        "filename": filename,
        "data": outcome.report,
    })))
}

pub async fn serve(server: &ServerSection, parser: StatementParser) -> Result<()> {
    let state = AppState {
        parser: Arc::new(parser),
    };
    let app = router(state, server.max_upload_bytes());

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "billsheet-test-boundary";

    fn app() -> Router {
        let state = AppState {
            parser: Arc::new(StatementParser::cmb_credit().unwrap()),
        };
        router(state, 1024 * 1024)
    }

    fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf("statement.pdf"));
        assert!(is_pdf("STATEMENT.PDF"));
        assert!(!is_pdf("statement.csv"));
        assert!(!is_pdf("pdf"));
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "bill-parser");
    }

    #[tokio::test]
    async fn test_index_page() {
        let resp = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/api/upload"));
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let resp = app()
            .oneshot(upload_request(multipart_body("other", "a.pdf", b"x")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "no file uploaded");
    }

    #[tokio::test]
    async fn test_upload_empty_filename() {
        let resp = app()
            .oneshot(upload_request(multipart_body("file", "", b"x")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "no file selected");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let resp = app()
            .oneshot(upload_request(multipart_body("file", "statement.csv", b"a,b\n")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "only PDF files are supported");
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_server_error() {
        let resp = app()
            .oneshot(upload_request(multipart_body("file", "statement.pdf", b"not a pdf")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}
