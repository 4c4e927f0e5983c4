//! HTTP front end
//!
//! | Route | Parameters |
//! |-------|------------|
//! | `GET /keypress` | `key`, `layout`, `downtime`, `interval` |
//! | `GET /type` | `text`, `newline`, `layout`, `downtime`, `interval` |
//! | `GET /layouts` | none |
//!
//! Timing parameters are milliseconds. Missing or non-numeric values fall back
//! to the configured defaults. Any other path answers `404 Not Found`.

use crate::error::KeypressError;
use crate::gateway::{Gateway, KeypressOptions};
use crate::keyboard::{Clock, KeypressResult, ReportSink};
use crate::report::KeypressReport;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Query parameters of `/keypress`
#[derive(Debug, Default, Deserialize)]
pub struct KeypressParams {
    pub key: Option<String>,
    pub layout: Option<String>,
    pub downtime: Option<String>,
    pub interval: Option<String>,
}

/// Query parameters of `/type`
#[derive(Debug, Default, Deserialize)]
pub struct TypeParams {
    pub text: Option<String>,
    pub newline: Option<String>,
    pub layout: Option<String>,
    pub downtime: Option<String>,
    pub interval: Option<String>,
}

/// Build the router for a gateway
pub fn router<S, C>(gateway: Arc<Gateway<S, C>>) -> Router
where
    S: ReportSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/keypress", get(keypress::<S, C>))
        .route("/type", get(type_text::<S, C>))
        .route("/layouts", get(layouts::<S, C>))
        .fallback(not_found)
        .with_state(gateway)
}

/// Serve until Ctrl-C
pub async fn serve<S, C>(gateway: Arc<Gateway<S, C>>, addr: SocketAddr) -> io::Result<()>
where
    S: ReportSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

async fn keypress<S, C>(
    State(gateway): State<Arc<Gateway<S, C>>>,
    Query(params): Query<KeypressParams>,
) -> Response
where
    S: ReportSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    let key = params.key.unwrap_or_default();
    log::info!("GET /keypress key={:?}", key);
    let options = options(params.layout, params.downtime, params.interval);
    run(gateway, options, move |gw, opts| gw.single_keypress(&key, opts)).await
}

async fn type_text<S, C>(
    State(gateway): State<Arc<Gateway<S, C>>>,
    Query(params): Query<TypeParams>,
) -> Response
where
    S: ReportSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    let text = params.text.unwrap_or_default();
    let newline = parse_flag(params.newline.as_deref());
    log::info!("GET /type chars={} newline={}", text.chars().count(), newline);
    let options = options(params.layout, params.downtime, params.interval);
    run(gateway, options, move |gw, opts| gw.type_text(&text, newline, opts)).await
}

async fn layouts<S, C>(State(gateway): State<Arc<Gateway<S, C>>>) -> Response
where
    S: ReportSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
{
    Json(json!({
        "default": gateway.default_layout(),
        "layouts": gateway.keymaps().layout_names(),
    }))
    .into_response()
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html; charset=utf8")],
        "404 Not Found\n",
    )
        .into_response()
}

/// Sequence on a blocking worker; the sequencer sleeps in real time
async fn run<S, C, F>(gateway: Arc<Gateway<S, C>>, options: KeypressOptions, op: F) -> Response
where
    S: ReportSink + Send + 'static,
    C: Clock + Send + Sync + 'static,
    F: FnOnce(&Gateway<S, C>, &KeypressOptions) -> Result<KeypressResult, KeypressError>
        + Send
        + 'static,
{
    let layout = options
        .layout
        .clone()
        .unwrap_or_else(|| gateway.default_layout().to_string());
    let started = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || op(&gateway, &options)).await;
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(result)) => {
            (StatusCode::OK, Json(KeypressReport::new(&result, &layout, elapsed))).into_response()
        }
        Ok(Err(err)) => error_response(err, &layout, elapsed),
        Err(join_err) => {
            log::error!("keypress worker failed: {}", join_err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "keypress worker failed" })),
            )
                .into_response()
        }
    }
}

fn error_response(err: KeypressError, layout: &str, elapsed: Duration) -> Response {
    let message = error_message(&err);
    let (status, completed, held) = match err {
        KeypressError::UnknownLayout(_) | KeypressError::InvalidKey(_) => {
            log::warn!("rejected request: {}", message);
            (StatusCode::BAD_REQUEST, KeypressResult::default(), None)
        }
        KeypressError::DeviceWrite {
            completed, held, ..
        } => {
            log::error!("request failed: {}", message);
            (StatusCode::INTERNAL_SERVER_ERROR, completed, held)
        }
    };
    let mut report = KeypressReport::new(&completed, layout, elapsed).with_error(message);
    if let Some(held) = held {
        report = report.with_held(held);
    }
    (status, Json(report)).into_response()
}

/// Error text followed by its source chain, `: `-separated
fn error_message(err: &KeypressError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

fn options(
    layout: Option<String>,
    downtime: Option<String>,
    interval: Option<String>,
) -> KeypressOptions {
    KeypressOptions {
        layout: layout.filter(|l| !l.is_empty()),
        downtime_ms: parse_ms(downtime.as_deref()),
        interval_ms: parse_ms(interval.as_deref()),
    }
}

/// Milliseconds from a query value; `None` when missing or not a number
fn parse_ms(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}
