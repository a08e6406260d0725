//! HTTP surface for the dashboard: read-only reports plus categorization.

use anyhow::{Context, Result};
use axum::{
    extract::{Json, Query, State},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use bookkeep_ingest::OutputLayout;
use bookkeep_report::ReceiptQuery;

use crate::responses::{self, CategorizeRequest};

#[derive(Clone)]
pub struct AppState {
    pub layout: OutputLayout,
    pub categories: Vec<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/bank-statements", get(bank_statements))
        .route("/api/receipts", get(receipts))
        .route("/api/invoices", get(invoices))
        .route("/debug/bank-statements", get(debug_bank_statements))
        .route("/debug/receipts", get(debug_receipts))
        .route("/categorize", post(categorize))
}

pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    tracing::info!("Listening on {}", bind);
    axum::serve(listener, routes().with_state(state))
        .await
        .context("http server")?;
    Ok(())
}

/// File loading is blocking; keep it off the async workers
async fn blocking<F>(f: F) -> Json<Value>
where
    F: FnOnce() -> Value + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(v) => Json(v),
        Err(e) => {
            tracing::error!("Load task failed: {}", e);
            Json(responses::error(format!("internal error: {e}")))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "build": env!("BOOKKEEP_BUILD_SHA"),
        "output_dir": state.layout.root().display().to_string(),
    }))
}

async fn bank_statements(State(state): State<AppState>) -> Json<Value> {
    blocking(move || responses::bank_statements(&state.layout)).await
}

async fn receipts(State(state): State<AppState>, Query(query): Query<ReceiptQuery>) -> Json<Value> {
    blocking(move || responses::receipts(&state.layout, &query)).await
}

async fn invoices(State(state): State<AppState>) -> Json<Value> {
    blocking(move || responses::invoices(&state.layout)).await
}

async fn debug_bank_statements(State(state): State<AppState>) -> Json<Value> {
    blocking(move || responses::debug_statements(&state.layout)).await
}

async fn debug_receipts(State(state): State<AppState>) -> Json<Value> {
    blocking(move || responses::debug_receipts(&state.layout)).await
}

async fn categorize(
    State(state): State<AppState>,
    Json(req): Json<CategorizeRequest>,
) -> Json<Value> {
    Json(responses::categorize_request(&req, &state.categories))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(root: &std::path::Path) -> AppState {
        AppState {
            layout: OutputLayout::new(root),
            categories: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_health_reports_output_root() {
        let root = tempfile::tempdir().unwrap();
        let Json(body) = health(State(state(root.path()))).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["output_dir"], root.path().display().to_string());
        assert!(!body["build"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_missing_output_reports_error_body() {
        let root = tempfile::tempdir().unwrap();
        let Json(body) = bank_statements(State(state(&root.path().join("output")))).await;
        assert!(body["error"].is_string());
    }
}
