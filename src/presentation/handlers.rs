// HTTP request handlers
use crate::application::poller::{PageReport, PollStatus};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub page: &'static str,
    pub status: PollStatus,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl<V> From<&PageReport<V>> for PageSummary {
    fn from(report: &PageReport<V>) -> Self {
        Self {
            page: report.page,
            status: report.status,
            attempts: report.attempts,
            last_error: report.last_error.clone(),
        }
    }
}

/// Page state plus the view model once the page is ready.
#[derive(Debug, Serialize)]
pub struct PageResponse<'a, V> {
    #[serde(flatten)]
    pub summary: PageSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    /// Attempt that produced the installed snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_after: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<&'a V>,
}

impl<'a, V: Serialize> PageResponse<'a, V> {
    pub fn from_report(report: &'a PageReport<V>) -> Self {
        Self {
            summary: PageSummary::from(report),
            accepted_at: report.snapshot.as_ref().map(|s| s.accepted_at),
            accepted_after: report.snapshot.as_ref().map(|s| s.attempts),
            view: report.snapshot.as_ref().map(|s| &s.view),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Loading state of every page
pub async fn list_pages(State(state): State<Arc<AppState>>) -> Json<Vec<PageSummary>> {
    Json(vec![
        PageSummary::from(&state.overview.report()),
        PageSummary::from(&state.ml.report()),
    ])
}

/// One page, with its view model when ready
pub async fn get_page(Path(name): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    match name.as_str() {
        "overview" => {
            let report = state.overview.report();
            Json(PageResponse::from_report(&report)).into_response()
        }
        "ml" => {
            let report = state.ml.report();
            Json(PageResponse::from_report(&report)).into_response()
        }
        _ => (StatusCode::NOT_FOUND, format!("unknown page {}", name)).into_response(),
    }
}
