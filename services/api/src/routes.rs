use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use lender_match::error::AppError;
use lender_match::matching::{
    underwriting_router, ApplicationRepository, Lender, LenderCatalog, LoanApplication,
    MatchResult, MatchResultStore, UnderwritingError, UnderwritingService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct MatchPreviewRequest {
    pub(crate) application: LoanApplication,
    /// Lenders to match against; the loaded catalog is used when omitted.
    #[serde(default)]
    pub(crate) lenders: Option<Vec<Lender>>,
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatchPreviewResponse {
    pub(crate) as_of: NaiveDate,
    pub(crate) total_lenders: usize,
    pub(crate) eligible_count: usize,
    pub(crate) unknown_rule_types: Vec<String>,
    pub(crate) results: Vec<MatchResult>,
}

pub(crate) fn with_service_routes<A, L, M>(
    service: Arc<UnderwritingService<A, L, M>>,
) -> axum::Router
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    underwriting_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/match/preview",
            axum::routing::post(match_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Rank lenders for an application without storing it or its results.
pub(crate) async fn match_preview_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<MatchPreviewRequest>,
) -> Result<Json<MatchPreviewResponse>, AppError> {
    let MatchPreviewRequest {
        application,
        lenders,
        as_of,
    } = payload;

    let lenders = match lenders {
        Some(lenders) => lenders,
        None => state
            .catalog
            .active_lenders()
            .map_err(UnderwritingError::from)?,
    };
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let unknown_rule_types = state.engine.registry().unknown_rule_types(&lenders);
    let results = state
        .engine
        .match_application(&application, &lenders, as_of)
        .map_err(UnderwritingError::from)?;

    Ok(Json(MatchPreviewResponse {
        as_of,
        total_lenders: results.len(),
        eligible_count: results.iter().filter(|result| result.is_eligible).count(),
        unknown_rule_types,
        results,
    }))
}
