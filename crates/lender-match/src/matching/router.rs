use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus, Lender, LenderId, LoanApplication};
use super::repository::{
    ApplicationRepository, ApplicationStatusView, LenderCatalog, MatchResultStore,
    RepositoryError,
};
use super::service::{UnderwritingError, UnderwritingService};

type SharedService<A, L, M> = Arc<UnderwritingService<A, L, M>>;

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    pub(crate) status: ApplicationStatus,
}

/// Router builder exposing application intake, underwriting, and catalog endpoints.
pub fn underwriting_router<A, L, M>(service: SharedService<A, L, M>) -> Router
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<A, L, M>))
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<A, L, M>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(status_handler::<A, L, M>),
        )
        .route(
            "/api/v1/applications/:application_id/underwrite",
            post(underwrite_handler::<A, L, M>),
        )
        .route(
            "/api/v1/applications/:application_id/results",
            get(results_handler::<A, L, M>),
        )
        .route(
            "/api/v1/lenders",
            get(list_lenders_handler::<A, L, M>).post(register_lender_handler::<A, L, M>),
        )
        .route(
            "/api/v1/lenders/:lender_id",
            get(lender_handler::<A, L, M>),
        )
        .route("/api/v1/rule-types", get(rule_types_handler::<A, L, M>))
        .with_state(service)
}

fn error_response(error: UnderwritingError) -> Response {
    let status = match &error {
        UnderwritingError::NotFound(_)
        | UnderwritingError::LenderNotFound(_)
        | UnderwritingError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        UnderwritingError::AlreadyRunning(_)
        | UnderwritingError::Withdrawn(_)
        | UnderwritingError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        UnderwritingError::Rule(_) | UnderwritingError::StatusNotSettable(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        UnderwritingError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Json(application): Json<LoanApplication>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.submit(application) {
        Ok(stored) => {
            let view = ApplicationStatusView::from(&stored);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Path(application_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.set_status(&ApplicationId(application_id), change.status) {
        Ok(application) => {
            let view = ApplicationStatusView::from(&application);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn underwrite_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.underwrite(&ApplicationId(application_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn results_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.results(&ApplicationId(application_id)) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_lenders_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.lenders() {
        Ok(lenders) => (StatusCode::OK, Json(lenders)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn lender_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Path(lender_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.lender(&LenderId(lender_id)) {
        Ok(lender) => (StatusCode::OK, Json(lender)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_lender_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
    Json(lender): Json<Lender>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    match service.register_lender(lender) {
        Ok(registration) => (StatusCode::CREATED, Json(registration)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rule_types_handler<A, L, M>(
    State(service): State<SharedService<A, L, M>>,
) -> Response
where
    A: ApplicationRepository + 'static,
    L: LenderCatalog + 'static,
    M: MatchResultStore + 'static,
{
    (StatusCode::OK, Json(service.supported_rule_types())).into_response()
}
