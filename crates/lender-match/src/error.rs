use crate::config::ConfigError;
use crate::matching::service::UnderwritingError;
use crate::matching::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Catalog(serde_json::Error),
    Underwriting(UnderwritingError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Catalog(err) => write!(f, "lender catalog error: {}", err),
            AppError::Underwriting(err) => write!(f, "underwriting error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Underwriting(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Catalog(_)
            | AppError::Underwriting(
                UnderwritingError::Rule(_) | UnderwritingError::StatusNotSettable(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Underwriting(
                UnderwritingError::NotFound(_)
                | UnderwritingError::LenderNotFound(_)
                | UnderwritingError::Repository(RepositoryError::NotFound),
            ) => StatusCode::NOT_FOUND,
            AppError::Underwriting(
                UnderwritingError::AlreadyRunning(_)
                | UnderwritingError::Withdrawn(_)
                | UnderwritingError::Repository(RepositoryError::Conflict),
            ) => StatusCode::CONFLICT,
            AppError::Underwriting(UnderwritingError::Repository(RepositoryError::Unavailable(
                _,
            ))) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Catalog(value)
    }
}

impl From<UnderwritingError> for AppError {
    fn from(value: UnderwritingError) -> Self {
        Self::Underwriting(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::ApplicationId;

    #[test]
    fn maps_underwriting_errors_to_status_codes() {
        let missing = AppError::from(UnderwritingError::NotFound(ApplicationId("app-9".into())));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let busy = AppError::from(UnderwritingError::AlreadyRunning(ApplicationId("app-9".into())));
        assert_eq!(busy.into_response().status(), StatusCode::CONFLICT);

        let offline = AppError::from(UnderwritingError::Repository(RepositoryError::Unavailable(
            "offline".to_string(),
        )));
        assert_eq!(
            offline.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn catalog_errors_render_as_unprocessable() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let error = AppError::from(parse);
        assert!(error.to_string().starts_with("lender catalog error"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
