use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use downnote_core::error::CoreError;
use downnote_core::restore::RestoreFailure;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`RestoreFailure`] for
/// restores that stopped part-way.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `downnote_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A restore that stopped part-way. The response names the step.
    #[error(transparent)]
    Restore(#[from] RestoreFailure),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Restore(failure) => classify_core_error(&failure.error),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let AppError::Restore(failure) = &self {
            body["step"] = json!(failure.step);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a core error into an HTTP status, error code, and message.
///
/// Missing documents, foreign documents and snapshots of other documents all
/// share the `NOT_FOUND` shape.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::StoreUnavailable(msg) => {
            tracing::warn!(error = %msg, "Document store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Document storage is temporarily unavailable".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}
