use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::error::CoreError;
use folio_db::DbError;
use serde::Serialize;

/// Error type returned by every handler.
///
/// Renders as `{"error": <message>, "code": <CODE>}`. Internal failures are
/// logged with their detail and answered with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request that is not a field validation failure
    /// (e.g. a missing id in an add-member body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => AppError::Core(core),
            DbError::Sqlx(db) => AppError::Database(db),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Missing(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

/// Unique violations on our named `uq_*` constraints are client conflicts
/// (two requests racing past the same explicit check); anything else from
/// the database is a 500.
fn database_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            match db_err.constraint().and_then(conflict_message) {
                Some(message) => (StatusCode::CONFLICT, "CONFLICT", message.to_string()),
                None => internal(db_err),
            }
        }
        other => internal(other),
    }
}

fn conflict_message(constraint: &str) -> Option<&'static str> {
    let message = match constraint {
        "uq_users_email" => "A user with this email already exists",
        "uq_competences_owner_name" => "You already have a competence with this name",
        "uq_portfolios_owner" => "You already have a portfolio",
        "uq_portfolios_slug" => "Portfolio slug is already taken, retry the request",
        "uq_portfolios_one_published_per_owner" => {
            "Another portfolio is already published for this user"
        }
        other if other.starts_with("uq_") => "Duplicate value",
        _ => return None,
    };
    Some(message)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match &self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };
        (status, axum::Json(ErrorBody { error, code })).into_response()
    }
}
