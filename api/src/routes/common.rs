use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use db::error::DomainError;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Maps a domain failure onto a status code and the standard envelope.
///
/// Handlers dispatch on the error variant; the message text is presentation
/// only. Transport-level failures are logged here and surfaced generically.
pub fn error_response(err: DomainError) -> Response {
    let status = match &err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Db(_) | DomainError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Conflict(_)
        | DomainError::InvalidState(_)
        | DomainError::NotApproved
        | DomainError::WindowClosed
        | DomainError::AlreadyCheckedIn => StatusCode::CONFLICT,
    };

    let message = match &err {
        DomainError::Db(e) => {
            tracing::error!(error = %e, "database failure");
            "Internal server error".to_owned()
        }
        DomainError::Io(e) => {
            tracing::error!(error = %e, "storage failure");
            "Internal server error".to_owned()
        }
        other => other.to_string(),
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid value"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shorthand for the 422 produced by request-body validation.
pub fn validation_error_response(errors: &ValidationErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()>::error(format_validation_errors(errors))),
    )
        .into_response()
}
