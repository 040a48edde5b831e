use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::EntityTrait;

use db::error::DomainError;
use db::models::submission::{Entity as SubmissionEntity, Model as SubmissionModel};

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

/// DELETE /api/submissions/{submission_id}
///
/// Removes the caller's own submission while it is still open. Once closed
/// the server refuses, whatever the client UI shows.
pub async fn delete_submission(
    State(app_state): State<AppState>,
    Path(submission_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    let db = app_state.db();

    match SubmissionEntity::find_by_id(submission_id).one(db).await {
        Ok(Some(submission)) if submission.user_id == claims.sub => {}
        Ok(Some(_)) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<()>::error("Forbidden")),
            )
                .into_response();
        }
        Ok(None) => return error_response(DomainError::NotFound("Submission")),
        Err(e) => return error_response(DomainError::Db(e)),
    }

    match SubmissionModel::remove(db, submission_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::<()>::success((), "Submission deleted")),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
