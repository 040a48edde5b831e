use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use db::error::DomainError;
use db::models::submission::Model as SubmissionModel;

use super::common::SubmissionResponse;
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

/// GET /api/submissions/task/{task_id}/my
///
/// The caller's current submission for the task, or null when nothing has
/// been handed in yet — absence is not an error.
pub async fn my_submission(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    let db = app_state.db();

    match SubmissionModel::find_by_task_and_user(db, task_id, claims.sub).await {
        Ok(Some(submission)) => match SubmissionResponse::load(db, submission).await {
            Ok(data) => (
                StatusCode::OK,
                Json(ApiResponse::success(Some(data), "Submission retrieved")),
            )
                .into_response(),
            Err(e) => error_response(DomainError::Db(e)),
        },
        Ok(None) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                None::<SubmissionResponse>,
                "No submission yet",
            )),
        )
            .into_response(),
        Err(e) => error_response(DomainError::Db(e)),
    }
}

/// GET /api/submissions/task/{task_id} (admin)
///
/// Batch-grading list view. Shares its path with the student-facing submit,
/// so the role check lives here instead of a route layer.
pub async fn list_task_submissions(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    if !claims.admin {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error("Admin access required")),
        )
            .into_response();
    }

    let db = app_state.db();

    let submissions = match SubmissionModel::find_all_for_task(db, task_id).await {
        Ok(submissions) => submissions,
        Err(e) => return error_response(DomainError::Db(e)),
    };

    let mut data = Vec::with_capacity(submissions.len());
    for submission in submissions {
        match SubmissionResponse::load(db, submission).await {
            Ok(response) => data.push(response),
            Err(e) => return error_response(DomainError::Db(e)),
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(data, "Submissions retrieved")),
    )
        .into_response()
}
