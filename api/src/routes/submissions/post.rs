use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use db::error::DomainError;
use db::models::{
    submission::Model as SubmissionModel, submission_file::Model as SubmissionFileModel,
};

use super::common::{SubmissionResponse, read_upload};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

/// POST /api/submissions/task/{task_id}
///
/// First hand-in for (caller, task). Multipart body: optional `content`
/// text field plus any number of `files` file fields, at least one of the
/// two present. When a submission already exists the caller gets a conflict
/// and must go through update instead.
pub async fn submit_task(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();

    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(message) => return error_response(DomainError::Validation(message)),
    };
    if upload.is_empty() {
        return error_response(DomainError::Validation(
            "Provide content or at least one file".to_owned(),
        ));
    }

    let submission =
        match SubmissionModel::submit(db, task_id, claims.sub, upload.content.as_deref()).await {
            Ok(submission) => submission,
            Err(err) => return error_response(err),
        };

    for (filename, bytes) in &upload.files {
        if let Err(err) = SubmissionFileModel::attach(db, submission.id, filename, bytes).await {
            return error_response(err);
        }
    }

    match SubmissionResponse::load(db, submission).await {
        Ok(data) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(data, "Submission received")),
        )
            .into_response(),
        Err(e) => error_response(DomainError::Db(e)),
    }
}

/// POST /api/submissions/task/{task_id}/sweep (admin)
///
/// Deadline sweep: overdue handed-in work goes late, a missing placeholder
/// appears for every overdue assignment with nothing handed in.
pub async fn sweep_task(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
) -> impl IntoResponse {
    match SubmissionModel::sweep_overdue(app_state.db(), task_id, Utc::now()).await {
        Ok(outcome) => {
            let message = format!(
                "Sweep complete: {} late, {} missing",
                outcome.late, outcome.missing
            );
            (StatusCode::OK, Json(ApiResponse::success(outcome, message))).into_response()
        }
        Err(err) => error_response(err),
    }
}
