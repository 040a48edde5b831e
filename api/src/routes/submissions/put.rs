use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::EntityTrait;

use db::error::DomainError;
use db::models::{
    submission::{Entity as SubmissionEntity, Model as SubmissionModel},
    submission_file::Model as SubmissionFileModel,
};

use super::common::{SubmissionResponse, read_grade_form, read_upload};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

/// PUT /api/submissions/{submission_id}
///
/// Re-submission while the record is open. Newly supplied files are appended
/// to whatever is already attached; they never replace it.
pub async fn update_submission(
    State(app_state): State<AppState>,
    Path(submission_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    mut multipart: Multipart,
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

    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(message) => return error_response(DomainError::Validation(message)),
    };
    if upload.is_empty() {
        return error_response(DomainError::Validation(
            "Provide content or at least one file".to_owned(),
        ));
    }

    let updated =
        match SubmissionModel::update_content(db, submission_id, upload.content.as_deref()).await {
            Ok(updated) => updated,
            Err(err) => return error_response(err),
        };

    for (filename, bytes) in &upload.files {
        if let Err(err) = SubmissionFileModel::attach(db, updated.id, filename, bytes).await {
            return error_response(err);
        }
    }

    match SubmissionResponse::load(db, updated).await {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiResponse::success(data, "Submission updated")),
        )
            .into_response(),
        Err(e) => error_response(DomainError::Db(e)),
    }
}

/// PUT /api/submissions/{submission_id}/grade (admin)
///
/// Multipart form: `score` (whole number) and optional `feedback`. Valid
/// from any prior status; re-invoking overwrites the previous grade.
pub async fn grade_submission(
    State(app_state): State<AppState>,
    Path(submission_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let db = app_state.db();

    let form = match read_grade_form(&mut multipart).await {
        Ok(form) => form,
        Err(message) => return error_response(DomainError::Validation(message)),
    };

    match SubmissionModel::grade(
        db,
        submission_id,
        claims.sub,
        form.score,
        form.feedback.as_deref(),
    )
    .await
    {
        Ok(graded) => match SubmissionResponse::load(db, graded).await {
            Ok(data) => (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Submission graded")),
            )
                .into_response(),
            Err(e) => error_response(DomainError::Db(e)),
        },
        Err(err) => error_response(err),
    }
}

/// PUT /api/submissions/{submission_id}/return (admin)
///
/// Sends a graded submission back for revision, reopening it for edits.
pub async fn return_submission(
    State(app_state): State<AppState>,
    Path(submission_id): Path<i64>,
) -> impl IntoResponse {
    let db = app_state.db();

    match SubmissionModel::return_for_revision(db, submission_id).await {
        Ok(returned) => match SubmissionResponse::load(db, returned).await {
            Ok(data) => (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Submission returned for revision")),
            )
                .into_response(),
            Err(e) => error_response(DomainError::Db(e)),
        },
        Err(err) => error_response(err),
    }
}
