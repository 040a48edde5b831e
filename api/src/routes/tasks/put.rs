use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sea_orm::EntityTrait;
use serde::Deserialize;
use std::str::FromStr;

use db::error::DomainError;
use db::models::task_assignment::{
    AssignmentStatus, Entity as TaskAssignmentEntity, Model as TaskAssignmentModel,
};

use super::common::TaskAssignmentResponse;
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentStatusReq {
    pub status: String,
}

/// PUT /api/tasks/assignments/{assignment_id}/status
///
/// Progress transitions on the caller's own assignment (admins may move any).
/// Progress is independent of grading; completing an assignment closes the
/// associated submission for edits.
pub async fn update_assignment_status(
    State(app_state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<UpdateAssignmentStatusReq>,
) -> impl IntoResponse {
    let db = app_state.db();

    let Ok(status) = AssignmentStatus::from_str(&req.status) else {
        return error_response(DomainError::Validation(format!(
            "Unknown assignment status '{}'",
            req.status
        )));
    };

    match TaskAssignmentEntity::find_by_id(assignment_id).one(db).await {
        Ok(Some(assignment)) if assignment.user_id == claims.sub || claims.admin => {}
        Ok(Some(_)) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<()>::error("Forbidden")),
            )
                .into_response();
        }
        Ok(None) => return error_response(DomainError::NotFound("Task assignment")),
        Err(e) => return error_response(DomainError::Db(e)),
    }

    match TaskAssignmentModel::set_status(db, assignment_id, status, Utc::now()).await {
        Ok(assignment) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                TaskAssignmentResponse::from(assignment),
                "Assignment status updated",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
