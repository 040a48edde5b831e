use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use db::models::{task::Model as TaskModel, task_assignment::Model as TaskAssignmentModel};

use super::common::{TaskAssignmentResponse, TaskResponse};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{error_response, validation_error_response};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskReq {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "max_points must be positive"))]
    pub max_points: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

/// POST /api/tasks (admin)
pub async fn create_task(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateTaskReq>,
) -> impl IntoResponse {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match TaskModel::create(
        app_state.db(),
        &req.title,
        req.description.as_deref(),
        req.max_points,
        req.due_date,
        claims.sub,
    )
    .await
    {
        Ok(task) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(TaskResponse::from(task), "Task created")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to create task");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to create task")),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskReq {
    pub user_id: i64,
    pub submission_deadline: Option<DateTime<Utc>>,
}

/// POST /api/tasks/{task_id}/assignments (admin)
pub async fn assign_task(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(req): Json<AssignTaskReq>,
) -> impl IntoResponse {
    match TaskAssignmentModel::assign(
        app_state.db(),
        task_id,
        req.user_id,
        req.submission_deadline,
    )
    .await
    {
        Ok(assignment) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                TaskAssignmentResponse::from(assignment),
                "Task assigned",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
