use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::EntityTrait;

use db::models::{task::Entity as TaskEntity, task_assignment::Model as TaskAssignmentModel};

use super::common::{TaskAssignmentResponse, TaskResponse};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/tasks/{task_id}
pub async fn get_task(
    State(app_state): State<AppState>,
    Path(task_id): Path<i64>,
) -> impl IntoResponse {
    match TaskEntity::find_by_id(task_id).one(app_state.db()).await {
        Ok(Some(task)) => (
            StatusCode::OK,
            Json(ApiResponse::success(TaskResponse::from(task), "Task retrieved")),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Task not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch task");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve task")),
            )
                .into_response()
        }
    }
}

/// GET /api/tasks/assignments/my
pub async fn my_assignments(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match TaskAssignmentModel::find_all_for_user(app_state.db(), claims.sub).await {
        Ok(assignments) => {
            let data: Vec<TaskAssignmentResponse> = assignments
                .into_iter()
                .map(TaskAssignmentResponse::from)
                .collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Assignments retrieved")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list assignments");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve assignments")),
            )
                .into_response()
        }
    }
}
