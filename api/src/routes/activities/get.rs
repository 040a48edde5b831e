use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::EntityTrait;

use db::models::activity::Entity as ActivityEntity;

use super::common::ActivityResponse;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/activities
pub async fn list_activities(State(app_state): State<AppState>) -> impl IntoResponse {
    match ActivityEntity::find().all(app_state.db()).await {
        Ok(activities) => {
            let data: Vec<ActivityResponse> =
                activities.into_iter().map(ActivityResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Activities retrieved")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list activities");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve activities")),
            )
                .into_response()
        }
    }
}

/// GET /api/activities/{activity_id}
pub async fn get_activity(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> impl IntoResponse {
    match ActivityEntity::find_by_id(activity_id).one(app_state.db()).await {
        Ok(Some(activity)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ActivityResponse::from(activity),
                "Activity retrieved",
            )),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Activity not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch activity");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve activity")),
            )
                .into_response()
        }
    }
}
