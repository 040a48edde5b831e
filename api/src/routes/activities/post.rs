use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use db::models::activity::Model as ActivityModel;

use super::common::ActivityResponse;
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::validation_error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityReq {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// POST /api/activities (admin)
pub async fn create_activity(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateActivityReq>,
) -> impl IntoResponse {
    if !claims.admin {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error("Admin access required")),
        )
            .into_response();
    }
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }
    if req.ends_at <= req.starts_at {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error("ends_at must be after starts_at")),
        )
            .into_response();
    }

    match ActivityModel::create(
        app_state.db(),
        &req.title,
        req.description.as_deref(),
        req.location.as_deref(),
        req.starts_at,
        req.ends_at,
        claims.sub,
    )
    .await
    {
        Ok(activity) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                ActivityResponse::from(activity),
                "Activity created",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to create activity");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to create activity")),
            )
                .into_response()
        }
    }
}
