use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use db::models::registration::Model as RegistrationModel;

use super::common::RegistrationResponse;
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

/// DELETE /api/registrations/activity/{activity_id}
///
/// Cancels the caller's own pending registration. Cancellation is a
/// terminal status transition, not row removal.
pub async fn cancel_registration(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match RegistrationModel::cancel_by_activity(app_state.db(), activity_id, claims.sub).await {
        Ok(registration) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                RegistrationResponse::from(registration),
                "Registration cancelled",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
