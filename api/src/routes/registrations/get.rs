use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use db::models::{
    participation::Model as ParticipationModel, registration::Model as RegistrationModel,
};

use super::common::RegistrationResponse;
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/registrations/my
pub async fn my_registrations(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match RegistrationModel::find_all_for_user(app_state.db(), claims.sub).await {
        Ok(registrations) => {
            let data: Vec<RegistrationResponse> = registrations
                .into_iter()
                .map(RegistrationResponse::from)
                .collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Registrations retrieved")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list registrations");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve registrations")),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct CheckRegistrationResponse {
    pub status: Option<String>,
    pub registration_id: Option<i64>,
}

/// GET /api/registrations/check/{activity_id}
///
/// Absence is a valid answer: `status` stays null when the caller never
/// registered for the activity.
pub async fn check_registration(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match RegistrationModel::find_by_user_and_activity(app_state.db(), claims.sub, activity_id)
        .await
    {
        Ok(registration) => {
            let data = match registration {
                Some(r) => CheckRegistrationResponse {
                    status: Some(r.status.to_string()),
                    registration_id: Some(r.id),
                },
                None => CheckRegistrationResponse::default(),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Registration status retrieved")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to check registration");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    "Failed to check registration status",
                )),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipationReportResponse {
    pub attended: Vec<i64>,
    pub not_attended: Vec<i64>,
}

/// GET /api/registrations/activities/{activity_id}/report (admin)
///
/// Attendance is derived from the participation event stream over the
/// activity's approved registrations.
pub async fn participation_report(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> impl IntoResponse {
    match ParticipationModel::report_for_activity(app_state.db(), activity_id).await {
        Ok((attended, not_attended)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ParticipationReportResponse {
                    attended,
                    not_attended,
                },
                "Participation report generated",
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to build participation report");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    "Failed to generate participation report",
                )),
            )
                .into_response()
        }
    }
}
