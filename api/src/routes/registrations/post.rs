use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use std::str::FromStr;

use db::error::DomainError;
use db::models::{
    participation::{Model as ParticipationModel, ParticipationType},
    registration::Model as RegistrationModel,
};

use super::common::{ParticipationResponse, RegistrationResponse};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRegistrationReq {
    pub activity_id: i64,
    pub feedback: Option<String>,
}

/// POST /api/registrations
///
/// Creates a pending registration for the caller. A second registration for
/// the same activity is refused with a conflict, whatever its status.
pub async fn create_registration(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateRegistrationReq>,
) -> impl IntoResponse {
    match RegistrationModel::register(
        app_state.db(),
        req.activity_id,
        claims.sub,
        req.feedback.as_deref(),
    )
    .await
    {
        Ok(registration) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                RegistrationResponse::from(registration),
                "Registration submitted",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordParticipationReq {
    pub participation_type: String,
    pub points_earned: Option<i64>,
    pub notes: Option<String>,
}

/// POST /api/registrations/activity/{activity_id}/participation
///
/// Appends a participation event. Requires an approved registration and the
/// activity to be running right now.
pub async fn record_participation(
    State(app_state): State<AppState>,
    Path(activity_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<RecordParticipationReq>,
) -> impl IntoResponse {
    let Ok(participation_type) = ParticipationType::from_str(&req.participation_type) else {
        return error_response(DomainError::Validation(format!(
            "Unknown participation type '{}'",
            req.participation_type
        )));
    };

    match ParticipationModel::record(
        app_state.db(),
        activity_id,
        claims.sub,
        participation_type,
        req.points_earned,
        req.notes.as_deref(),
        Utc::now(),
    )
    .await
    {
        Ok(participation) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                ParticipationResponse::from(participation),
                "Participation recorded",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckInReq {
    pub code: String,
}

/// POST /api/registrations/check-in
///
/// Check-in by opaque ticket code. The failure causes are distinct error
/// variants, so the tailored user message is chosen by a `match`, never by
/// inspecting message text.
pub async fn check_in(
    State(app_state): State<AppState>,
    Extension(AuthUser(_claims)): Extension<AuthUser>,
    Json(req): Json<CheckInReq>,
) -> impl IntoResponse {
    match ParticipationModel::check_in_by_code(app_state.db(), &req.code, Utc::now()).await {
        Ok(participation) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ParticipationResponse::from(participation),
                "Checked in",
            )),
        )
            .into_response(),
        Err(DomainError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Invalid or unknown check-in code")),
        )
            .into_response(),
        Err(DomainError::AlreadyCheckedIn) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<()>::error(
                "You have already checked in for this activity",
            )),
        )
            .into_response(),
        Err(DomainError::NotApproved) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<()>::error(
                "Your registration has not been approved",
            )),
        )
            .into_response(),
        Err(DomainError::WindowClosed) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<()>::error(
                "This activity is not currently running",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
