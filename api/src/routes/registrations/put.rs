//! Registration decision handlers.
//!
//! Single and bulk approval/rejection of pending registrations. The bulk
//! handler applies the single-item transition to each id sequentially, in
//! request order, isolating failures per item: one bad id never aborts the
//! remainder, and the caller gets an outcome per id.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use db::error::DomainError;
use db::models::registration::{Model as RegistrationModel, RegistrationStatus};

use super::common::RegistrationResponse;
use crate::response::ApiResponse;
use crate::routes::common::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

/// PUT /api/registrations/{registration_id}/status?status=approved|rejected (admin)
pub async fn update_status(
    State(app_state): State<AppState>,
    Path(registration_id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    let Ok(status) = RegistrationStatus::from_str(&query.status) else {
        return error_response(DomainError::Validation(format!(
            "Unknown registration status '{}'",
            query.status
        )));
    };

    match RegistrationModel::update_status(app_state.db(), registration_id, status).await {
        Ok(registration) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                RegistrationResponse::from(registration),
                "Registration status updated",
            )),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateStatusReq {
    pub ids: Vec<i64>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BulkItemOutcome {
    pub id: i64,
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct BulkUpdateStatusResponse {
    pub updated: u64,
    pub failed: u64,
    pub outcomes: Vec<BulkItemOutcome>,
}

/// PUT /api/registrations/bulk/status (admin)
///
/// Sequential per-id application of the single-item transition. Partial
/// failure does not roll back successes; the authoritative state is whatever
/// the outcome list says, and clients re-fetch after the batch.
pub async fn bulk_update_status(
    State(app_state): State<AppState>,
    Json(req): Json<BulkUpdateStatusReq>,
) -> impl IntoResponse {
    if req.ids.is_empty() {
        return error_response(DomainError::Validation(
            "No registrations selected".to_owned(),
        ));
    }
    let Ok(status) = RegistrationStatus::from_str(&req.status) else {
        return error_response(DomainError::Validation(format!(
            "Unknown registration status '{}'",
            req.status
        )));
    };

    let db = app_state.db();
    let mut response = BulkUpdateStatusResponse::default();

    for id in req.ids {
        match RegistrationModel::update_status(db, id, status.clone()).await {
            Ok(_) => {
                response.updated += 1;
                response.outcomes.push(BulkItemOutcome {
                    id,
                    success: true,
                    message: None,
                });
            }
            Err(err) => {
                response.failed += 1;
                response.outcomes.push(BulkItemOutcome {
                    id,
                    success: false,
                    message: Some(err.to_string()),
                });
            }
        }
    }

    let message = format!(
        "Updated {} registration(s), {} failed",
        response.updated, response.failed
    );
    (StatusCode::OK, Json(ApiResponse::success(response, message))).into_response()
}
