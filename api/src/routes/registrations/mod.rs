use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};

use crate::auth::guards::allow_admin;
use crate::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

pub fn registration_routes() -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/{registration_id}/status", put(put::update_status))
        .route("/bulk/status", put(put::bulk_update_status))
        .route(
            "/activities/{activity_id}/report",
            get(get::participation_report),
        )
        .route_layer(from_fn(allow_admin));

    Router::new()
        .route("/", post(post::create_registration))
        .route("/my", get(get::my_registrations))
        .route("/check/{activity_id}", get(get::check_registration))
        .route("/check-in", post(post::check_in))
        .route("/activity/{activity_id}", delete(delete::cancel_registration))
        .route(
            "/activity/{activity_id}/participation",
            post(post::record_participation),
        )
        .merge(admin_routes)
}
