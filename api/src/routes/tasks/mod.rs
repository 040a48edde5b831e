use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};

use crate::auth::guards::allow_admin;
use crate::state::AppState;

pub mod common;
pub mod get;
pub mod post;
pub mod put;

pub fn task_routes() -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/", post(post::create_task))
        .route("/{task_id}/assignments", post(post::assign_task))
        .route_layer(from_fn(allow_admin));

    Router::new()
        .route("/{task_id}", get(get::get_task))
        .route("/assignments/my", get(get::my_assignments))
        .route("/assignments/{assignment_id}/status", put(put::update_assignment_status))
        .merge(admin_routes)
}
