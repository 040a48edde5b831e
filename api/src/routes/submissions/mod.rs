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

pub fn submission_routes() -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/{submission_id}/grade", put(put::grade_submission))
        .route("/{submission_id}/return", put(put::return_submission))
        .route("/task/{task_id}/sweep", post(post::sweep_task))
        .route_layer(from_fn(allow_admin));

    Router::new()
        // the GET side of this path is the admin list view; the handler
        // checks the role itself since the POST side is open to students
        .route(
            "/task/{task_id}",
            post(post::submit_task).get(get::list_task_submissions),
        )
        .route("/task/{task_id}/my", get(get::my_submission))
        .route("/{submission_id}", put(put::update_submission))
        .route("/{submission_id}", delete(delete::delete_submission))
        .merge(admin_routes)
}
