use axum::{
    Router,
    routing::get,
};

use crate::state::AppState;

pub mod common;
pub mod get;
pub mod post;

pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get::list_activities).post(post::create_activity))
        .route("/{activity_id}", get(get::get_activity))
}
