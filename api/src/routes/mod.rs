//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Liveness check (public)
//! - `/auth` → Login (public)
//! - `/activities` → Activity catalogue (authenticated; creation is admin-only)
//! - `/registrations` → Registration/participation tracker (authenticated)
//! - `/tasks` → Tasks and task assignments (authenticated)
//! - `/submissions` → Submission/grading tracker (authenticated)

use crate::auth::guards::allow_authenticated;
use crate::routes::{
    activities::activity_routes, auth::auth_routes, health::health_routes,
    registrations::registration_routes, submissions::submission_routes, tasks::task_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod activities;
pub mod auth;
pub mod common;
pub mod health;
pub mod registrations;
pub mod submissions;
pub mod tasks;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/activities",
            activity_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/registrations",
            registration_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/tasks",
            task_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/submissions",
            submission_routes().route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
