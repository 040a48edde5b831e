use api::routes::routes;
use api::state::AppState;
use axum::Router;
use common::config::AppConfig;

/// Builds the full router over a fresh in-memory database.
///
/// Config overrides are process-global and idempotent, so concurrent tests
/// always see the same values.
pub async fn make_test_app() -> (Router, AppState) {
    AppConfig::set_jwt_secret("test-secret");
    AppConfig::set_jwt_duration_minutes(60);
    let storage = std::env::temp_dir().join("activity-hub-test-storage");
    AppConfig::set_storage_root(storage.to_string_lossy().to_string());

    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db);

    let app = Router::new().nest("/api", routes(app_state.clone()));
    (app, app_state)
}
