mod helpers;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use api::auth::generate_jwt;
use db::models::{
    activity::Model as ActivityModel,
    registration::{Model as RegistrationModel, RegistrationStatus},
    user::Model as UserModel,
};
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::helpers::{app::make_test_app, read_json};

struct TestCtx {
    admin: UserModel,
    student: UserModel,
    activity: ActivityModel,
}

async fn setup(db: &DatabaseConnection) -> TestCtx {
    let admin = UserModel::create(db, "reg_admin", "reg_admin@test.com", "password", true)
        .await
        .unwrap();
    let student = UserModel::create(db, "reg_student", "reg_student@test.com", "password", false)
        .await
        .unwrap();

    let now = Utc::now();
    let activity = ActivityModel::create(
        db,
        "Orientation Week",
        Some("Campus tour and talks"),
        Some("Main Hall"),
        now - Duration::hours(1),
        now + Duration::hours(2),
        admin.id,
    )
    .await
    .unwrap();

    TestCtx {
        admin,
        student,
        activity,
    }
}

fn json_request(method: &str, uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &Router, token: &str, activity_id: i64) -> Value {
    let body = serde_json::json!({ "activity_id": activity_id });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/registrations", token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

#[tokio::test]
async fn test_register_creates_pending() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let json = register(&app, &token, ctx.activity.id).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["activity_id"], ctx.activity.id);
    assert!(json["data"]["attendance_code"].as_str().is_some());
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    register(&app, &token, ctx.activity.id).await;

    let body = serde_json::json!({ "activity_id": ctx.activity.id });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/registrations", &token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = read_json(resp).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_cancel_pending_then_cancel_again() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    register(&app, &token, ctx.activity.id).await;

    let uri = format!("/api/registrations/activity/{}", ctx.activity.id);
    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["status"], "cancelled");

    // cancelled is terminal
    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_approved_is_refused() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = register(&app, &student_token, ctx.activity.id).await;
    let registration_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/registrations/{registration_id}/status?status=approved");
    let resp = app
        .clone()
        .oneshot(empty_request("PUT", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let uri = format!("/api/registrations/activity/{}", ctx.activity.id);
    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, &student_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // status unchanged
    let reg =
        RegistrationModel::find_by_user_and_activity(app_state.db(), ctx.student.id, ctx.activity.id)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(reg.status, RegistrationStatus::Approved);
}

#[tokio::test]
async fn test_update_status_requires_admin() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);

    let json = register(&app, &student_token, ctx.activity.id).await;
    let registration_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/registrations/{registration_id}/status?status=approved");
    let resp = app
        .clone()
        .oneshot(empty_request("PUT", &uri, &student_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_status_from_decided_state_is_refused() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = register(&app, &student_token, ctx.activity.id).await;
    let registration_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/registrations/{registration_id}/status?status=rejected");
    let resp = app
        .clone()
        .oneshot(empty_request("PUT", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let uri = format!("/api/registrations/{registration_id}/status?status=approved");
    let resp = app
        .clone()
        .oneshot(empty_request("PUT", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bulk_approve_all_pending() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();
    let ctx = setup(db).await;
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let mut ids = Vec::new();
    for name in ["bulk_a", "bulk_b", "bulk_c"] {
        let user = UserModel::create(db, name, &format!("{name}@test.com"), "password", false)
            .await
            .unwrap();
        let reg = RegistrationModel::register(db, ctx.activity.id, user.id, None)
            .await
            .unwrap();
        ids.push(reg.id);
    }

    let body = serde_json::json!({ "ids": ids, "status": "approved" });
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/registrations/bulk/status",
            &admin_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["updated"], 3);
    assert_eq!(json["data"]["failed"], 0);

    // the refetch reflects the new statuses
    for id in ids {
        let reg = db::models::registration::Entity::find_by_id(id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reg.status, RegistrationStatus::Approved);
    }
}

#[tokio::test]
async fn test_bulk_approve_isolates_failures() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();
    let ctx = setup(db).await;
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let first = RegistrationModel::register(db, ctx.activity.id, ctx.student.id, None)
        .await
        .unwrap();
    let other = UserModel::create(db, "bulk_late", "bulk_late@test.com", "password", false)
        .await
        .unwrap();
    let last = RegistrationModel::register(db, ctx.activity.id, other.id, None)
        .await
        .unwrap();

    // id 9999 does not exist; the items around it must still be applied
    let body = serde_json::json!({ "ids": [first.id, 9999, last.id], "status": "approved" });
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/registrations/bulk/status",
            &admin_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["updated"], 2);
    assert_eq!(json["data"]["failed"], 1);

    let outcomes = json["data"]["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["success"], true);
    assert_eq!(outcomes[1]["success"], false);
    assert_eq!(outcomes[2]["success"], true);

    for id in [first.id, last.id] {
        let reg = db::models::registration::Entity::find_by_id(id)
            .one(db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reg.status, RegistrationStatus::Approved);
    }
}

#[tokio::test]
async fn test_bulk_empty_selection_is_validation_error() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let body = serde_json::json!({ "ids": [], "status": "approved" });
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/registrations/bulk/status",
            &admin_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_check_endpoint_reports_absence_then_status() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let uri = format!("/api/registrations/check/{}", ctx.activity.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["status"], Value::Null);

    register(&app, &token, ctx.activity.id).await;

    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &token))
        .await
        .unwrap();
    let json = read_json(resp).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["registration_id"].as_i64().is_some());
}

#[tokio::test]
async fn test_check_in_flow_with_tailored_messages() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = register(&app, &student_token, ctx.activity.id).await;
    let registration_id = json["data"]["id"].as_i64().unwrap();
    let code = json["data"]["attendance_code"].as_str().unwrap().to_owned();

    // not yet approved
    let body = serde_json::json!({ "code": code });
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/registrations/check-in",
            &student_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = read_json(resp).await;
    assert_eq!(json["message"], "Your registration has not been approved");

    let uri = format!("/api/registrations/{registration_id}/status?status=approved");
    app.clone()
        .oneshot(empty_request("PUT", &uri, &admin_token))
        .await
        .unwrap();

    // first check-in succeeds
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/registrations/check-in",
            &student_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["participation_type"], "checked_in");

    // second scan reports the duplicate, not some other failure
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/registrations/check-in",
            &student_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = read_json(resp).await;
    assert_eq!(
        json["message"],
        "You have already checked in for this activity"
    );

    // unknown code
    let body = serde_json::json!({ "code": "not-a-real-code" });
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/registrations/check-in",
            &student_token,
            &body,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = read_json(resp).await;
    assert_eq!(json["message"], "Invalid or unknown check-in code");
}

#[tokio::test]
async fn test_participation_requires_approval() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    register(&app, &token, ctx.activity.id).await;

    let uri = format!(
        "/api/registrations/activity/{}/participation",
        ctx.activity.id
    );
    let body = serde_json::json!({ "participation_type": "attended", "points_earned": 5 });
    let resp = app
        .clone()
        .oneshot(json_request("POST", &uri, &token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_participation_report_splits_users() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();
    let ctx = setup(db).await;
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let present = UserModel::create(db, "rep_present", "rep_present@test.com", "password", false)
        .await
        .unwrap();
    let absent = UserModel::create(db, "rep_absent", "rep_absent@test.com", "password", false)
        .await
        .unwrap();

    for user in [&present, &absent] {
        let reg = RegistrationModel::register(db, ctx.activity.id, user.id, None)
            .await
            .unwrap();
        RegistrationModel::update_status(db, reg.id, RegistrationStatus::Approved)
            .await
            .unwrap();
    }

    let reg = RegistrationModel::find_by_user_and_activity(db, present.id, ctx.activity.id)
        .await
        .unwrap()
        .unwrap();
    let (present_token, _) = generate_jwt(present.id, false);
    let body = serde_json::json!({ "code": reg.attendance_code });
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/registrations/check-in",
            &present_token,
            &body,
        ))
        .await
        .unwrap();

    let uri = format!("/api/registrations/activities/{}/report", ctx.activity.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["attended"], serde_json::json!([present.id]));
    assert_eq!(json["data"]["not_attended"], serde_json::json!([absent.id]));
}

#[tokio::test]
async fn test_create_activity_and_register_through_api() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);
    let (student_token, _) = generate_jwt(ctx.student.id, false);

    let now = Utc::now();
    let body = serde_json::json!({
        "title": "Coding Evening",
        "location": "Lab 2",
        "starts_at": (now - Duration::minutes(30)).to_rfc3339(),
        "ends_at": (now + Duration::hours(3)).to_rfc3339(),
    });

    // students cannot create activities
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/activities", &student_token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/activities", &admin_token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = read_json(resp).await;
    let activity_id = json["data"]["id"].as_i64().unwrap();

    // a window that ends before it starts is refused
    let bad = serde_json::json!({
        "title": "Backwards",
        "starts_at": now.to_rfc3339(),
        "ends_at": (now - Duration::hours(1)).to_rfc3339(),
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/activities", &admin_token, &bad))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = register(&app, &student_token, activity_id).await;
    assert_eq!(json["data"]["status"], "pending");
}

#[tokio::test]
async fn test_my_registrations_reflects_server_state() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    register(&app, &token, ctx.activity.id).await;

    let resp = app
        .clone()
        .oneshot(empty_request("GET", "/api/registrations/my", &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    let list = json["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["status"], "pending");
}
