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
    task::Model as TaskModel, task_assignment::Model as TaskAssignmentModel,
    user::Model as UserModel,
};
use sea_orm::DatabaseConnection;

use crate::helpers::{
    app::make_test_app, grade_form_body, multipart_body, multipart_content_type, read_json,
};

struct TestCtx {
    admin: UserModel,
    student: UserModel,
    task: TaskModel,
}

async fn setup(db: &DatabaseConnection) -> TestCtx {
    let admin = UserModel::create(db, "sub_admin", "sub_admin@test.com", "password", true)
        .await
        .unwrap();
    let student = UserModel::create(db, "sub_student", "sub_student@test.com", "password", false)
        .await
        .unwrap();

    let task = TaskModel::create(db, "Weekly Report", None, None, None, admin.id)
        .await
        .unwrap();

    TestCtx {
        admin,
        student,
        task,
    }
}

fn multipart_request(method: &str, uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", multipart_content_type())
        .body(Body::from(body))
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

async fn submit(
    app: &Router,
    token: &str,
    task_id: i64,
    content: Option<&str>,
    files: &[(&str, &[u8])],
) -> Value {
    let uri = format!("/api/submissions/task/{task_id}");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "POST",
            &uri,
            token,
            multipart_body(content, files),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    read_json(resp).await
}

#[tokio::test]
async fn test_submit_then_fetch_round_trip() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let json = submit(&app, &token, ctx.task.id, Some("hello"), &[]).await;
    assert_eq!(json["data"]["content"], "hello");
    assert_eq!(json["data"]["status"], "submitted");
    assert_eq!(json["data"]["score"], Value::Null);

    let uri = format!("/api/submissions/task/{}/my", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["content"], "hello");
    assert_eq!(json["data"]["status"], "submitted");
    assert_eq!(json["data"]["score"], Value::Null);
}

#[tokio::test]
async fn test_my_submission_absent_is_null_not_error() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let uri = format!("/api/submissions/task/{}/my", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], Value::Null);
}

#[tokio::test]
async fn test_submit_twice_conflicts() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    submit(&app, &token, ctx.task.id, Some("v1"), &[]).await;

    let uri = format!("/api/submissions/task/{}", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "POST",
            &uri,
            &token,
            multipart_body(Some("v2"), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_submit_without_content_or_files_is_refused() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let uri = format!("/api/submissions/task/{}", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "POST",
            &uri,
            &token,
            multipart_body(Some("   "), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_appends_files_additively() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let json = submit(
        &app,
        &token,
        ctx.task.id,
        Some("draft"),
        &[("f1.txt", b"one" as &[u8]), ("f2.txt", b"two")],
    )
    .await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/submissions/{submission_id}");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &token,
            multipart_body(None, &[("f3.txt", b"three" as &[u8])]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;

    // earlier uploads survive the update
    let names: Vec<&str> = json["data"]["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["f1.txt", "f2.txt", "f3.txt"]);
    // content untouched when the update carries files only
    assert_eq!(json["data"]["content"], "draft");
}

#[tokio::test]
async fn test_update_foreign_submission_forbidden() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();
    let ctx = setup(db).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let json = submit(&app, &token, ctx.task.id, Some("mine"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let intruder = UserModel::create(db, "intruder", "intruder@test.com", "password", false)
        .await
        .unwrap();
    let (intruder_token, _) = generate_jwt(intruder.id, false);

    let uri = format!("/api/submissions/{submission_id}");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &intruder_token,
            multipart_body(Some("hijack"), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_grade_bounds_enforced_with_named_limit() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = submit(&app, &student_token, ctx.task.id, Some("work"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/submissions/{submission_id}/grade");

    for score in ["-1", "11"] {
        let resp = app
            .clone()
            .oneshot(multipart_request(
                "PUT",
                &uri,
                &admin_token,
                grade_form_body(score, None),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = read_json(resp).await;
        // the default bound is named in the message
        assert!(json["message"].as_str().unwrap().contains("10"));
    }

    // the submission is untouched by the failed attempts
    let uri = format!("/api/submissions/task/{}/my", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &student_token))
        .await
        .unwrap();
    let json = read_json(resp).await;
    assert_eq!(json["data"]["score"], Value::Null);
    assert_eq!(json["data"]["status"], "submitted");
}

#[tokio::test]
async fn test_grade_then_regrade_overwrites() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = submit(&app, &student_token, ctx.task.id, Some("work"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/submissions/{submission_id}/grade");

    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &admin_token,
            grade_form_body("4", Some("first pass")),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["status"], "graded");
    assert_eq!(json["data"]["score"], 4);
    assert!(json["data"]["graded_at"].as_str().is_some());

    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &admin_token,
            grade_form_body("9", Some("after appeal")),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["score"], 9);
    assert_eq!(json["data"]["feedback"], "after appeal");
    assert_eq!(json["data"]["status"], "graded");
}

#[tokio::test]
async fn test_graded_submission_is_closed_for_edit_and_delete() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = submit(&app, &student_token, ctx.task.id, Some("final"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/submissions/{submission_id}/grade");
    app.clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &admin_token,
            grade_form_body("8", None),
        ))
        .await
        .unwrap();

    let uri = format!("/api/submissions/{submission_id}");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &student_token,
            multipart_body(Some("too late"), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, &student_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_open_submission_then_absent() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (token, _) = generate_jwt(ctx.student.id, false);

    let json = submit(&app, &token, ctx.task.id, Some("scrap this"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/submissions/{submission_id}");
    let resp = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, &token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let uri = format!("/api/submissions/task/{}/my", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &token))
        .await
        .unwrap();
    let json = read_json(resp).await;
    assert_eq!(json["data"], Value::Null);
}

#[tokio::test]
async fn test_grade_requires_admin() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);

    let json = submit(&app, &student_token, ctx.task.id, Some("work"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/submissions/{submission_id}/grade");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &student_token,
            grade_form_body("10", None),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_task_submissions_requires_admin() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    submit(&app, &student_token, ctx.task.id, Some("entry"), &[]).await;

    let uri = format!("/api/submissions/task/{}", ctx.task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &student_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sweep_marks_late_and_missing() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();
    let ctx = setup(db).await;
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let overdue_task = TaskModel::create(
        db,
        "Overdue Task",
        None,
        None,
        Some(Utc::now() - Duration::hours(1)),
        ctx.admin.id,
    )
    .await
    .unwrap();

    let silent = UserModel::create(db, "sweep_silent", "sweep_silent@test.com", "password", false)
        .await
        .unwrap();
    TaskAssignmentModel::assign(db, overdue_task.id, ctx.student.id, None)
        .await
        .unwrap();
    TaskAssignmentModel::assign(db, overdue_task.id, silent.id, None)
        .await
        .unwrap();

    let (student_token, _) = generate_jwt(ctx.student.id, false);
    submit(&app, &student_token, overdue_task.id, Some("late-ish"), &[]).await;

    let uri = format!("/api/submissions/task/{}/sweep", overdue_task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("POST", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["late"], 1);
    assert_eq!(json["data"]["missing"], 1);

    let uri = format!("/api/submissions/task/{}", overdue_task.id);
    let resp = app
        .clone()
        .oneshot(empty_request("GET", &uri, &admin_token))
        .await
        .unwrap();
    let json = read_json(resp).await;
    let statuses: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"late"));
    assert!(statuses.contains(&"missing"));
}

#[tokio::test]
async fn test_return_reopens_graded_submission() {
    let (app, app_state) = make_test_app().await;
    let ctx = setup(app_state.db()).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);
    let (admin_token, _) = generate_jwt(ctx.admin.id, true);

    let json = submit(&app, &student_token, ctx.task.id, Some("v1"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/submissions/{submission_id}/grade");
    app.clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &admin_token,
            grade_form_body("3", Some("needs work")),
        ))
        .await
        .unwrap();

    let uri = format!("/api/submissions/{submission_id}/return");
    let resp = app
        .clone()
        .oneshot(empty_request("PUT", &uri, &admin_token))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["status"], "returned");
    assert_eq!(json["data"]["score"], Value::Null);
    assert_eq!(json["data"]["graded_at"], Value::Null);
    assert_eq!(json["data"]["feedback"], "needs work");

    // editable again
    let uri = format!("/api/submissions/{submission_id}");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &student_token,
            multipart_body(Some("v2"), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["data"]["content"], "v2");
}

#[tokio::test]
async fn test_completed_assignment_closes_submission_via_api() {
    let (app, app_state) = make_test_app().await;
    let db = app_state.db();
    let ctx = setup(db).await;
    let (student_token, _) = generate_jwt(ctx.student.id, false);

    let assignment = TaskAssignmentModel::assign(db, ctx.task.id, ctx.student.id, None)
        .await
        .unwrap();
    let json = submit(&app, &student_token, ctx.task.id, Some("done"), &[]).await;
    let submission_id = json["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/tasks/assignments/{}/status", assignment.id);
    let body = serde_json::json!({ "status": "completed" });
    let req = Request::builder()
        .method("PUT")
        .uri(&uri)
        .header("Authorization", format!("Bearer {student_token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // ungraded, yet the completion signal closes it
    let uri = format!("/api/submissions/{submission_id}");
    let resp = app
        .clone()
        .oneshot(multipart_request(
            "PUT",
            &uri,
            &student_token,
            multipart_body(Some("one more thing"), &[]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
