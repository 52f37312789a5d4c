//! HTTP-level tests for `/api/projects`: CRUD, finance sanitization,
//! per-role visibility and batch operations.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_client, create_project, delete_auth, delete_json_auth,
    get_auth, post_json_auth, put_json_auth,
};
use serde_json::json;
use studio_core::roles::Role;
use studio_db::models::project::FINANCE_FIELDS;

#[tokio::test]
async fn finance_fields_are_hidden_from_freelancers() {
    let app = build_test_app();
    let (_admin, admin_token) = app.login_as("Admin", Role::Admin).await;
    let (freelancer, freelancer_token) =
        app.login_as("Camera", Role::FreelancerCaptacao).await;
    let client_id = create_client(&app, &admin_token, "Acme").await;
    let project = create_project(
        &app,
        &admin_token,
        json!({
            "title": "Evento",
            "clientId": client_id,
            "responsavelCaptacaoId": freelancer.id,
            "clientPrice": 1500,
            "captationCost": 400,
            "clientDueDate": "2026-11-30",
        }),
    )
    .await;
    let id = project["id"].as_i64().expect("project id");
    assert_eq!(project["margin"], 1100.0);

    let response = get_auth(app.app(), &format!("/api/projects/{id}"), &freelancer_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    for field in FINANCE_FIELDS {
        assert!(data.get(*field).is_none(), "{field} must not be exposed");
    }
    assert_eq!(data["title"], "Evento");
    assert_eq!(data["permissions"]["canViewFinance"], false);
    assert_eq!(data["permissions"]["canChangeCaptacaoStatus"], true);
}

#[tokio::test]
async fn list_is_filtered_by_role_visibility() {
    let app = build_test_app();
    let (_admin, admin_token) = app.login_as("Admin", Role::Admin).await;
    let (freelancer, freelancer_token) =
        app.login_as("Camera", Role::FreelancerCaptacao).await;
    let (_editor, editor_token) = app.login_as("Editor", Role::EditorEdicao).await;
    let client_id = create_client(&app, &admin_token, "Acme").await;

    create_project(
        &app,
        &admin_token,
        json!({ "title": "Mine", "clientId": client_id, "responsavelCaptacaoId": freelancer.id }),
    )
    .await;
    create_project(
        &app,
        &admin_token,
        json!({ "title": "Someone else's", "clientId": client_id }),
    )
    .await;
    create_project(
        &app,
        &admin_token,
        json!({ "title": "Edit only", "clientId": client_id, "editionOnly": true }),
    )
    .await;

    let response = get_auth(app.app(), "/api/projects", &admin_token).await;
    let all = body_json(response).await["data"].clone();
    assert_eq!(all.as_array().map(Vec::len), Some(3));
    // Newest first.
    assert_eq!(all[0]["title"], "Edit only");

    let response = get_auth(app.app(), "/api/projects", &freelancer_token).await;
    let mine = body_json(response).await["data"].clone();
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["title"], "Mine");

    let response = get_auth(app.app(), "/api/projects", &editor_token).await;
    let edits = body_json(response).await["data"].clone();
    assert_eq!(edits.as_array().map(Vec::len), Some(1));
    assert_eq!(edits[0]["title"], "Edit only");
    assert_eq!(edits[0]["statusEdicao"], "receber-ficheiros");
}

#[tokio::test]
async fn list_accepts_phase_and_client_filters() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let acme = create_client(&app, &token, "Acme").await;
    let globex = create_client(&app, &token, "Globex").await;
    create_project(&app, &token, json!({ "title": "A", "clientId": acme })).await;
    create_project(
        &app,
        &token,
        json!({ "title": "B", "clientId": globex, "editionOnly": true }),
    )
    .await;

    let response = get_auth(app.app(), &format!("/api/projects?clientId={globex}"), &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().map(Vec::len), Some(1));
    assert_eq!(data[0]["title"], "B");

    let response = get_auth(app.app(), "/api/projects?phase=captacao", &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().map(Vec::len), Some(1));
    assert_eq!(data[0]["title"], "A");

    let response = get_auth(app.app(), "/api/projects?phase=nope", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn freelancer_cannot_see_unassigned_project() {
    let app = build_test_app();
    let (_admin, admin_token) = app.login_as("Admin", Role::Admin).await;
    let (_freelancer, freelancer_token) =
        app.login_as("Camera", Role::FreelancerCaptacao).await;
    let client_id = create_client(&app, &admin_token, "Acme").await;
    let project = create_project(
        &app,
        &admin_token,
        json!({ "title": "Private", "clientId": client_id }),
    )
    .await;

    let response = get_auth(
        app.app(),
        &format!("/api/projects/{}", project["id"]),
        &freelancer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_project_managers_create_projects() {
    let app = build_test_app();
    let (_admin, admin_token) = app.login_as("Admin", Role::Admin).await;
    let (_editor, editor_token) = app.login_as("Editor", Role::EditorEdicao).await;
    let client_id = create_client(&app, &admin_token, "Acme").await;

    let response = post_json_auth(
        app.app(),
        "/api/projects",
        json!({ "title": "Nope", "clientId": client_id }),
        &editor_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn create_validates_title_and_references() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let client_id = create_client(&app, &token, "Acme").await;

    let response = post_json_auth(
        app.app(),
        "/api/projects",
        json!({ "title": "   ", "clientId": client_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json_auth(
        app.app(),
        "/api/projects",
        json!({ "title": "Orphan", "clientId": 4242 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "MISSING_REFERENCE");
}

#[tokio::test]
async fn update_recomputes_margin() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let client_id = create_client(&app, &token, "Acme").await;
    let project = create_project(
        &app,
        &token,
        json!({
            "title": "Casamento",
            "clientId": client_id,
            "clientPrice": 1000,
            "captationCost": 300,
            "editionCost": 200,
        }),
    )
    .await;

    let response = put_json_auth(
        app.app(),
        &format!("/api/projects/{}", project["id"]),
        json!({ "clientPrice": 1200, "editionCost": 250 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["clientPrice"], 1200.0);
    assert_eq!(data["margin"], 650.0);
}

#[tokio::test]
async fn titles_are_trimmed_on_every_write_path() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let client_id = create_client(&app, &token, "Acme").await;
    let project = create_project(
        &app,
        &token,
        json!({ "title": "  Casamento  ", "clientId": client_id }),
    )
    .await;
    assert_eq!(project["title"], "Casamento");
    let uri = format!("/api/projects/{}", project["id"]);

    let response = put_json_auth(app.app(), &uri, json!({ "title": " Batizado\t" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "Batizado");

    let response = put_json_auth(
        app.app(),
        "/api/projects",
        json!({ "items": [{ "id": project["id"], "title": "   Aniversário " }] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app.app(), &uri, &token).await;
    assert_eq!(body_json(response).await["data"]["title"], "Aniversário");
}

#[tokio::test]
async fn non_admins_cannot_touch_finance_or_assignments() {
    let app = build_test_app();
    let (_admin, admin_token) = app.login_as("Admin", Role::Admin).await;
    let (freelancer, freelancer_token) =
        app.login_as("Camera", Role::FreelancerCaptacao).await;
    let client_id = create_client(&app, &admin_token, "Acme").await;
    let project = create_project(
        &app,
        &admin_token,
        json!({ "title": "Evento", "clientId": client_id, "responsavelCaptacaoId": freelancer.id }),
    )
    .await;
    let uri = format!("/api/projects/{}", project["id"]);

    let response = put_json_auth(app.app(), &uri, json!({ "clientPrice": 1 }), &freelancer_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app.app(),
        &uri,
        json!({ "responsavelEdicaoId": freelancer.id }),
        &freelancer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app.app(),
        &uri,
        json!({ "description": "Bring the drone" }),
        &freelancer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["description"], "Bring the drone");
}

#[tokio::test]
async fn delete_project_then_404() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let client_id = create_client(&app, &token, "Acme").await;
    let project = create_project(&app, &token, json!({ "title": "Tmp", "clientId": client_id })).await;
    let uri = format!("/api/projects/{}", project["id"]);

    let response = delete_auth(app.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let response = get_auth(app.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_update_skips_missing_items() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let client_id = create_client(&app, &token, "Acme").await;
    let a = create_project(&app, &token, json!({ "title": "A", "clientId": client_id })).await;
    let b = create_project(&app, &token, json!({ "title": "B", "clientId": client_id })).await;

    let response = put_json_auth(
        app.app(),
        "/api/projects",
        json!({
            "items": [
                { "id": a["id"], "clientPrice": 800 },
                { "id": b["id"], "title": "B renamed" },
                { "id": 9999, "title": "Ghost" },
            ]
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["updated"], 2);
    assert_eq!(json["data"]["skipped"], 1);

    let response = get_auth(app.app(), &format!("/api/projects/{}", a["id"]), &token).await;
    assert_eq!(body_json(response).await["data"]["margin"], 800.0);
}

#[tokio::test]
async fn batch_delete_counts_deleted_and_skipped() {
    let app = build_test_app();
    let (_admin, token) = app.login_as("Admin", Role::Admin).await;
    let client_id = create_client(&app, &token, "Acme").await;
    let a = create_project(&app, &token, json!({ "title": "A", "clientId": client_id })).await;

    let response = delete_json_auth(
        app.app(),
        "/api/projects",
        json!({ "ids": [a["id"], 12345] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["deleted"], 1);
    assert_eq!(json["data"]["skipped"], 1);

    let response = delete_json_auth(app.app(), "/api/projects", json!({ "ids": [] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
