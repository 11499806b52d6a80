//! Runs against a real Postgres when TEST_DATABASE_URL is set (schema from
//! sql/schema.sql already applied); otherwise every test returns early.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use newsdesk_api::config::AppConfig;
use newsdesk_api::server::app;
use newsdesk_api::state::AppState;

fn live_state() -> Option<AppState> {
    let url = std::env::var("TEST_DATABASE_URL").ok().filter(|u| !u.is_empty())?;
    let mut config = AppConfig::default();
    config.database.url = Some(url);
    Some(common::state_with(config))
}

fn unique(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn role_crud_round_trip() {
    let Some(state) = live_state() else { return };
    let token = common::access_token(&state);
    let name = unique("Reporter");

    let (status, body) = common::send(
        app(state.clone()),
        common::json("POST", "/api/v1/roles", Some(&token), &json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Role created successfully");
    let id = body["results"]["id"].as_i64().expect("id");

    let (status, body) =
        common::send(app(state.clone()), common::get(&format!("/api/v1/roles/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["name"], json!(name));

    // omitted name keeps the current one
    let (status, body) = common::send(
        app(state.clone()),
        common::json(
            "PUT",
            &format!("/api/v1/roles/{}", id),
            Some(&token),
            &json!({ "status": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"]["name"], json!(name));
    assert_eq!(body["results"]["status"], json!(false));

    let (status, body) = common::send(
        app(state.clone()),
        common::json("DELETE", &format!("/api/v1/roles/{}", id), Some(&token), &Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Role deleted successfully" }));

    let (status, _) = common::send(app(state), common::get(&format!("/api/v1/roles/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn department_pagination_and_invalidation() {
    let Some(state) = live_state() else { return };
    let token = common::access_token(&state);
    let marker = uuid::Uuid::new_v4().simple().to_string();

    let mut ids = Vec::new();
    for n in 0..25 {
        let (status, body) = common::send(
            app(state.clone()),
            common::json(
                "POST",
                "/api/v1/departments",
                Some(&token),
                &json!({ "title": format!("Desk {} {}", marker, n) }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        ids.push(body["results"]["id"].as_i64().expect("id"));
    }

    let list = format!("/api/v1/departments?search={}&page=3&limit=10", marker);
    let (status, body) = common::send(app(state.clone()), common::get(&list, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["pagination"]["total_items"], 25);
    assert_eq!(body["pagination"]["total_pages"], 3);
    assert_eq!(body["pagination"]["next_page"], Value::Null);
    assert_eq!(body["pagination"]["previous_page"], 2);

    // a write clears the cached page, so the next read sees the delete
    let (status, _) = common::send(
        app(state.clone()),
        common::json("DELETE", &format!("/api/v1/departments/{}", ids[0]), Some(&token), &Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = common::send(app(state.clone()), common::get(&list, Some(&token))).await;
    assert_eq!(body["pagination"]["total_items"], 24);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(4));

    let (status, _) = common::send(
        app(state.clone()),
        common::get(&format!("/api/v1/departments/{}", ids[0]), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for id in &ids[1..] {
        common::send(
            app(state.clone()),
            common::json("DELETE", &format!("/api/v1/departments/{}", id), Some(&token), &Value::Null),
        )
        .await;
    }
}

#[tokio::test]
async fn sign_in_issues_tokens_for_valid_credentials() {
    let Some(state) = live_state() else { return };
    let token = common::access_token(&state);
    let email = format!("{}@example.com", uuid::Uuid::new_v4().simple());

    let (status, body) = common::send(
        app(state.clone()),
        common::json(
            "POST",
            "/api/v1/users",
            Some(&token),
            &json!({ "name": "Copy Editor", "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["results"].get("password").is_none());

    let (status, body) = common::send(
        app(state.clone()),
        common::json(
            "POST",
            "/api/public/v1/auth/sign-in",
            None,
            &json!({ "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let refresh = body["results"]["refresh_token"].as_str().expect("refresh token").to_string();

    let (status, _) = common::send(
        app(state.clone()),
        common::json(
            "POST",
            "/api/public/v1/auth/sign-in",
            None,
            &json!({ "email": email, "password": "wrong-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = common::send(
        app(state),
        common::json(
            "POST",
            "/api/public/v1/auth/refresh-token",
            None,
            &json!({ "refresh_token": refresh }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["results"]["access_token"].is_string());
}

#[tokio::test]
async fn deleting_a_role_still_assigned_is_a_conflict() {
    let Some(state) = live_state() else { return };
    let token = common::access_token(&state);

    let (status, body) = common::send(
        app(state.clone()),
        common::json("POST", "/api/v1/roles", Some(&token), &json!({ "name": unique("Desk") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let role_id = body["results"]["id"].as_i64().expect("id");

    let email = format!("{}@example.com", uuid::Uuid::new_v4().simple());
    let (status, body) = common::send(
        app(state.clone()),
        common::json(
            "POST",
            "/api/v1/users",
            Some(&token),
            &json!({ "name": "Desk Editor", "email": email, "password": "secret123", "role": role_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = common::send(
        app(state),
        common::json("DELETE", &format!("/api/v1/roles/{}", role_id), Some(&token), &Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["code"], json!("CONFLICT"));
}
