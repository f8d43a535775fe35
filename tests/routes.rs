//! HTTP surface: the login flow through the axum router.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{sessions, user};
use qbe_rest::session::{token_admin_resource, user_resource};
use qbe_rest::{common_routes_with_ready, resource_routes, AppState, TOKEN_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn app() -> Router {
    let sessions = sessions().await;
    sessions.users().create(user(1, "joe", "x")).await.unwrap();
    let store = sessions.users().store().clone();
    Router::new()
        .merge(common_routes_with_ready(AppState { store }))
        .nest("/user", resource_routes(Arc::new(user_resource(sessions.clone()))))
        .nest("/admin", resource_routes(Arc::new(token_admin_resource(sessions))))
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(TOKEN_HEADER, t);
    }
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn login_read_logout_over_http() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "joe", "Password": "x"}))).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["Token"].as_i64().expect("token").to_string();

    let (status, body) = send(&app, "GET", "/user", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "access_denied");

    let (status, body) = send(&app, "GET", "/user?ID=42&Name=ann", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "ID": 1, "Name": "joe" }]));
    assert_eq!(body["meta"]["count"], 1);

    let (status, _) = send(&app, "POST", "/user/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/user/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_password_is_forbidden() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "joe", "Password": "no"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "access denied");
}

#[tokio::test]
async fn create_update_and_admin_guard() {
    let app = app().await;

    let (status, _) = send(&app, "POST", "/user", None, Some(json!({"Name": "ann", "Password": "y"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/user", None, Some(json!({"Name": "ann"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "ann", "Password": "y"}))).await;
    let token = body["data"]["Token"].as_i64().expect("token").to_string();
    let (status, _) = send(
        &app,
        "PATCH",
        "/user",
        Some(&token),
        Some(json!({"find": {"ID": 1}, "patch": {"Name": "annie"}})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/user/first", Some(&token), None).await;
    assert_eq!(body["data"][0]["Name"], "annie");

    let (status, _) = send(&app, "POST", "/admin", None, Some(json!({"ID": 1, "UserID": 1}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/admin", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&app, "GET", "/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);

    let (status, _) = send(&app, "POST", "/user/unknown", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_tokens_cannot_be_repointed() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/user", None, Some(json!({"Name": "ann", "Password": "y"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "joe", "Password": "x"}))).await;
    let token_id = body["data"]["Token"].as_i64().expect("token");
    let token = token_id.to_string();

    let ann_id = {
        let (_, body) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "ann", "Password": "y"}))).await;
        let ann_token = body["data"]["Token"].as_i64().expect("token").to_string();
        let (_, body) = send(&app, "GET", "/user/first", Some(&ann_token), None).await;
        body["data"][0]["ID"].as_i64().expect("ann id")
    };

    let repoint = json!({"find": {"ID": token_id}, "patch": {"UserID": ann_id}});
    let (status, body) = send(&app, "PATCH", "/admin", Some(&token), Some(repoint)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "access_denied");
    let (status, _) = send(&app, "DELETE", &format!("/admin?ID={token_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, "GET", "/admin", Some(&token), None).await;
    assert_eq!(body["data"], json!([{ "ID": token_id, "UserID": 1 }]));

    let (status, _) = send(&app, "PATCH", "/user", Some(&token), Some(json!({"patch": {"Password": "pwned"}}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "ann", "Password": "y"}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_input_gets_the_error_envelope() {
    let app = app().await;
    let (_, body) = send(&app, "POST", "/user/login", None, Some(json!({"Name": "joe", "Password": "x"}))).await;
    let token = body["data"]["Token"].as_i64().expect("token").to_string();

    let (status, body) = send(&app, "GET", "/user?ID=abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = send(&app, "DELETE", "/user?ID=abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = send(&app, "PATCH", "/user", Some(&token), Some(json!({"find": {"ID": "one"}}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = send(&app, "POST", "/user", None, Some(json!({"Name": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn health_and_ready() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = send(&app, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}
