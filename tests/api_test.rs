//! REST surface driven through the router without a network listener.

mod common;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use interesthings::build_app;
use interesthings::db::CountSource;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, value)
}

async fn create_user(app: &Router, username: &str) -> String {
    let (status, _, body) = call(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@gmail.com", username.to_lowercase()),
            "password": "12346789",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn login(app: &Router, username: &str) -> String {
    let (status, _, body) = call(
        app,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"username": username, "password": "12346789"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_poi(app: &Router, token: &str, title: &str) -> String {
    let (status, headers, body) = call(
        app,
        Method::POST,
        "/pois",
        Some(token),
        Some(json!({
            "pos": {"type": "Point", "coordinates": [3, 4]},
            "photos": ["this-poi-photo"],
            "title": title,
            "description": "Le meilleur de la musique irlandaise",
            "categorie": "Art",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(headers[header::LOCATION], format!("/pois/{}", id).as_str());
    id
}

#[tokio::test]
async fn create_user_returns_public_fields() {
    let (state, _) = common::test_state();
    let app = build_app(state);

    let (status, headers, body) = call(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({
            "username": "JohnDoe",
            "email": "johndoe@gmail.com",
            "password": "12346789",
            "imgProfil": "johnintheforest.jpg",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap();
    assert_eq!(headers[header::LOCATION], format!("/users/{}", id).as_str());
    assert_eq!(body["username"], "JohnDoe");
    assert_eq!(body["email"], "johndoe@gmail.com");
    assert_eq!(body["imgProfil"], "johnintheforest.jpg");
    let mut keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["email", "id", "imgProfil", "username"]);
}

#[tokio::test]
async fn users_are_listed_by_username() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;
    create_user(&app, "JaneDoe").await;

    let (status, _, body) = call(&app, Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["username"], "JaneDoe");
    assert_eq!(list[1]["username"], "JohnDoe");
}

#[tokio::test]
async fn invalid_and_duplicate_users_are_rejected() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;

    let (status, _, body) = call(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({"username": "Jo", "email": "jo@gmail.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _, _) = call(
        &app,
        Method::POST,
        "/users",
        None,
        Some(json!({"username": "JohnDoe", "email": "other@gmail.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_checks_the_password() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;

    let (status, _, _) = call(
        &app,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"username": "JohnDoe", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = call(
        &app,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"username": "Nobody", "password": "12346789"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(!login(&app, "JohnDoe").await.is_empty());
}

#[tokio::test]
async fn users_can_only_modify_themselves() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    let john = create_user(&app, "JohnDoe").await;
    let jane = create_user(&app, "JaneDoe").await;
    let token = login(&app, "JohnDoe").await;

    let patch = json!({"imgProfil": "me.jpg"});
    let (status, _, _) = call(&app, Method::PATCH, &format!("/users/{}", john), None, Some(patch.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = call(&app, Method::PATCH, &format!("/users/{}", jane), Some(&token), Some(patch.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = call(&app, Method::PATCH, &format!("/users/{}", john), Some(&token), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imgProfil"], "me.jpg");
    assert_eq!(body["username"], "JohnDoe");

    let (status, _, _) = call(&app, Method::DELETE, &format!("/users/{}", jane), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = call(&app, Method::DELETE, &format!("/users/{}", john), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = call(&app, Method::GET, &format!("/users/{}", john), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn changed_password_is_used_for_login() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    let john = create_user(&app, "JohnDoe").await;
    let token = login(&app, "JohnDoe").await;

    let (status, _, _) = call(
        &app,
        Method::PUT,
        &format!("/users/{}", john),
        Some(&token),
        Some(json!({"username": "JohnDoe", "email": "john@doe.ch", "password": "new-secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = call(
        &app,
        Method::POST,
        "/users/login",
        None,
        Some(json!({"username": "JohnDoe", "password": "new-secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn poi_lifecycle_and_ownership() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;
    create_user(&app, "JaneDoe").await;
    let john = login(&app, "JohnDoe").await;
    let jane = login(&app, "JaneDoe").await;
    let poi = create_poi(&app, &john, "A taste from Ireland").await;
    let uri = format!("/pois/{}", poi);

    let (status, _, _) = call(&app, Method::PATCH, &uri, Some(&jane), Some(json!({"title": "Mine"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = call(
        &app,
        Method::PATCH,
        &uri,
        Some(&john),
        Some(json!({"pos": {"type": "Point", "coordinates": [1, 1]}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, body) = call(&app, Method::PATCH, &uri, Some(&john), Some(json!({"categorie": "WTF!"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categorie"], "WTF!");
    assert_eq!(body["title"], "A taste from Ireland");

    let (status, _, body) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pos"]["coordinates"], json!([3.0, 4.0]));
    assert_eq!(body["averageRating"], Value::Null);

    let (status, _, _) = call(&app, Method::DELETE, &uri, Some(&john), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_poi_is_rejected() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;
    let token = login(&app, "JohnDoe").await;

    let (status, _, body) = call(
        &app,
        Method::POST,
        "/pois",
        Some(&token),
        Some(json!({"pos": {"type": "Point", "coordinates": [200, 4]}, "title": "Nowhere"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("coordinates"));
}

#[tokio::test]
async fn pois_are_paged_by_average_rating() {
    let (state, store) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;
    let token = login(&app, "JohnDoe").await;
    let low = create_poi(&app, &token, "La Cave").await;
    let high = create_poi(&app, &token, "A taste from Ireland").await;

    for (poi, value) in [(&low, 2), (&high, 5), (&high, 4)] {
        let (status, _, _) = call(
            &app,
            Method::POST,
            "/ratings",
            Some(&token),
            Some(json!({"poi": poi, "value": value})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = call(&app, Method::GET, "/pois?page=1&pageSize=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 1);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["id"], high.as_str());
    assert_eq!(body["data"][0]["averageRating"], 4.5);

    let (_, _, body) = call(&app, Method::GET, "/pois?page=2&pageSize=1", None, None).await;
    assert_eq!(body["data"][0]["id"], low.as_str());

    let (_, _, body) = call(&app, Method::GET, "/pois?page=zero&pageSize=500", None, None).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 100);

    // Deleting a POI removes its ratings
    let (status, _, _) = call(&app, Method::DELETE, &format!("/pois/{}", high), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.count_ratings().await.unwrap(), 1);
}

#[tokio::test]
async fn ratings_require_an_existing_poi_and_ownership() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;
    create_user(&app, "JaneDoe").await;
    let john = login(&app, "JohnDoe").await;
    let jane = login(&app, "JaneDoe").await;
    let poi = create_poi(&app, &john, "La Cave").await;

    let (status, _, _) = call(
        &app,
        Method::POST,
        "/ratings",
        Some(&john),
        Some(json!({"poi": uuid::Uuid::new_v4(), "value": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = call(&app, Method::POST, "/ratings", Some(&john), Some(json!({"poi": poi, "value": 9}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, headers, body) = call(
        &app,
        Method::POST,
        "/ratings",
        Some(&john),
        Some(json!({"poi": poi, "value": 4, "comment": "La teuf de ouf"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let rating = body["id"].as_str().unwrap().to_string();
    assert_eq!(headers[header::LOCATION], format!("/ratings/{}", rating).as_str());

    let (_, _, list) = call(&app, Method::GET, "/ratings", None, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/ratings/{}", rating);
    let (status, _, _) = call(&app, Method::DELETE, &uri, Some(&jane), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = call(&app, Method::DELETE, &uri, Some(&john), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = call(&app, Method::DELETE, &uri, Some(&john), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_report_current_totals() {
    let (state, _) = common::test_state();
    let app = build_app(state);
    create_user(&app, "JohnDoe").await;
    let token = login(&app, "JohnDoe").await;
    create_poi(&app, &token, "La Cave").await;

    let (status, _, body) = call(&app, Method::GET, "/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"TotalUser": 1, "TotalPoi": 1, "TotalRating": 0}));
}

#[tokio::test]
async fn bad_tokens_are_rejected() {
    let (state, _) = common::test_state();
    let app = build_app(state);

    let (status, _, body) = call(&app, Method::GET, "/diagnostics", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _, _) = call(&app, Method::GET, "/diagnostics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_readiness() {
    let (state, _) = common::test_state();
    let app = build_app(state);

    let (status, _, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _, _) = call(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
