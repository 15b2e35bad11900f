//! API integration tests.
//!
//! The router runs with the real auth middleware over a migrated in-memory
//! SQLite database. Identity tokens are minted with the test secret.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware,
};
use chrono::Utc;
use guarda_api::{
    AppState, TokenVerifier, middleware::IdentityClaims, middleware::auth_middleware,
    router as api_router,
};
use guarda_common::config::{AuthConfig, PostingConfig};
use guarda_core::{CreateCityInput, InlineScoreScheduler, ScoreService, Services};
use guarda_db::{
    entities::{profile::Role, state},
    repositories::{CityRepository, PostingRepository, ProfileRepository},
    test_utils::TestDatabase,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{DatabaseConnection, Set};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    db: Arc<DatabaseConnection>,
    city_id: String,
}

impl TestApp {
    async fn new() -> Self {
        let db = TestDatabase::sqlite_memory().await.unwrap().connection();

        let score = ScoreService::new(PostingRepository::new(Arc::clone(&db)));
        let services = Services::new(
            &db,
            &PostingConfig::default(),
            Arc::new(InlineScoreScheduler::new(score)),
        );

        CityRepository::new(Arc::clone(&db))
            .create_state(state::ActiveModel {
                id: Set("rj".to_string()),
                name: Set("Rio de Janeiro".to_string()),
                abbreviation: Set("RJ".to_string()),
            })
            .await
            .unwrap();
        let city = services
            .city
            .create(CreateCityInput {
                name: "Niterói".to_string(),
                state_id: "rj".to_string(),
            })
            .await
            .unwrap();

        let state = AppState {
            services,
            verifier: TokenVerifier::new(&AuthConfig {
                jwt_secret: SECRET.to_string(),
                issuer: None,
            }),
        };

        let router = api_router()
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state);

        Self {
            router,
            db,
            city_id: city.id,
        }
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

fn token(subject: &str) -> String {
    let claims = IdentityClaims {
        sub: subject.to_string(),
        exp: (Utc::now().timestamp() + 3600) as u64,
        name: Some(subject.to_string()),
        email: None,
        picture: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/i", None, json!({})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_bad_signature_is_anonymous() {
    let app = TestApp::new().await;

    let forged = encode(
        &Header::default(),
        &IdentityClaims {
            sub: "auth|mallory".to_string(),
            exp: (Utc::now().timestamp() + 3600) as u64,
            name: None,
            email: None,
            picture: None,
        },
        &EncodingKey::from_secret(b"other-secret"),
    )
    .unwrap();

    let (status, _) = app.post("/i", Some(&forged), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_creates_profile_once() {
    let app = TestApp::new().await;
    let token = token("auth|ana");

    let (status, first) = app.post("/i", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app.post("/i", Some(&token), json!({})).await;

    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(first["data"]["displayName"], "auth|ana");
    assert_eq!(first["data"]["role"], "member");
}

#[tokio::test]
async fn test_city_show_by_slug() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/cities/show", None, json!({"slug": "niteroi-rj"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], app.city_id.as_str());
    assert_eq!(body["data"]["state"]["abbreviation"], "RJ");
}

#[tokio::test]
async fn test_create_memory_validation_errors() {
    let app = TestApp::new().await;
    let token = token("auth|ana");

    let (status, body) = app
        .post(
            "/memories/create",
            Some(&token),
            json!({"kind": "NOT_A_KIND", "name": "X", "cityId": app.city_id}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/memories/create",
            Some(&token),
            json!({"kind": "PERSON", "cityId": app.city_id}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_flow() {
    let app = TestApp::new().await;
    let token = token("auth|ana");

    let (status, memory) = app
        .post(
            "/memories/create",
            Some(&token),
            json!({"kind": "PERSON", "name": "Araribóia", "cityId": app.city_id, "location": "ignored"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(memory["data"].get("location").is_none());
    let memory_id = memory["data"]["id"].as_str().unwrap().to_string();

    let (status, like) = app
        .post("/likes/create", Some(&token), json!({"memoryId": memory_id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(like["data"]["likeCount"], 1);

    let (status, body) = app
        .post("/likes/create", Some(&token), json!({"memoryId": memory_id}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, removed) = app
        .post("/likes/delete", Some(&token), json!({"memoryId": memory_id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["data"]["likeCount"], 0);

    let (status, _) = app
        .post("/likes/delete", Some(&token), json!({"memoryId": memory_id}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_posting_thread_and_knowledge() {
    let app = TestApp::new().await;
    let author = token("auth|ana");
    let reader = token("auth|bia");

    let (status, root) = app
        .post(
            "/postings/create",
            Some(&author),
            json!({"type": "text", "text": "Quem lembra?", "cityId": app.city_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let root_id = root["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/postings/create",
            Some(&reader),
            json!({"type": "text", "text": "Eu!", "cityId": app.city_id, "parentId": root_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, toggled) = app
        .post(
            "/postings/knowledge/toggle",
            Some(&reader),
            json!({"postingId": root_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["data"]["action"], "added");
    assert_eq!(toggled["data"]["knowledgeCount"], 1);
    assert_eq!(toggled["data"]["userKnows"], true);
    assert_eq!(toggled["data"]["score"], 2);

    let (status, _) = app
        .post("/postings/delete", Some(&reader), json!({"id": root_id}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, deleted) = app
        .post("/postings/delete", Some(&author), json!({"id": root_id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(deleted["data"]["promotedRootId"].is_string());
}

#[tokio::test]
async fn test_posting_without_content() {
    let app = TestApp::new().await;
    let token = token("auth|ana");

    let (status, body) = app
        .post(
            "/postings/create",
            Some(&token),
            json!({"type": "text", "text": "", "cityId": app.city_id}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admin_routes_need_admin_role() {
    let app = TestApp::new().await;
    let token = token("auth|root");

    let (status, me) = app.post("/i", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post("/admin/stats", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ProfileRepository::new(Arc::clone(&app.db))
        .set_role(me["data"]["id"].as_str().unwrap(), Role::Admin)
        .await
        .unwrap();

    let (status, stats) = app.post("/admin/stats", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["profiles"], 1);
    assert_eq!(stats["data"]["pendingReports"], 0);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = TestApp::new().await;

    let (status, _) = app.post("/nonexistent/endpoint", None, json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
