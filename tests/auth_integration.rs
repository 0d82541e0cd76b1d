mod common;

use chirpy::auth::{validate_session_token, Claims};
use common::{error_code, spawn_app, TEST_SECRET};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};
use uuid::Uuid;

fn decode_claims(token: &str) -> Claims {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("Failed to decode token")
    .claims
}

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_for_valid_credentials() {
    let app = spawn_app();

    let response = app.register("a@b.com", "pw123").await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "a@b.com");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert!(body.get("created_at").is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn register_returns_409_for_duplicate_email() {
    let app = spawn_app();

    assert_eq!(201, app.register("john@example.com", "pw123").await.status().as_u16());

    let response = app.register("john@example.com", "other").await;
    assert_eq!(409, response.status().as_u16());
    assert_eq!(error_code(response).await, "DUPLICATE_ENTRY");
}

#[tokio::test]
async fn register_returns_400_for_invalid_payloads() {
    let app = spawn_app();

    let test_cases = vec![
        (json!({"email": "notanemail", "password": "pw123"}), "invalid email"),
        (json!({"email": "user@@example.com", "password": "pw123"}), "double at"),
        (json!({"email": "a@b.com", "password": ""}), "empty password"),
        (json!({"email": "a@b.com"}), "missing password"),
        (json!({"password": "pw123"}), "missing email"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = app
            .client
            .post(app.url("/api/users"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
        assert_eq!(error_code(response).await, "VALIDATION_ERROR");
    }
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_user_and_tokens() {
    let app = spawn_app();
    let registered: Value = app.register("a@b.com", "pw123").await.json().await.unwrap();

    let response = app.login_with(json!({"email": "a@b.com", "password": "pw123"})).await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], registered["id"]);
    assert_eq!(body["email"], "a@b.com");

    let token = body["token"].as_str().expect("No session token");
    let user_id = validate_session_token(token, TEST_SECRET).expect("Session token should validate");
    assert_eq!(user_id.to_string(), registered["id"].as_str().unwrap());

    let refresh_token = body["refresh_token"].as_str().expect("No refresh token");
    assert_eq!(refresh_token.len(), 64);
}

#[tokio::test]
async fn login_returns_401_for_wrong_password_or_unknown_email() {
    let app = spawn_app();
    app.register("john@example.com", "pw123").await;

    let attempts = vec![
        json!({"email": "john@example.com", "password": "wrong"}),
        json!({"email": "nobody@example.com", "password": "pw123"}),
    ];

    for body in attempts {
        let response = app.login_with(body).await;
        assert_eq!(401, response.status().as_u16());
        assert_eq!(error_code(response).await, "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn login_clamps_requested_session_lifetime() {
    let app = spawn_app();
    app.register("a@b.com", "pw123").await;

    let cases = vec![
        (json!(60), 60),
        (json!(3600), 3600),
        (json!(86400), 3600),
        (json!(0), 3600),
        (json!(-10), 3600),
        (Value::Null, 3600),
    ];

    for (requested, expected) in cases {
        let response = app
            .login_with(json!({"email": "a@b.com", "password": "pw123", "expires_in_seconds": requested}))
            .await;
        assert_eq!(200, response.status().as_u16());

        let body: Value = response.json().await.unwrap();
        let claims = decode_claims(body["token"].as_str().unwrap());
        assert_eq!(claims.iss, "Chirpy");
        assert_eq!(claims.exp - claims.iat, expected, "requested {}", requested);
    }
}

// --- Session lifecycle ---

#[tokio::test]
async fn refresh_and_revoke_lifecycle() {
    let app = spawn_app();
    let login = app.signed_in_user("a@b.com", "pw123").await;
    let user_id = login["id"].as_str().unwrap().to_string();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    // refresh gives a new valid session token for the same user
    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let session = body["token"].as_str().expect("No session token");
    let subject = validate_session_token(session, TEST_SECRET).unwrap();
    assert_eq!(subject.to_string(), user_id);

    // refresh token is not rotated
    let again = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, again.status().as_u16());

    let revoked = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, revoked.status().as_u16());

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_REVOKED");

    // revoking again is harmless
    let revoked_again = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, revoked_again.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_missing_and_unknown_tokens() {
    let app = spawn_app();

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");

    let response = app.post_with_bearer("/api/refresh", "definitely_not_issued").await;
    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn session_token_is_not_a_refresh_token() {
    let app = spawn_app();
    let login = app.signed_in_user("a@b.com", "pw123").await;

    let response = app
        .post_with_bearer("/api/refresh", login["token"].as_str().unwrap())
        .await;

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn revoke_unknown_token_returns_401() {
    let app = spawn_app();

    let response = app.post_with_bearer("/api/revoke", "never-issued").await;
    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_NOT_FOUND");
}

#[tokio::test]
async fn refresh_rejects_non_bearer_authorization() {
    let app = spawn_app();
    let login = app.signed_in_user("a@b.com", "pw123").await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .header("Authorization", format!("Basic {}", refresh_token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "INVALID_AUTHORIZATION_HEADER");
}

// --- Credential updates ---

#[tokio::test]
async fn update_user_requires_session_token() {
    let app = spawn_app();

    let response = app
        .client
        .put(app.url("/api/users"))
        .json(&json!({"email": "a@b.com", "password": "pw123"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "MISSING_TOKEN");
}

#[tokio::test]
async fn update_user_changes_credentials_and_revokes_refresh_tokens() {
    let app = spawn_app();
    let login = app.signed_in_user("a@b.com", "pw123").await;
    let token = login["token"].as_str().unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"email": "new@b.com", "password": "newpw"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "new@b.com");
    assert_eq!(body["id"], login["id"]);

    let old = app.login_with(json!({"email": "a@b.com", "password": "pw123"})).await;
    assert_eq!(401, old.status().as_u16());

    let new = app.login_with(json!({"email": "new@b.com", "password": "newpw"})).await;
    assert_eq!(200, new.status().as_u16());

    let refreshed = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, refreshed.status().as_u16());
    assert_eq!(error_code(refreshed).await, "TOKEN_REVOKED");
}

#[tokio::test]
async fn update_user_rejects_token_signed_with_other_secret() {
    let app = spawn_app();
    app.register("a@b.com", "pw123").await;

    let forged = chirpy::auth::issue_session_token(
        Uuid::new_v4(),
        "some-other-secret",
        chrono::Duration::minutes(5),
    )
    .unwrap();

    let response = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", forged))
        .json(&json!({"email": "a@b.com", "password": "pw123"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_INVALID");
}

#[tokio::test]
async fn update_user_rejects_unsigned_token() {
    let app = spawn_app();
    app.register("a@b.com", "pw123").await;

    // header {"alg":"none","typ":"JWT"}, payload {}, no signature
    let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.e30.";

    let response = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", unsigned))
        .json(&json!({"email": "a@b.com", "password": "pw123"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    assert_eq!(error_code(response).await, "TOKEN_INVALID");
}
