#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::AuthSettings;
use chirpy::metrics::AtomicHitCounter;
use chirpy::startup::run;
use chirpy::store::{InMemoryStore, Stores};
use reqwest::Response;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub metrics: Arc<AtomicHitCounter>,
    pub auth: AuthSettings,
    pub client: reqwest::Client,
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let auth = AuthSettings {
        secret: TEST_SECRET.to_string(),
        access_token_ttl_seconds: 3600,
        refresh_token_ttl_days: 60,
    };
    let store = Arc::new(InMemoryStore::default());
    let metrics = Arc::new(AtomicHitCounter::default());

    let server = run(
        listener,
        Stores::from_memory(store.clone()),
        auth.clone(),
        metrics.clone(),
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        metrics,
        auth,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login_with(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/login"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers and logs in, returning the login response body.
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        let registered = self.register(email, password).await;
        assert_eq!(201, registered.status().as_u16());

        let response = self
            .login_with(json!({ "email": email, "password": password }))
            .await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> Response {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> Response {
        self.client
            .post(self.url("/api/chirps"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn error_code(response: Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body["code"].as_str().unwrap_or_default().to_string()
}
