//! Shared harness: a real server on an ephemeral port, backed by the
//! in-memory store, driven through the client SDK or raw requests.

use axum::Router;
use carbook::auth::{HeaderSessions, RoleAccess};
use carbook::client::{ApiClient, AuthHeaders};
use carbook::store::MemStore;
use carbook::{api_routes, health_routes, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

pub struct TestServer {
    pub base_url: String,
    pub http: reqwest::Client,
}

pub async fn spawn() -> TestServer {
    let state = AppState {
        store: Arc::new(MemStore::new()),
        sessions: Arc::new(HeaderSessions),
        access: Arc::new(RoleAccess::default()),
    };
    let app = Router::new()
        .merge(health_routes())
        .nest("/api", api_routes(state));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{addr}"),
        http: reqwest::Client::new(),
    }
}

impl TestServer {
    pub fn client_with_roles(&self, roles: &[&str]) -> ApiClient {
        ApiClient::new(
            self.base_url.clone(),
            AuthHeaders {
                user_id: Uuid::new_v4().to_string(),
                tenant_id: Uuid::new_v4().to_string(),
                roles: roles.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    pub fn admin(&self) -> ApiClient {
        self.client_with_roles(&["admin"])
    }

    pub fn viewer(&self) -> ApiClient {
        self.client_with_roles(&["viewer"])
    }

    /// Raw request with valid session headers, for cases the typed client
    /// cannot express (unmapped verbs, malformed queries).
    pub fn raw(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-User-Id", Uuid::new_v4().to_string())
            .header("X-Tenant-Id", Uuid::new_v4().to_string())
            .header("X-Roles", "admin")
    }
}
