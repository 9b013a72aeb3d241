use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use payroll_console::api::{EmployeeQueries, QueryCache};
use payroll_console::auth::{MemoryStorage, SessionStorage, SessionStore};
use payroll_console::auth::storage::{TOKEN_KEY, USER_KEY};
use payroll_console::errors::{ClientError, Result};
use payroll_console::http::{ApiClient, ApiRequest, ApiResponse, AuthState, Transport};
use payroll_console::models::LoginReqDto;
use payroll_console::route::Route;
use serde_json::json;

mock! {
    pub Backend {}

    #[async_trait]
    impl Transport for Backend {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
    }
}

fn credentials() -> LoginReqDto {
    LoginReqDto {
        username: "admin".to_string(),
        password: "admin123".to_string(),
    }
}

/// Backend double that records the Authorization header of every call.
fn recording_backend(seen: Arc<Mutex<Vec<(String, Option<String>)>>>) -> MockBackend {
    let mut backend = MockBackend::new();
    backend.expect_execute().returning(move |req| {
        seen.lock()
            .unwrap()
            .push((req.path.clone(), req.header("Authorization").map(str::to_string)));
        match req.path.as_str() {
            "/api/auth/token" => Ok(ApiResponse::ok(json!({
                "token": "abc.def.ghi",
                "user": {"username": "admin", "role": "ADMIN"}
            }))),
            "/api/auth/logout" => Ok(ApiResponse::new(503, json!({"message": "down"}))),
            _ => Ok(ApiResponse::ok(json!([{"id": 1, "name": "Ravi"}]))),
        }
    });
    backend
}

#[tokio::test]
async fn test_bearer_follows_session_lifecycle() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let client = ApiClient::new(
        "http://backend",
        Arc::new(recording_backend(seen.clone())),
        AuthState::new(),
    );
    let storage = Arc::new(MemoryStorage::new());
    let sessions = SessionStore::restore(client.clone(), storage.clone());
    let employees = EmployeeQueries::new(client.clone(), QueryCache::default());

    assert!(!sessions.is_authenticated());

    let session = sessions.login(&credentials()).await.unwrap();
    assert_eq!(session.user.username, "admin");
    assert!(sessions.token().is_some() && sessions.user().is_some());

    employees.list().await.unwrap();

    let outcome = sessions.logout().await;
    assert!(!outcome.backend_acknowledged);
    assert_eq!(outcome.redirect, Route::Login);
    assert!(sessions.token().is_none() && sessions.user().is_none());
    assert!(!client.auth().is_set());
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);

    let calls = seen.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("/api/auth/token".to_string(), None),
            ("/api/employees".to_string(), Some("Bearer abc.def.ghi".to_string())),
            ("/api/auth/logout".to_string(), Some("Bearer abc.def.ghi".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_restored_session_authorizes_first_call() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    storage.set(TOKEN_KEY, "persisted").unwrap();
    storage.set(USER_KEY, r#"{"username":"hr"}"#).unwrap();

    let mut backend = MockBackend::new();
    backend
        .expect_execute()
        .withf(|req| req.header("Authorization") == Some("Bearer persisted"))
        .times(1)
        .returning(|_| Ok(ApiResponse::ok(json!([]))));

    let client = ApiClient::new("http://backend", Arc::new(backend), AuthState::new());
    let sessions = SessionStore::restore(client.clone(), storage);
    assert!(sessions.is_authenticated());

    let employees = EmployeeQueries::new(client, QueryCache::default());
    assert!(employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_network_failure_on_login_is_transport_error() {
    let mut backend = MockBackend::new();
    backend.expect_execute().returning(|_| {
        Err(ClientError::Transport {
            message: "connection refused".to_string(),
            payload: None,
        })
    });

    let client = ApiClient::new("http://backend", Arc::new(backend), AuthState::new());
    let sessions = SessionStore::restore(client, Arc::new(MemoryStorage::new()));

    let err = sessions.login(&credentials()).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
    assert_eq!(err.user_message("Login failed"), "Login failed");
    assert!(!sessions.is_authenticated());
}
