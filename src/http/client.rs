use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{ClientError, Result};
use crate::http::auth_state::AuthState;
use crate::http::transport::{ApiRequest, ApiResponse, HttpMethod, Transport};

/// Observes failed calls after they are mapped to an error. The error is
/// always returned to the caller afterwards; a hook cannot swallow it.
pub trait ResponseHook: Send + Sync {
    fn on_failure(&self, _request: &ApiRequest, _error: &ClientError) {}
}

/// Default hook: nothing global happens on failure.
pub struct PassThrough;

impl ResponseHook for PassThrough {}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    auth: AuthState,
    hook: Arc<dyn ResponseHook>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>, auth: AuthState) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            auth,
            hook: Arc::new(PassThrough),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn ResponseHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Request stage: JSON content type always, bearer token when present.
    pub fn prepare(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(value) = self.auth.authorization() {
            headers.push(("Authorization".to_string(), value));
        }

        ApiRequest {
            method,
            path: path.to_string(),
            url: format!("{}{}", self.base_url, path),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers,
            body,
        }
    }

    /// Runs a prepared request through the transport and the response stage.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, path = %request.path, "sending request");

        let outcome = match self.transport.execute(request.clone()).await {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) => ClientError::from_status(response.status, response.body),
            Err(e) => e,
        };

        warn!(method = %request.method, path = %request.path, error = %outcome, "request failed");
        self.hook.on_failure(&request, &outcome);
        Err(outcome)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.prepare(HttpMethod::Get, path, query, None);
        decode(self.send(request).await?)
    }

    pub async fn get_value(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = self.prepare(HttpMethod::Get, path, query, None);
        Ok(self.send(request).await?.body)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.prepare(HttpMethod::Post, path, &[], Some(serde_json::to_value(body)?));
        decode(self.send(request).await?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.prepare(HttpMethod::Put, path, &[], Some(serde_json::to_value(body)?));
        decode(self.send(request).await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.prepare(HttpMethod::Delete, path, &[], None);
        self.send(request).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T> {
    Ok(serde_json::from_value(response.body)?)
}
