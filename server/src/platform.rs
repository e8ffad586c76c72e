//! Server platform implementations
//!
//! Implements the core platform traits for a long-running process:
//! - HttpClient: reqwest with a request timeout and GET retries
//! - Environment: std::env
//! - SessionStore: in-memory HashMap behind a mutex

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use steam_login_core::error::{AuthError, Result};
use steam_login_core::platform::{Environment, HttpClient, HttpResponse, SessionStore};

/// Retries after the first attempt, GET requests only
const MAX_GET_RETRIES: u32 = 2;

/// First retry delay, doubled per attempt
const RETRY_DELAY_MS: u64 = 250;

/// reqwest-based HTTP client
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AuthError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn try_get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut builder = self.client.get(url);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::internal(format!("HTTP GET failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::internal(format!("failed to read response: {}", e)))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    /// GET with retries on transport errors and 5xx responses.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut delay = Duration::from_millis(RETRY_DELAY_MS);
        let mut attempt = 0;

        loop {
            match self.try_get(url, headers).await {
                Ok(response) if response.status < 500 => return Ok(response),
                result if attempt >= MAX_GET_RETRIES => return result,
                result => {
                    match &result {
                        Ok(response) => {
                            warn!(url, attempt, status = response.status, "retrying GET")
                        }
                        Err(e) => warn!(url, attempt, error = %e, "retrying GET"),
                    }
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }

    /// POST without retries; the verification exchange is sent once.
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        let mut builder = self.client.post(url).body(body.to_vec());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AuthError::internal(format!("HTTP POST failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::internal(format!("failed to read response: {}", e)))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// Process environment, secrets included
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        std::env::var(name)
            .map_err(|_| AuthError::internal(format!("environment variable '{}' not set", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.get_var(name)
    }
}

/// In-memory session store (single-process deployments)
pub struct MemorySessionStore {
    store: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.store
            .lock()
            .map_err(|_| AuthError::internal("session lock poisoned"))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &str) -> Result<Option<String>> {
        Ok(self.locked()?.get(token).cloned())
    }

    async fn put(&self, token: &str, value: &str) -> Result<()> {
        self.locked()?.insert(token.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, token: &str) -> Result<()> {
        self.locked()?.remove(token);
        Ok(())
    }
}
