//! Mock implementations of platform traits for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AuthError, Result};
use crate::platform::{Environment, HttpClient, HttpResponse};

/// Mock HTTP client with pre-configured responses
///
/// Each entry pairs a URL substring with the response to return for it.
/// Every request is recorded as "METHOD url" for later inspection.
pub struct MockHttp {
    responses: Vec<(String, HttpResponse)>,
    calls: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new(responses: Vec<(String, HttpResponse)>) -> Self {
        Self {
            responses,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, url: &str) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(format!("{} {}", method, url));
        for (pattern, response) in &self.responses {
            if url.contains(pattern) {
                return Ok(HttpResponse {
                    status: response.status,
                    body: response.body.clone(),
                });
            }
        }
        Err(AuthError::internal(format!(
            "no mock response for {} {}",
            method, url
        )))
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.respond("GET", url)
    }

    async fn post(&self, url: &str, _headers: &[(&str, &str)], _body: &[u8]) -> Result<HttpResponse> {
        self.respond("POST", url)
    }
}

/// Mock environment backed by in-memory HashMaps
pub struct MockEnv {
    vars: HashMap<String, String>,
    secrets: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: HashMap<String, String>, secrets: HashMap<String, String>) -> Self {
        Self { vars, secrets }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new(), HashMap::new())
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::internal(format!("variable '{}' not found", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::internal(format!("secret '{}' not found", name)))
    }
}
