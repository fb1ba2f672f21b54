//! In-memory `SocrataApi` for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{ApiError, SocrataApi};

/// Answers exact URLs with canned bodies or statuses and records every call.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct MockApi {
    routes: HashMap<String, Result<Value, u16>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: impl Into<String>, body: Value) -> Self {
        self.routes.insert(url.into(), Ok(body));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.routes.insert(url.into(), Err(status));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl SocrataApi for MockApi {
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.routes.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ApiError::Status {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(ApiError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
