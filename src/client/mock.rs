//! Mock transport for testing
//!
//! Captures every dispatched request so tests can assert on paths and
//! parameter maps, or on the absence of any dispatch at all (the
//! fail-fast validation contract).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Params, Transport};
use crate::error::Result;

/// A captured request for test assertions
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP verb name ("GET", "POST", ...)
    pub method: String,
    /// Resource path
    pub path: String,
    /// Parameter map as handed to the transport
    pub params: Params,
    /// Whether the raw-bytes variant was used
    pub raw: bool,
}

/// Scriptable in-memory transport
pub struct MockTransport {
    responses: Mutex<VecDeque<Value>>,
    raw_responses: Mutex<VecDeque<Vec<u8>>>,
    captured: Mutex<Vec<CapturedRequest>>,
    base_url: String,
    group_token: Option<String>,
    folder_token: Option<String>,
    product_token: Option<String>,
    dry_run: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            raw_responses: Mutex::new(VecDeque::new()),
            captured: Mutex::new(Vec::new()),
            base_url: "https://vigiles.example.com".to_string(),
            group_token: None,
            folder_token: None,
            product_token: None,
            dry_run: false,
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response; responses are consumed in order. When the
    /// queue is empty an empty object is returned.
    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a raw-bytes response for `get_raw`
    pub fn with_raw_response(self, response: Vec<u8>) -> Self {
        self.raw_responses.lock().unwrap().push_back(response);
        self
    }

    pub fn with_group_token(mut self, token: &str) -> Self {
        self.group_token = Some(token.to_string());
        self
    }

    pub fn with_folder_token(mut self, token: &str) -> Self {
        self.folder_token = Some(token.to_string());
        self
    }

    #[allow(dead_code)]
    pub fn with_product_token(mut self, token: &str) -> Self {
        self.product_token = Some(token.to_string());
        self
    }

    #[allow(dead_code)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    #[allow(dead_code)]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// All captured requests, in dispatch order
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    /// Number of requests dispatched through this transport
    pub fn call_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    fn capture(&self, method: &str, path: &str, params: &Params, raw: bool) {
        self.captured.lock().unwrap().push(CapturedRequest {
            method: method.to_string(),
            path: path.to_string(),
            params: params.clone(),
            raw,
        });
    }

    fn next_response(&self) -> Value {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| json!({}))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: Params) -> Result<Value> {
        self.capture("GET", path, &params, false);
        Ok(self.next_response())
    }

    async fn get_raw(&self, path: &str, params: Params) -> Result<Vec<u8>> {
        self.capture("GET", path, &params, true);
        Ok(self
            .raw_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn post(&self, path: &str, params: Params) -> Result<Value> {
        self.capture("POST", path, &params, false);
        Ok(self.next_response())
    }

    async fn put(&self, path: &str, params: Params) -> Result<Value> {
        self.capture("PUT", path, &params, false);
        Ok(self.next_response())
    }

    async fn patch(&self, path: &str, params: Params) -> Result<Value> {
        self.capture("PATCH", path, &params, false);
        Ok(self.next_response())
    }

    async fn delete(&self, path: &str, params: Params) -> Result<Value> {
        self.capture("DELETE", path, &params, false);
        Ok(self.next_response())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn group_token(&self) -> Option<&str> {
        self.group_token.as_deref()
    }

    fn folder_token(&self) -> Option<&str> {
        self.folder_token.as_deref()
    }

    fn product_token(&self) -> Option<&str> {
        self.product_token.as_deref()
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_queued_responses_in_order() {
        let mock = MockTransport::new()
            .with_response(json!({"first": 1}))
            .with_response(json!({"second": 2}));

        let a = mock.get("/a", Params::new()).await.unwrap();
        let b = mock.get("/b", Params::new()).await.unwrap();
        let c = mock.get("/c", Params::new()).await.unwrap();

        assert_eq!(a["first"], json!(1));
        assert_eq!(b["second"], json!(2));
        assert_eq!(c, json!({}));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_captures_method_and_params() {
        let mock = MockTransport::new();
        let mut params = Params::new();
        params.insert("confirmed".into(), json!(true));

        mock.delete("/api/v1/vigiles/manifests/m1", params)
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/api/v1/vigiles/manifests/m1");
        assert_eq!(requests[0].params["confirmed"], json!(true));
        assert!(!requests[0].raw);
    }
}
