//! Reqwest-backed Vigiles API transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::{Value, json};

use super::{Params, Transport};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Vigiles API client
///
/// Owns the HTTP connection, credentials, and the configured defaults
/// that resource operations fall back to. This layer never retries and
/// never interprets response payloads beyond JSON parsing.
pub struct VigilesClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    email: Option<String>,
    group_token: Option<String>,
    folder_token: Option<String>,
    product_token: Option<String>,
    dry_run: bool,
}

impl VigilesClient {
    /// Create a client from loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            email: config.email.clone(),
            group_token: config.group_token.clone(),
            folder_token: config.folder_token.clone(),
            product_token: config.product_token.clone(),
            dry_run: config.dry_run,
        })
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> Result<reqwest::RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        let as_query = method == Method::GET || method == Method::DELETE;
        let mut request = self.http.request(method, &url);

        if let Some(ref key) = self.api_key {
            request = request.header("X-ApiKey", key);
        }
        if let Some(ref email) = self.email {
            request = request.header("X-Email", email);
        }

        // Query params for body-less verbs, JSON body otherwise
        request = if as_query {
            request.query(&encode_query(params))
        } else {
            request.json(&Value::Object(params.clone()))
        };

        Ok(request)
    }

    /// Describe the request instead of sending it (dry-run mode)
    fn describe(&self, method: &Method, path: &str, params: &Params) -> Value {
        json!({
            "dry_run": true,
            "method": method.as_str(),
            "url": format!("{}{}", self.base_url, path),
            "params": Value::Object(params.clone()),
        })
    }

    async fn request_json(&self, method: Method, path: &str, params: Params) -> Result<Value> {
        if self.dry_run {
            return Ok(self.describe(&method, path, &params));
        }

        let response = self
            .build_request(method, path, &params)?
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = check_status(response).await?;
        let data = response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {e}")))?;
        Ok(data)
    }
}

/// Flatten a parameter map into query pairs; array values become
/// repeated keys, which the service accepts for list parameters.
fn encode_query(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_to_string(other))),
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map a response status onto the API error taxonomy
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    match status {
        StatusCode::OK => Ok(response),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
        StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
        StatusCode::NOT_FOUND => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Resource not found".to_string());
            Err(ApiError::NotFound(error_msg).into())
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Bad request".to_string());
            Err(ApiError::BadRequest(error_msg).into())
        }
        status if status.is_server_error() => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Server error: {status}"));
            Err(ApiError::ServerError(error_msg).into())
        }
        _ => Err(ApiError::InvalidResponse(format!("Unexpected status code: {status}")).into()),
    }
}

#[async_trait]
impl Transport for VigilesClient {
    async fn get(&self, path: &str, params: Params) -> Result<Value> {
        self.request_json(Method::GET, path, params).await
    }

    async fn get_raw(&self, path: &str, params: Params) -> Result<Vec<u8>> {
        if self.dry_run {
            let desc = self.describe(&Method::GET, path, &params);
            return Ok(desc.to_string().into_bytes());
        }

        let response = self
            .build_request(Method::GET, path, &params)?
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }

    async fn post(&self, path: &str, params: Params) -> Result<Value> {
        self.request_json(Method::POST, path, params).await
    }

    async fn put(&self, path: &str, params: Params) -> Result<Value> {
        self.request_json(Method::PUT, path, params).await
    }

    async fn patch(&self, path: &str, params: Params) -> Result<Value> {
        self.request_json(Method::PATCH, path, params).await
    }

    async fn delete(&self, path: &str, params: Params) -> Result<Value> {
        self.request_json(Method::DELETE, path, params).await
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
