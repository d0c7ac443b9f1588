//! Vigiles API client
//!
//! The [`Transport`] trait is the verb-level interface every resource
//! module dispatches through: one method per HTTP verb plus the
//! process-wide defaults (base URL, default tokens, dry-run flag) that
//! some operations fall back to. [`VigilesClient`] is the reqwest-backed
//! implementation; a `MockTransport` is available under `cfg(test)`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub mod api;
pub mod export;
pub mod http;
#[cfg(test)]
pub mod mock;

#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockTransport;
pub use http::VigilesClient;

/// Request parameter map.
///
/// GET and DELETE parameters are encoded into the query string (arrays as
/// repeated keys); POST, PUT, and PATCH parameters are sent as a JSON
/// body. Resource modules insert a key only when the parameter is set, so
/// omission is the "unset" signal on the wire.
pub type Params = serde_json::Map<String, Value>;

/// Verb-level API transport
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: Params) -> Result<Value>;

    /// GET returning the raw response body, for file-returning endpoints
    async fn get_raw(&self, path: &str, params: Params) -> Result<Vec<u8>>;

    async fn post(&self, path: &str, params: Params) -> Result<Value>;

    async fn put(&self, path: &str, params: Params) -> Result<Value>;

    async fn patch(&self, path: &str, params: Params) -> Result<Value>;

    async fn delete(&self, path: &str, params: Params) -> Result<Value>;

    /// Service base URL, used to resolve relative report paths
    fn base_url(&self) -> &str;

    /// Configured default group token
    fn group_token(&self) -> Option<&str>;

    /// Configured default folder token
    fn folder_token(&self) -> Option<&str>;

    /// Configured legacy product token
    fn product_token(&self) -> Option<&str>;

    /// Whether requests are constructed but not sent
    fn dry_run(&self) -> bool;
}
