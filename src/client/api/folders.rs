//! Folder listing and creation

use serde_json::{Value, json};

use crate::client::{Params, Transport};
use crate::error::{Error, Result};

/// Get all folders owned by the current user
///
/// A configured product token limits results to that product's folders;
/// a configured folder token limits results to that folder's children.
/// The folder token takes precedence when both are present.
pub async fn get_folders(
    api: &dyn Transport,
    product_token: Option<&str>,
    folder_token: Option<&str>,
) -> Result<Value> {
    let product_token = product_token.or_else(|| api.product_token());
    let folder_token = folder_token.or_else(|| api.folder_token());

    let mut params = Params::new();
    if let Some(product) = product_token {
        if folder_token.is_none() {
            params.insert("product_token".into(), json!(product));
        }
    }
    if let Some(folder) = folder_token {
        params.insert("folder_token".into(), json!(folder));
    }

    api.get("/api/v1/vigiles/folders", params).await
}

/// Create a folder under a group, or a sub-folder under an existing
/// folder when a parent folder token is given
///
/// The owning group token falls back to the transport's configured
/// default; without either, the operation fails before any request.
pub async fn create_folder(
    api: &dyn Transport,
    folder_name: &str,
    description: Option<&str>,
    group_token: Option<&str>,
    parent_folder_token: Option<&str>,
) -> Result<Value> {
    if folder_name.is_empty() {
        return Err(Error::required("folder_name"));
    }

    let group_token = group_token.or_else(|| api.group_token());
    let Some(group_token) = group_token else {
        return Err(Error::InvalidArgument(
            "group_token is required either as a parameter or configured on the client".to_string(),
        ));
    };

    let mut params = Params::new();
    params.insert("folder_name".into(), json!(folder_name));
    params.insert("group_token".into(), json!(group_token));
    if let Some(description) = description {
        params.insert("description".into(), json!(description));
    }
    if let Some(parent) = parent_folder_token {
        params.insert("folder_token".into(), json!(parent));
    }

    api.post("/api/v1/vigiles/folders", params).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;

    #[tokio::test]
    async fn test_get_folders_prefers_folder_token() {
        let mock = MockTransport::new()
            .with_product_token("prd")
            .with_folder_token("fld");

        get_folders(&mock, None, None).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].params["folder_token"], json!("fld"));
        assert!(!requests[0].params.contains_key("product_token"));
    }

    #[tokio::test]
    async fn test_get_folders_product_only() {
        let mock = MockTransport::new().with_product_token("prd");
        get_folders(&mock, None, None).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].params["product_token"], json!("prd"));
    }

    #[tokio::test]
    async fn test_get_folders_explicit_overrides_configured() {
        let mock = MockTransport::new().with_folder_token("configured");
        get_folders(&mock, None, Some("explicit")).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].params["folder_token"], json!("explicit"));
    }

    #[tokio::test]
    async fn test_create_folder_requires_name() {
        let mock = MockTransport::new().with_group_token("grp");
        let err = create_folder(&mock, "", None, None, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_folder_requires_a_group_token() {
        let mock = MockTransport::new();
        let err = create_folder(&mock, "builds", None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_subfolder_under_parent() {
        let mock = MockTransport::new().with_group_token("grp");
        create_folder(&mock, "nightly", Some("nightly builds"), None, Some("parent"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/v1/vigiles/folders");
        assert_eq!(requests[0].params["folder_name"], json!("nightly"));
        assert_eq!(requests[0].params["group_token"], json!("grp"));
        assert_eq!(requests[0].params["folder_token"], json!("parent"));
    }
}
