//! Group management: CRUD, membership, settings, bulk archival

use serde_json::{Value, json};

use crate::client::{Params, Transport};
use crate::error::{Error, Result};

/// Get info for all active groups available to the current user
pub async fn get_groups(api: &dyn Transport) -> Result<Value> {
    api.get("/api/v1/vigiles/groups", Params::new()).await
}

/// Get info for all archived groups available to the current user
pub async fn get_archived_groups(api: &dyn Transport) -> Result<Value> {
    api.get("/api/v1/vigiles/groups/archived", Params::new())
        .await
}

/// Create a new group, or a subgroup when a parent token is available
///
/// The parent token falls back to the transport's configured default
/// group token; with neither, a top-level group is created.
pub async fn create_group(
    api: &dyn Transport,
    group_name: &str,
    group_description: Option<&str>,
    group_token: Option<&str>,
) -> Result<Value> {
    if group_name.is_empty() {
        return Err(Error::required("group_name"));
    }

    let mut params = Params::new();
    params.insert("group_name".into(), json!(group_name));

    if let Some(description) = group_description.filter(|d| !d.is_empty()) {
        params.insert("description".into(), json!(description));
    }

    let parent = group_token.or_else(|| api.group_token());
    if let Some(parent) = parent {
        params.insert("group_token".into(), json!(parent));
    }

    api.post("/api/v1/vigiles/groups", params).await
}

/// Get group information for a token, falling back to the configured
/// default group token
pub async fn get_group_info(
    api: &dyn Transport,
    group_token: Option<&str>,
    subgroups: bool,
) -> Result<Value> {
    let token = resolve_group_token(api, group_token)?;

    let resource = format!("/api/v1/vigiles/groups/{token}");
    let mut params = Params::new();
    params.insert("subgroups".into(), json!(subgroups));

    api.get(&resource, params).await
}

/// Mark multiple groups as archived
pub async fn bulk_archive_groups(api: &dyn Transport, tokens: &[String]) -> Result<Value> {
    bulk_archive(api, tokens, "archive").await
}

/// Mark multiple groups as unarchived
pub async fn bulk_unarchive_groups(api: &dyn Transport, tokens: &[String]) -> Result<Value> {
    bulk_archive(api, tokens, "unarchive").await
}

async fn bulk_archive(api: &dyn Transport, tokens: &[String], action: &str) -> Result<Value> {
    if tokens.is_empty() {
        return Err(Error::required("tokens"));
    }

    let mut params = Params::new();
    params.insert("tokens".into(), json!(tokens));

    let resource = format!("/api/v1/vigiles/groups/{action}");
    api.patch(&resource, params).await
}

/// Delete a group or subgroup
pub async fn delete_group(api: &dyn Transport, group_token: &str) -> Result<Value> {
    if group_token.is_empty() {
        return Err(Error::required("group_token"));
    }

    let resource = format!("/api/v1/vigiles/groups/{group_token}");
    api.delete(&resource, Params::new()).await
}

/// Get the member list for a group
pub async fn get_group_members(api: &dyn Transport, group_token: &str) -> Result<Value> {
    if group_token.is_empty() {
        return Err(Error::required("group_token"));
    }

    let resource = format!("/api/v1/vigiles/groups/{group_token}/members");
    api.get(&resource, Params::new()).await
}

/// Add a member to a group
///
/// `access_subgroups` grants the member access to all subgroups of the
/// group as well.
pub async fn add_group_member(
    api: &dyn Transport,
    group_token: &str,
    member_email: &str,
    role: &str,
    access_subgroups: bool,
) -> Result<Value> {
    if group_token.is_empty() {
        return Err(Error::required("group_token"));
    }
    if member_email.is_empty() {
        return Err(Error::required("member_email"));
    }
    if role.is_empty() {
        return Err(Error::required("role"));
    }

    let resource = format!("/api/v1/vigiles/groups/{group_token}/members");
    let mut params = Params::new();
    params.insert("member_email".into(), json!(member_email));
    params.insert("role".into(), json!(role));
    params.insert("allow_access_to_subgroups".into(), json!(access_subgroups));

    api.post(&resource, params).await
}

/// Change a group member's role
pub async fn update_group_member(
    api: &dyn Transport,
    group_token: &str,
    member_email: &str,
    new_role: &str,
) -> Result<Value> {
    if group_token.is_empty() {
        return Err(Error::required("group_token"));
    }
    if member_email.is_empty() {
        return Err(Error::required("member_email"));
    }
    if new_role.is_empty() {
        return Err(Error::required("new_role"));
    }

    let resource = format!("/api/v1/vigiles/groups/{group_token}/members/{member_email}");
    let mut params = Params::new();
    params.insert("new_role".into(), json!(new_role));

    api.put(&resource, params).await
}

/// Remove a user from a group
pub async fn remove_group_member(
    api: &dyn Transport,
    group_token: &str,
    member_email: &str,
) -> Result<Value> {
    if group_token.is_empty() {
        return Err(Error::required("group_token"));
    }
    if member_email.is_empty() {
        return Err(Error::required("member_email"));
    }

    let resource = format!("/api/v1/vigiles/groups/{group_token}/members/{member_email}");
    api.delete(&resource, Params::new()).await
}

/// Get vulnerability-matching settings for a group
pub async fn get_group_settings(api: &dyn Transport, group_token: Option<&str>) -> Result<Value> {
    let token = resolve_group_token(api, group_token)?;

    let resource = format!("/api/v1/vigiles/groups/{token}/settings");
    api.get(&resource, Params::new()).await
}

/// Update vulnerability-matching settings for a group
///
/// `vuln_identifiers` is the list of identifiers used to match
/// vulnerabilities; `vuln_strict_match` is "on" or "off".
pub async fn update_group_settings(
    api: &dyn Transport,
    group_token: Option<&str>,
    vuln_identifiers: Option<&[String]>,
    vuln_strict_match: Option<&str>,
) -> Result<Value> {
    let token = resolve_group_token(api, group_token)?;

    let resource = format!("/api/v1/vigiles/groups/{token}/settings");
    let mut params = Params::new();
    if let Some(identifiers) = vuln_identifiers {
        params.insert("vuln_identifiers".into(), json!(identifiers));
    }
    if let Some(strict) = vuln_strict_match {
        params.insert("vuln_strict_match".into(), json!(strict));
    }

    api.patch(&resource, params).await
}

fn resolve_group_token<'a>(api: &'a dyn Transport, explicit: Option<&'a str>) -> Result<&'a str> {
    explicit
        .filter(|t| !t.is_empty())
        .or_else(|| api.group_token())
        .ok_or_else(|| {
            Error::InvalidArgument(
                "group_token is required either as a parameter or configured on the client"
                    .to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;

    #[tokio::test]
    async fn test_create_group_requires_name() {
        let mock = MockTransport::new();
        let err = create_group(&mock, "", None, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_group_uses_configured_parent() {
        let mock = MockTransport::new().with_group_token("parent");
        create_group(&mock, "subgroup", Some("desc"), None)
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].params["group_token"], json!("parent"));
        assert_eq!(requests[0].params["description"], json!("desc"));
    }

    #[tokio::test]
    async fn test_get_group_info_falls_back_to_configured_token() {
        let mock = MockTransport::new().with_group_token("grp");
        get_group_info(&mock, None, true).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].path, "/api/v1/vigiles/groups/grp");
        assert_eq!(requests[0].params["subgroups"], json!(true));
    }

    #[tokio::test]
    async fn test_get_group_info_without_any_token() {
        let mock = MockTransport::new();
        let err = get_group_info(&mock, None, false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_archive_requires_tokens() {
        let mock = MockTransport::new();
        let err = bulk_archive_groups(&mock, &[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_archive_and_unarchive_paths() {
        let mock = MockTransport::new();
        let tokens = vec!["g1".to_string(), "g2".to_string()];

        bulk_archive_groups(&mock, &tokens).await.unwrap();
        bulk_unarchive_groups(&mock, &tokens).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].path, "/api/v1/vigiles/groups/archive");
        assert_eq!(requests[1].path, "/api/v1/vigiles/groups/unarchive");
        assert_eq!(requests[0].params["tokens"], json!(["g1", "g2"]));
    }

    #[tokio::test]
    async fn test_add_member_requires_all_fields() {
        let mock = MockTransport::new();

        let err = add_group_member(&mock, "grp", "", "admin", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = add_group_member(&mock, "grp", "a@example.com", "", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_member_lifecycle_paths() {
        let mock = MockTransport::new();

        add_group_member(&mock, "grp", "a@example.com", "member", true)
            .await
            .unwrap();
        update_group_member(&mock, "grp", "a@example.com", "admin")
            .await
            .unwrap();
        remove_group_member(&mock, "grp", "a@example.com")
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/v1/vigiles/groups/grp/members");
        assert_eq!(requests[0].params["allow_access_to_subgroups"], json!(true));
        assert_eq!(requests[1].method, "PUT");
        assert_eq!(
            requests[1].path,
            "/api/v1/vigiles/groups/grp/members/a@example.com"
        );
        assert_eq!(requests[1].params["new_role"], json!("admin"));
        assert_eq!(requests[2].method, "DELETE");
    }

    #[tokio::test]
    async fn test_update_settings_includes_only_set_fields() {
        let mock = MockTransport::new().with_group_token("grp");
        update_group_settings(&mock, None, None, Some("on"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, "PATCH");
        assert_eq!(requests[0].path, "/api/v1/vigiles/groups/grp/settings");
        assert_eq!(requests[0].params["vuln_strict_match"], json!("on"));
        assert!(!requests[0].params.contains_key("vuln_identifiers"));
    }
}
