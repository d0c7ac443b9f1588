//! CVE lookups and vulnerability-status overrides

use serde_json::{Value, json};

use crate::client::{Params, Transport};
use crate::error::{Error, Result};

/// Get CVE info by CVE ID
///
/// `fields` limits the returned CVE data to the given fields; when none
/// are specified the server returns all of them.
pub async fn get_cve_info(
    api: &dyn Transport,
    cve_id: &str,
    fields: Option<&[String]>,
) -> Result<Value> {
    if cve_id.is_empty() {
        return Err(Error::required("cve_id"));
    }

    let resource = format!("/api/v1/vigiles/cves/{cve_id}");
    let mut params = Params::new();
    if let Some(fields) = fields {
        params.insert("fields".into(), json!(fields));
    }

    api.get(&resource, params).await
}

/// Get CVEs which affect the given CPE product, optionally filtered by
/// version
///
/// Returns a list of CVE ids when `ids_only` is true, otherwise a map of
/// CVE identifiers to descriptions.
pub async fn search_cves_by_product(
    api: &dyn Transport,
    cpe_product: &str,
    version: &str,
    ids_only: bool,
) -> Result<Value> {
    if cpe_product.is_empty() {
        return Err(Error::required("cpe_product"));
    }

    let mut params = Params::new();
    params.insert("product".into(), json!(cpe_product));
    params.insert("version".into(), json!(version));
    params.insert("ids_only".into(), json!(ids_only));

    api.get("/api/v1/vigiles/cves", params).await
}

/// Status override for a CVE within the given scope
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub scope: String,
    pub cve_id: String,
    pub package_name: String,
    pub status: String,
    pub justification: Option<String>,
    pub justification_detail: Option<String>,
    pub package_version: Option<String>,
    pub manifest_tokens: Option<Vec<String>>,
    pub group_tokens: Option<Vec<String>>,
}

/// Set the vulnerability status of a CVE for a package
///
/// When the scope is "group" and no explicit group tokens are given, the
/// transport's configured default group token (if any) is used as a
/// single-element list.
pub async fn set_status(api: &dyn Transport, update: StatusUpdate) -> Result<Value> {
    if update.cve_id.is_empty() {
        return Err(Error::required("cve_id"));
    }
    if update.package_name.is_empty() {
        return Err(Error::required("package_name"));
    }
    if update.status.is_empty() {
        return Err(Error::required("status"));
    }

    let mut group_tokens = update.group_tokens.filter(|t| !t.is_empty());
    if update.scope == "group" && group_tokens.is_none() {
        if let Some(default_token) = api.group_token() {
            group_tokens = Some(vec![default_token.to_string()]);
        }
    }

    let resource = format!("/api/v1/vigiles/cves/{}/vuln-status", update.cve_id);
    let mut params = Params::new();
    params.insert("scope".into(), json!(update.scope));
    params.insert("package".into(), json!(update.package_name));
    params.insert("status".into(), json!(update.status));

    if let Some(justification) = update.justification {
        params.insert("justification".into(), json!(justification));
    }
    if let Some(package_version) = update.package_version {
        params.insert("package_version".into(), json!(package_version));
    }
    if let Some(detail) = update.justification_detail {
        params.insert("justification_detail".into(), json!(detail));
    }
    if let Some(manifest_tokens) = update.manifest_tokens.filter(|t| !t.is_empty()) {
        params.insert("manifest_tokens".into(), json!(manifest_tokens));
    }
    if let Some(group_tokens) = group_tokens {
        params.insert("group_tokens".into(), json!(group_tokens));
    }

    api.post(&resource, params).await
}
