//! Manifest upload, scanning, and lifecycle operations

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::client::{Params, Transport, export};
use crate::error::{Error, Result};

const ALMALINUX: &[&str] = &["AlmaLinux", "AlmaLinux:8", "AlmaLinux:9"];
const ALPINE: &[&str] = &[
    "Alpine",
    "Alpine:v3.10",
    "Alpine:v3.11",
    "Alpine:v3.12",
    "Alpine:v3.13",
    "Alpine:v3.14",
    "Alpine:v3.15",
    "Alpine:v3.16",
    "Alpine:v3.17",
    "Alpine:v3.18",
    "Alpine:v3.19",
    "Alpine:v3.2",
    "Alpine:v3.20",
    "Alpine:v3.3",
    "Alpine:v3.4",
    "Alpine:v3.5",
    "Alpine:v3.6",
    "Alpine:v3.7",
    "Alpine:v3.8",
    "Alpine:v3.9",
];
const DEBIAN: &[&str] = &[
    "Debian",
    "Debian:10",
    "Debian:11",
    "Debian:12",
    "Debian:13",
    "Debian:3.0",
    "Debian:3.1",
    "Debian:4.0",
    "Debian:5.0",
    "Debian:6.0",
    "Debian:7",
    "Debian:8",
    "Debian:9",
];
const ROCKY: &[&str] = &["Rocky Linux", "Rocky Linux:8", "Rocky Linux:9"];
const UBUNTU: &[&str] = &[
    "Ubuntu",
    "Ubuntu:14.04:LTS",
    "Ubuntu:16.04:LTS",
    "Ubuntu:18.04:LTS",
    "Ubuntu:20.04:LTS",
    "Ubuntu:22.04:LTS",
    "Ubuntu:23.10",
    "Ubuntu:24.04:LTS",
    "Ubuntu:Pro:14.04:LTS",
    "Ubuntu:Pro:16.04:LTS",
    "Ubuntu:Pro:18.04:LTS",
    "Ubuntu:Pro:20.04:LTS",
    "Ubuntu:Pro:22.04:LTS",
    "Ubuntu:Pro:24.04:LTS",
];
const OTHERS: &[&str] = &[
    "Android",
    "Bitnami",
    "CRAN",
    "GIT",
    "GSD",
    "GitHub Actions",
    "Go",
    "Hackage",
    "Hex",
    "Linux",
    "Maven",
    "NuGet",
    "OSS-Fuzz",
    "Packagist",
    "Pub",
    "PyPI",
    "RubyGems",
    "SwiftURL",
    "UVI",
    "crates.io",
    "npm",
];

/// Every ecosystem tag the service accepts, in declared order
pub fn all_ecosystems() -> Vec<&'static str> {
    [OTHERS, ALMALINUX, ALPINE, DEBIAN, ROCKY, UBUNTU].concat()
}

/// Resolve a caller-supplied ecosystems string into the comma-joined
/// form the service expects.
///
/// The literal `"all"` (case-insensitive) expands to the full allow-list
/// in declared order. Otherwise entries are comma-split, trimmed, and
/// checked against the allow-list; unknown entries are dropped with a
/// single warning rather than failing the upload.
fn resolve_ecosystems(input: &str) -> String {
    if input.eq_ignore_ascii_case("all") {
        return all_ecosystems().join(",");
    }

    let allowed = all_ecosystems();
    let entries: Vec<&str> = input.split(',').map(str::trim).collect();
    let invalid: Vec<&str> = entries
        .iter()
        .copied()
        .filter(|e| !allowed.contains(e))
        .collect();
    if !invalid.is_empty() {
        log::warn!("Skipping invalid ecosystems: {}", invalid.join(","));
    }

    entries
        .into_iter()
        .filter(|e| allowed.contains(e))
        .collect::<Vec<_>>()
        .join(",")
}

/// Get all manifests accessible by the current user
///
/// A configured folder token limits results to that folder; otherwise a
/// configured group token limits results to that group.
pub async fn get_manifests(api: &dyn Transport) -> Result<Value> {
    let mut params = Params::new();

    if let Some(folder) = api.folder_token() {
        params.insert("folder_token".into(), json!(folder));
    } else if let Some(group) = api.group_token() {
        params.insert("group_token".into(), json!(group));
    }

    api.get("/api/v1/vigiles/manifests", params).await
}

/// Get manifest data along with metadata
///
/// `sbom_format` asks the server to convert the manifest data to "spdx",
/// "spdx-lite", or "cyclonedx"; `file_format` and `sbom_version` refine
/// the conversion.
pub async fn get_manifest_info(
    api: &dyn Transport,
    manifest_token: &str,
    sbom_format: Option<&str>,
    file_format: Option<&str>,
    sbom_version: Option<&str>,
) -> Result<Value> {
    if manifest_token.is_empty() {
        return Err(Error::required("manifest_token"));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}");
    let params = conversion_params(sbom_format, file_format, sbom_version);
    api.get(&resource, params).await
}

/// Get manifest data as a file
///
/// Unlike [`get_manifest_info`] the response is the raw manifest bytes
/// with no surrounding metadata.
pub async fn get_manifest_file(
    api: &dyn Transport,
    manifest_token: &str,
    sbom_format: Option<&str>,
    file_format: Option<&str>,
    sbom_version: Option<&str>,
) -> Result<Vec<u8>> {
    if manifest_token.is_empty() {
        return Err(Error::required("manifest_token"));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}");
    let mut params = conversion_params(sbom_format, file_format, sbom_version);
    params.insert("send_file".into(), json!(true));
    api.get_raw(&resource, params).await
}

fn conversion_params(
    sbom_format: Option<&str>,
    file_format: Option<&str>,
    sbom_version: Option<&str>,
) -> Params {
    let mut params = Params::new();
    if let Some(format) = sbom_format.filter(|f| !f.is_empty()) {
        params.insert("sbom_format".into(), json!(format));
    }
    if let Some(format) = file_format.filter(|f| !f.is_empty()) {
        params.insert("file_format".into(), json!(format));
    }
    if let Some(version) = sbom_version.filter(|v| !v.is_empty()) {
        params.insert("sbom_version".into(), json!(version));
    }
    params
}

/// Parameters for [`upload_manifest`]
#[derive(Debug, Clone)]
pub struct UploadManifest {
    /// Manifest (SBOM) text to upload
    pub manifest: String,
    /// Name for the new manifest; generated by the server when absent
    pub manifest_name: Option<String>,
    /// Kernel config used to filter CVEs irrelevant to the built kernel
    pub kernel_config: Option<String>,
    /// U-Boot config used to filter CVEs irrelevant to the bootloader
    pub uboot_config: Option<String>,
    /// Upload into (or create) a folder with this name under the
    /// configured group/folder; unsupported for "Private Workspace"
    pub subfolder_name: Option<String>,
    /// Apply all configured filters to scan results, not only the
    /// kernel/uboot config filters
    pub filter_results: bool,
    /// Skip generating the initial CVE report
    pub upload_only: bool,
    /// Extra CVE fields to include in the report
    pub extra_fields: Option<Vec<String>>,
    /// Comma-separated ecosystems, or "all"
    pub ecosystems: Option<String>,
    /// Notification frequency: "none", "daily", "weekly", or "monthly"
    pub subscribe: Option<String>,
    /// Report export format requested from the server
    pub export_format: Option<String>,
    /// CycloneDX file format used when `export_format` is a CycloneDX
    /// variant
    pub cyclonedx_format: String,
    /// Where to save an exported report returned by the server; the
    /// extension is replaced to match `export_format`
    pub export_path: Option<PathBuf>,
}

impl UploadManifest {
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            manifest_name: None,
            kernel_config: None,
            uboot_config: None,
            subfolder_name: None,
            filter_results: false,
            upload_only: false,
            extra_fields: None,
            ecosystems: None,
            subscribe: None,
            export_format: None,
            cyclonedx_format: "json".to_string(),
            export_path: None,
        }
    }
}

/// Upload and (optionally) scan a manifest
///
/// The upload target follows the configured defaults: a folder token is
/// preferred when both a folder and group token are set; with no group
/// token the server-side "Private Workspace" is the target, which does
/// not support folders, so folder arguments are ignored with a warning.
///
/// When the response carries an exported report and an export format was
/// requested, the blob is decoded and saved next to the requested path;
/// save failures are logged and never fail the upload itself.
pub async fn upload_manifest(api: &dyn Transport, upload: UploadManifest) -> Result<Value> {
    if upload.manifest.is_empty() {
        return Err(Error::InvalidArgument("manifest data is required".to_string()));
    }

    let mut params = Params::new();
    params.insert("manifest".into(), json!(upload.manifest));
    params.insert("filter_results".into(), json!(upload.filter_results));
    params.insert("upload_only".into(), json!(upload.upload_only));

    if let Some(kernel_config) = upload.kernel_config {
        params.insert("kernel_config".into(), json!(kernel_config));
    }
    if let Some(name) = upload.manifest_name.as_deref() {
        params.insert("manifest_name".into(), json!(name));
    }
    if let Some(uboot_config) = upload.uboot_config {
        params.insert("uboot_config".into(), json!(uboot_config));
    }
    if let Some(subfolder) = upload.subfolder_name.as_deref() {
        params.insert("subfolder_name".into(), json!(subfolder));
    }
    if let Some(fields) = upload.extra_fields.as_deref() {
        // Split into repeated params by the transport
        params.insert("with_field".into(), json!(fields));
    }
    if let Some(ecosystems) = upload.ecosystems.as_deref() {
        params.insert("ecosystems".into(), json!(resolve_ecosystems(ecosystems)));
    }
    if let Some(subscribe) = upload.subscribe.as_deref() {
        params.insert("subscribe".into(), json!(subscribe));
    }
    if let Some(format) = upload.export_format.as_deref() {
        params.insert("export_format".into(), json!(format));
    }

    let group_token = api.group_token();
    let folder_token = api.folder_token();
    if let Some(folder) = folder_token {
        params.insert("folder_token".into(), json!(folder));
    }
    if let Some(group) = group_token {
        params.insert("group_token".into(), json!(group));
    } else {
        log::warn!("No group token is configured. Upload target will be \"Private Workspace\"");
    }

    if group_token.is_none() && (folder_token.is_some() || upload.subfolder_name.is_some()) {
        log::warn!(
            "\"Private Workspace\" does not support folders. Since a group token is not \
             configured, the folder_token and subfolder_name arguments will be ignored."
        );
    }

    let mut result = api.post("/api/v1/vigiles/manifests", params).await?;

    if let Some(exported) = result.as_object_mut().and_then(|m| m.remove("exported_report")) {
        save_exported_report(
            &exported,
            upload.export_format.as_deref(),
            &upload.cyclonedx_format,
            upload.export_path.as_deref(),
        );
    }

    Ok(result)
}

/// Save an exported report blob returned alongside an upload result.
///
/// Skipped when no export format was requested or no destination is
/// known; failures are logged, the upload already succeeded.
fn save_exported_report(
    exported: &Value,
    export_format: Option<&str>,
    cyclonedx_format: &str,
    export_path: Option<&Path>,
) {
    let (Some(format), Some(path)) = (export_format, export_path) else {
        return;
    };
    let Some(data) = exported.as_str() else {
        log::error!("Exported report is not a string; skipping save");
        return;
    };

    let path = path.with_extension(export_extension(format, cyclonedx_format));
    match export::save_file(data, &path) {
        Ok(()) => log::info!("Exported report saved to {}", path.display()),
        Err(e) => log::error!("Could not save exported report: {e}"),
    }
}

/// Derive the export file extension from the requested format
fn export_extension(format: &str, cyclonedx_format: &str) -> String {
    if format.starts_with("pdf") {
        "pdf".to_string()
    } else if format.starts_with("cyclonedx") {
        cyclonedx_format.to_string()
    } else {
        format.to_string()
    }
}

/// Generate a new report for a manifest
///
/// `rescan_only` rescans without returning the report data.
pub async fn rescan_manifest(
    api: &dyn Transport,
    manifest_token: &str,
    rescan_only: bool,
    filter_results: bool,
    extra_fields: Option<&[String]>,
) -> Result<Value> {
    if manifest_token.is_empty() {
        return Err(Error::required("manifest_token"));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}/reports");
    let mut params = Params::new();
    params.insert("manifest".into(), json!(manifest_token));
    params.insert("rescan_only".into(), json!(rescan_only));
    params.insert("filtered".into(), json!(filter_results));

    if let Some(fields) = extra_fields {
        params.insert("with_field".into(), json!(fields));
    }

    api.post(&resource, params).await
}

/// Delete a manifest
///
/// This cannot be undone; `confirmed` must be passed as true to prevent
/// accidental use.
pub async fn delete_manifest(
    api: &dyn Transport,
    manifest_token: &str,
    confirmed: bool,
) -> Result<Value> {
    if manifest_token.is_empty() {
        return Err(Error::required("manifest_token"));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}");
    let mut params = Params::new();
    params.insert("confirmed".into(), json!(confirmed));
    api.delete(&resource, params).await
}

/// Get the list of report tokens available for a manifest
pub async fn get_report_tokens(api: &dyn Transport, manifest_token: &str) -> Result<Value> {
    if manifest_token.is_empty() {
        return Err(Error::required("manifest_token"));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}/reports");
    api.get(&resource, Params::new()).await
}

/// Download the latest report for a manifest
pub async fn get_latest_report(
    api: &dyn Transport,
    manifest_token: &str,
    filter_results: bool,
    extra_fields: Option<&[String]>,
) -> Result<Value> {
    if manifest_token.is_empty() {
        return Err(Error::required("manifest_token"));
    }

    let mut params = Params::new();
    params.insert("filtered".into(), json!(filter_results));
    if let Some(fields) = extra_fields {
        params.insert("with_field".into(), json!(fields));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}/reports/latest");
    api.get(&resource, params).await
}

/// Set a custom CVE score on the manifest's chain
pub async fn set_custom_score(
    api: &dyn Transport,
    manifest_token: &str,
    product_name: &str,
    cve_id: &str,
    custom_score: &str,
    product_version: Option<&str>,
) -> Result<Value> {
    if manifest_token.is_empty() || product_name.is_empty() || cve_id.is_empty() || custom_score.is_empty() {
        return Err(Error::InvalidArgument(
            "Missing required data from: { product_name, cve_id, custom_score, manifest_token }"
                .to_string(),
        ));
    }

    let mut params = Params::new();
    params.insert("package_name".into(), json!(product_name));
    params.insert("cve_id".into(), json!(cve_id));
    params.insert("custom_score".into(), json!(custom_score));
    if let Some(version) = product_version {
        params.insert("package_version".into(), json!(version));
    }

    let resource = format!("/api/v1/vigiles/manifests/{manifest_token}/custom_scores");
    api.post(&resource, params).await
}

/// Move manifests into another group or folder
pub async fn bulk_move_manifests(
    api: &dyn Transport,
    manifest_tokens: &[String],
    group_token: Option<&str>,
    folder_token: Option<&str>,
) -> Result<Value> {
    bulk_relocate(api, manifest_tokens, group_token, folder_token, false).await
}

/// Copy manifests into another group or folder
pub async fn bulk_copy_manifests(
    api: &dyn Transport,
    manifest_tokens: &[String],
    group_token: Option<&str>,
    folder_token: Option<&str>,
) -> Result<Value> {
    bulk_relocate(api, manifest_tokens, group_token, folder_token, true).await
}

async fn bulk_relocate(
    api: &dyn Transport,
    manifest_tokens: &[String],
    group_token: Option<&str>,
    folder_token: Option<&str>,
    copy: bool,
) -> Result<Value> {
    if manifest_tokens.is_empty() {
        return Err(Error::required("manifest_tokens"));
    }
    if group_token.is_none() && folder_token.is_none() {
        return Err(Error::InvalidArgument(
            "a target group_token or folder_token is required".to_string(),
        ));
    }

    let mut params = Params::new();
    params.insert("manifest_tokens".into(), json!(manifest_tokens));
    if let Some(group) = group_token {
        params.insert("group_token".into(), json!(group));
    }
    if let Some(folder) = folder_token {
        params.insert("folder_token".into(), json!(folder));
    }
    params.insert("copy".into(), json!(copy));

    api.post("/api/v1/vigiles/manifests/bulk-options/move", params)
        .await
}
