//! Report downloads and comparisons

use serde_json::{Value, json};

use crate::client::{Params, Transport};
use crate::error::{Error, Result};

/// File formats a report can be downloaded in
pub const VALID_FORMATS: &[&str] = &[
    "csv",
    "pdf",
    "pdfsummary",
    "xlsx",
    "cyclonedx-vex",
    "cyclonedx-sbom-vex",
];

/// Download a CVE report as a file
///
/// `format` must be one of [`VALID_FORMATS`]. CycloneDX formats carry the
/// requested file format and spec version along. The response is raw
/// file bytes and is returned unparsed.
pub async fn download_report(
    api: &dyn Transport,
    report_token: &str,
    format: &str,
    filter_results: bool,
    cyclonedx_format: &str,
    cyclonedx_version: &str,
) -> Result<Vec<u8>> {
    if report_token.is_empty() {
        return Err(Error::required("report_token"));
    }

    if !VALID_FORMATS.contains(&format) {
        return Err(Error::Unsupported(format!(
            "Invalid or missing 'format' arg. Acceptable values: {}",
            VALID_FORMATS.join(", ")
        )));
    }

    let resource = format!("/api/v1/vigiles/reports/{report_token}");
    let mut params = Params::new();
    params.insert("filtered".into(), json!(filter_results));
    params.insert("format".into(), json!(format));

    if format.starts_with("cyclonedx") {
        params.insert("sbom_format".into(), json!(cyclonedx_format));
        params.insert("sbom_version".into(), json!(cyclonedx_version));
    }

    api.get_raw(&resource, params).await
}

/// Get a comparison between two CVE reports
///
/// `remove_whitelist` is deprecated in favor of `remove_not_affected`;
/// both are forwarded for backward compatibility regardless of which one
/// the caller set.
pub async fn compare_reports(
    api: &dyn Transport,
    token_one: &str,
    token_two: &str,
    remove_whitelist: bool,
    remove_not_affected: bool,
    filter_results: bool,
) -> Result<Value> {
    if token_one.is_empty() || token_two.is_empty() {
        return Err(Error::InvalidArgument(
            "Two CVE report token arguments are required for comparison".to_string(),
        ));
    }

    let mut params = Params::new();
    params.insert("token_one".into(), json!(token_one));
    params.insert("token_two".into(), json!(token_two));
    params.insert("remove_whitelist".into(), json!(remove_whitelist));
    params.insert("remove_not_affected".into(), json!(remove_not_affected));
    params.insert("filtered".into(), json!(filter_results));

    api.get("/api/v1/vigiles/reports/compare", params).await
}
