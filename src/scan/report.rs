//! Vulnerability report rendering
//!
//! Turns the upload/scan response into the plain-text summary shown on
//! the console and written to the local report file.

use chrono::Utc;
use serde_json::Value;

pub const NVD_BASE_URL: &str = "https://nvd.nist.gov/vuln/detail/";
const INFO_PAGE: &str = "https://www.timesys.com/security/vulnerability-patch-notification/";

/// CVE totals split into kernel and userspace shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CveCounts {
    pub total: i64,
    pub userspace: i64,
    pub kernel: i64,
}

fn count_at(counts: &Value, path: &[&str]) -> i64 {
    let mut current = counts;
    for key in path {
        match current.get(key) {
            Some(value) => current = value,
            None => return 0,
        }
    }
    current.as_i64().unwrap_or(0)
}

/// Unfixed CVEs: unfixed + unapplied + upgradable
pub fn parse_unfixed_cve_counts(counts: &Value) -> CveCounts {
    let total = count_at(counts, &["unfixed"])
        + count_at(counts, &["unapplied"])
        + count_at(counts, &["upgradable"]);
    let kernel = count_at(counts, &["kernel", "unfixed"])
        + count_at(counts, &["kernel", "unapplied"])
        + count_at(counts, &["kernel", "upgradable"]);
    CveCounts {
        total,
        userspace: total - kernel,
        kernel,
    }
}

/// Fixed CVEs
pub fn parse_fixed_cve_counts(counts: &Value) -> CveCounts {
    let total = count_at(counts, &["fixed"]);
    let kernel = count_at(counts, &["kernel", "fixed"]);
    CveCounts {
        total,
        userspace: total - kernel,
        kernel,
    }
}

/// Unfixed CVEs in the high and critical CVSS tiers
pub fn parse_cvss_counts(counts: &Value) -> CveCounts {
    let total =
        count_at(counts, &["high", "unfixed"]) + count_at(counts, &["critical", "unfixed"]);
    let kernel = count_at(counts, &["kernel", "high", "unfixed"])
        + count_at(counts, &["kernel", "critical", "unfixed"]);
    CveCounts {
        total,
        userspace: total - kernel,
        kernel,
    }
}

/// Banner and generation timestamp
pub fn render_header(result: &Value) -> String {
    let report_time = result
        .get("date")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string());

    format!(
        "-- Vigiles Vulnerability Scanner --\n\n\t{INFO_PAGE}\n\n\n\
         -- Date Generated (UTC) --\n\n\t{report_time}\n"
    )
}

/// Where the results can be viewed online
///
/// A report path links straight to the new report; without one, a
/// product path links to the dashboard workspace the SBOM landed in.
pub fn render_overview(result: &Value, base_url: &str) -> String {
    let report_path = result.get("report_path").and_then(Value::as_str).unwrap_or("");
    let product_path = result.get("product_path").and_then(Value::as_str).unwrap_or("");

    if !report_path.is_empty() {
        let report_url = join_url(base_url, report_path);
        format!(
            "\n-- Vigiles Vulnerability Report --\n\n\
             \tView detailed online report at:\n\t  {report_url}\n"
        )
    } else if !product_path.is_empty() {
        let product_url = join_url(base_url, product_path);
        let product_name = result
            .get("product_name")
            .and_then(Value::as_str)
            .unwrap_or("Default");
        format!(
            "\n-- Vigiles Dashboard --\n\n\
             \tThe SBOM has been uploaded to the '{product_name}' Product Workspace:\n\n\
             \t  {product_url}\n"
        )
    } else {
        String::new()
    }
}

/// Resolve a server-relative path against the configured base URL
fn join_url(base_url: &str, path: &str) -> String {
    match reqwest::Url::parse(base_url).and_then(|base| base.join(path)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/')),
    }
}

/// CVE count summary; empty when the response carries no count data
pub fn render_summary(result: &Value) -> String {
    let Some(counts) = result.get("counts") else {
        return String::new();
    };

    let unfixed = parse_unfixed_cve_counts(counts);
    let fixed = parse_fixed_cve_counts(counts);
    let cvss = parse_cvss_counts(counts.get("cvss_counts").unwrap_or(&Value::Null));

    format!(
        "\n\tUnfixed: {} ({} User space, {} Kernel)\n\
         \tFixed: {} ({} User space, {} Kernel)\n\
         \tHigh/Critical CVSS (Unfixed): {} ({} User space, {} Kernel)\n",
        unfixed.total,
        unfixed.userspace,
        unfixed.kernel,
        fixed.total,
        fixed.userspace,
        fixed.kernel,
        cvss.total,
        cvss.userspace,
        cvss.kernel,
    )
}

/// Per-component CVE listing
pub fn render_cves(result: &Value) -> String {
    let Some(cves) = result.get("cves").and_then(Value::as_object) else {
        return String::new();
    };
    if cves.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n\n-- Component CVEs --\n");
    for (pkg, entries) in cves {
        let Some(entries) = entries.as_array() else {
            continue;
        };
        for cve in entries {
            let field = |key: &str| cve.get(key).and_then(Value::as_str).unwrap_or("");
            let cve_id = field("cve_id");

            out.push_str(&format!("\n\tComponent:  {pkg}\n"));
            out.push_str(&format!("\tVersion: {}\n", field("version")));
            out.push_str(&format!("\tCVE ID:  {cve_id}\n"));
            out.push_str(&format!("\tURL:     {NVD_BASE_URL}{cve_id}\n"));
            out.push_str(&format!("\tCVSSv3:  {}\n", stringify(cve.get("cvss"))));
            out.push_str(&format!("\tVector:  {}\n", field("vector")));
            out.push_str(&format!("\tStatus:  {}\n", field("status")));

            if let Some(patches) = cve.get("fixedby").and_then(Value::as_array) {
                if !patches.is_empty() {
                    out.push_str("\tPatched by:\n");
                    for patch in patches {
                        out.push_str(&format!("\t* {}\n", stringify(Some(patch))));
                    }
                }
            }
        }
    }
    out
}

fn stringify(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unfixed_counts_sum_unapplied_and_upgradable() {
        let counts = json!({
            "unfixed": 3,
            "unapplied": 2,
            "upgradable": 1,
            "kernel": {"unfixed": 1, "unapplied": 1},
        });
        let parsed = parse_unfixed_cve_counts(&counts);
        assert_eq!(
            parsed,
            CveCounts {
                total: 6,
                userspace: 4,
                kernel: 2
            }
        );
    }

    #[test]
    fn test_fixed_counts_missing_kernel_map() {
        let counts = json!({"fixed": 4});
        let parsed = parse_fixed_cve_counts(&counts);
        assert_eq!(
            parsed,
            CveCounts {
                total: 4,
                userspace: 4,
                kernel: 0
            }
        );
    }

    #[test]
    fn test_cvss_counts_combine_high_and_critical() {
        let cvss = json!({
            "high": {"unfixed": 2},
            "critical": {"unfixed": 3},
            "kernel": {"high": {"unfixed": 1}, "critical": {"unfixed": 1}},
        });
        let parsed = parse_cvss_counts(&cvss);
        assert_eq!(
            parsed,
            CveCounts {
                total: 5,
                userspace: 3,
                kernel: 2
            }
        );
    }

    #[test]
    fn test_summary_matches_expected_lines() {
        let result = json!({
            "counts": {"unfixed": 3, "fixed": 1, "kernel": {"unfixed": 1}},
        });
        let summary = render_summary(&result);
        assert!(summary.contains("Unfixed: 3 (2 User space, 1 Kernel)"));
        assert!(summary.contains("Fixed: 1 (1 User space, 0 Kernel)"));
        assert!(summary.contains("High/Critical CVSS (Unfixed): 0 (0 User space, 0 Kernel)"));
    }

    #[test]
    fn test_summary_empty_without_counts() {
        assert_eq!(render_summary(&json!({"manifest_token": "m1"})), "");
    }

    #[test]
    fn test_overview_joins_report_url_onto_base() {
        let result = json!({"report_path": "/reports/r1"});
        let overview = render_overview(&result, "https://vigiles.example.com");
        assert!(overview.contains("https://vigiles.example.com/reports/r1"));
        assert!(overview.contains("-- Vigiles Vulnerability Report --"));
    }

    #[test]
    fn test_overview_falls_back_to_dashboard() {
        let result = json!({"product_path": "/dashboard/p1", "product_name": "Demo"});
        let overview = render_overview(&result, "https://vigiles.example.com");
        assert!(overview.contains("-- Vigiles Dashboard --"));
        assert!(overview.contains("'Demo' Product Workspace"));
        assert!(overview.contains("https://vigiles.example.com/dashboard/p1"));
    }

    #[test]
    fn test_overview_empty_without_paths() {
        assert_eq!(render_overview(&json!({}), "https://vigiles.example.com"), "");
    }

    #[test]
    fn test_header_uses_response_date() {
        let header = render_header(&json!({"date": "2024-05-01T12:00:00"}));
        assert!(header.contains("-- Vigiles Vulnerability Scanner --"));
        assert!(header.contains("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_cve_listing_includes_patches() {
        let result = json!({
            "cves": {
                "openssl": [{
                    "version": "1.1.1",
                    "cve_id": "CVE-2024-1234",
                    "cvss": 9.8,
                    "vector": "CVSS:3.1/AV:N",
                    "status": "Unfixed",
                    "fixedby": ["openssl-1.1.1w.patch"],
                }],
            },
        });
        let listing = render_cves(&result);
        assert!(listing.contains("-- Component CVEs --"));
        assert!(listing.contains("Component:  openssl"));
        assert!(listing.contains("URL:     https://nvd.nist.gov/vuln/detail/CVE-2024-1234"));
        assert!(listing.contains("CVSSv3:  9.8"));
        assert!(listing.contains("* openssl-1.1.1w.patch"));
    }

    #[test]
    fn test_cve_listing_empty_without_cves() {
        assert_eq!(render_cves(&json!({"cves": {}})), "");
        assert_eq!(render_cves(&json!({})), "");
    }
}
