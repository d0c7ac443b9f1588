//! SBOM generator tool adapters
//!
//! Each supported tool is described by a [`ToolInfo`] registry entry;
//! tools that can be driven directly also provide a [`SbomTool`]
//! implementation for deriving run arguments and locating the generated
//! SBOM. Reference-only entries point at external build-system
//! integrations that cannot be wrapped as a subprocess.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Error, Result};

/// Registry entry for a recommended SBOM generator
#[derive(Debug, Clone, Copy)]
pub struct ToolInfo {
    pub name: &'static str,
    pub ecosystems: &'static [&'static str],
    pub url: &'static str,
    /// Documentation link only; not runnable through the scan command
    pub ref_only: bool,
}

/// Recommended SBOM generator tools
pub const SUPPORTED_TOOLS: &[ToolInfo] = &[
    ToolInfo {
        name: "syft",
        ecosystems: &["angular", "c", "maven", "npm", "nuget", "python"],
        url: "https://github.com/anchore/syft",
        ref_only: false,
    },
    ToolInfo {
        name: "meta-timesys",
        ecosystems: &["yocto"],
        url: "https://github.com/TimesysGit/meta-timesys",
        ref_only: true,
    },
    ToolInfo {
        name: "vigiles-buildroot",
        ecosystems: &["buildroot"],
        url: "https://github.com/TimesysGit/vigiles-buildroot",
        ref_only: true,
    },
    ToolInfo {
        name: "vigiles-openwrt",
        ecosystems: &["openwrt"],
        url: "https://github.com/TimesysGit/vigiles-openwrt",
        ref_only: true,
    },
];

/// Look up a registry entry by tool name
pub fn tool_info(name: &str) -> Option<&'static ToolInfo> {
    SUPPORTED_TOOLS.iter().find(|t| t.name == name)
}

/// Capability set a runnable SBOM generator must provide
pub trait SbomTool: Sync {
    /// Derive default run arguments for a source file or directory,
    /// naming the output after `sbom_name` when given
    fn run_args(&self, source: &Path, sbom_name: Option<&str>) -> Result<String>;

    /// Parse the configured output path out of the tool's argument
    /// string
    fn sbom_path(&self, tool_args: &str) -> Result<PathBuf>;

    /// Arguments that make the tool print its own version
    fn version_args(&self) -> &'static [&'static str] {
        &["--version"]
    }
}

/// Get the adapter for a runnable tool, if one exists
pub fn adapter(name: &str) -> Option<&'static dyn SbomTool> {
    match name {
        "syft" => Some(&Syft),
        _ => None,
    }
}

/// Adapter for the Anchore syft generator
pub struct Syft;

impl SbomTool for Syft {
    fn run_args(&self, source: &Path, sbom_name: Option<&str>) -> Result<String> {
        let sbom_file = match sbom_name {
            Some(name) => format!("{name}.json"),
            None => format!(
                "cyclonedx-{}.json",
                Utc::now().format("%Y-%m-%d-%H_%M_%S")
            ),
        };

        let scheme = if source.is_dir() {
            "dir:"
        } else if source.is_file() {
            "file:"
        } else {
            return Err(Error::NotFound(
                "Invalid source: no such file or directory exists.".to_string(),
            ));
        };

        Ok(format!(
            "packages {scheme}{} -o cyclonedx-json={sbom_file}",
            source.display()
        ))
    }

    fn sbom_path(&self, tool_args: &str) -> Result<PathBuf> {
        if !tool_args.contains("--output") && !tool_args.contains("-o") {
            return Err(Error::InvalidArgument(
                "Could not identify sbom marker in the argument.".to_string(),
            ));
        }

        // Value of the last -o flag, in either `-o fmt=path` or
        // `-o path` form
        let tail = tool_args.rsplit("-o").next().unwrap_or_default();
        let tail = tail.rsplit('=').next().unwrap_or_default();
        let path = tail.split_whitespace().next().ok_or_else(|| {
            Error::InvalidArgument("Could not identify sbom marker in the argument.".to_string())
        })?;

        Ok(PathBuf::from(path))
    }
}
