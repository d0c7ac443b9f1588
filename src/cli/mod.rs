//! CLI command definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Vigiles CLI - companion for the Vigiles vulnerability monitoring platform
#[derive(Parser, Debug)]
#[command(name = "vigiles")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Override config file location
    #[arg(long, global = true, env = "VIGILES_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug output
    #[arg(long, global = true, env = "VIGILES_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an SBOM with an external tool and upload it for a
    /// vulnerability scan
    Scan(ScanArgs),

    /// Display version information
    Version,
}

/// Arguments for the scan subcommand
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// SBOM generator tool to run
    #[arg(long, short = 't')]
    pub tool: Option<String>,

    /// Arguments passed to the SBOM generator; derived from the source
    /// path when omitted
    #[arg(long = "sbom-tool-args", short = 'a')]
    pub sbom_tool_args: Option<String>,

    /// Path of the SBOM file the tool will generate; parsed from the
    /// tool arguments when omitted
    #[arg(long, short = 's')]
    pub sbom: Option<PathBuf>,

    /// Name for the uploaded manifest (also the SBOM output base name)
    #[arg(long = "sbom-name", short = 'n')]
    pub sbom_name: Option<String>,

    /// Directory to search for the tool when it is not on PATH
    #[arg(long = "sbom-tool-dir", short = 'p')]
    pub sbom_tool_dir: Option<PathBuf>,

    /// Write the vulnerability summary to this file
    #[arg(long, short = 'o')]
    pub outfile: Option<PathBuf>,

    /// Upload into this subfolder of the configured group/folder
    #[arg(long = "subfolder-name", short = 'F')]
    pub subfolder_name: Option<String>,

    /// List recommended SBOM generator tools and exit
    #[arg(long = "list-tools", short = 'l')]
    pub list_tools: bool,

    /// List tools recommended for this ecosystem and exit
    #[arg(long, short = 'e')]
    pub ecosystem: Option<String>,

    /// Print the selected tool's version and exit
    #[arg(long = "tool-version")]
    pub tool_version: bool,

    /// Source file or directory to generate the SBOM from
    #[arg(default_value = ".")]
    pub source: PathBuf,
}
