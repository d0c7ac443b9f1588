//! Scan orchestration
//!
//! Linear flow: resolve arguments, run the SBOM generator as a
//! subprocess, upload the generated SBOM, and render the returned
//! report. Environment failures print a console error and terminate the
//! process with a non-zero status; transport failures propagate.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::Utc;

use crate::cli::ScanArgs;
use crate::client::api::manifests::{self, UploadManifest};
use crate::client::{Transport, VigilesClient};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::Diag;
use crate::scan::report;
use crate::scan::tools::{self, SbomTool, ToolInfo};

/// Fully-resolved inputs for one scan invocation
struct ScanPlan {
    tool_path: PathBuf,
    adapter: &'static dyn SbomTool,
    tool_args: String,
    sbom: PathBuf,
    report: PathBuf,
    sbom_name: Option<String>,
    subfolder_name: Option<String>,
}

/// Entry point for the `scan` subcommand
pub async fn run(args: ScanArgs, config_path: Option<&str>, diag: Diag) -> Result<()> {
    let Some(plan) = resolve(&args, &diag)? else {
        // Informational invocation (tool listing or version print)
        return Ok(());
    };

    let config = match config_path {
        Some(path) => Config::load_from(PathBuf::from(path))?,
        None => Config::load()?,
    };
    config.validate_auth()?;
    let client = VigilesClient::new(&config)?;

    run_tool(&plan, &diag)?;
    upload_and_report(&client, &plan, &diag).await
}

/// Step 1: validate the requested tool and derive the remaining inputs.
///
/// Returns `None` when the invocation only printed information.
fn resolve(args: &ScanArgs, diag: &Diag) -> Result<Option<ScanPlan>> {
    diag.dbg("Running Vigiles scan with arguments - ");
    diag.dbg(&format!("\t {args:?}"));

    if args.list_tools || args.ecosystem.is_some() {
        print_sbom_tools(args.ecosystem.as_deref(), diag);
        return Ok(None);
    }

    let Some(tool_name) = args.tool.as_deref() else {
        diag.err("The following arguments are required: -t/--tool");
        std::process::exit(1);
    };
    let Some(info) = tools::tool_info(tool_name) else {
        diag.err(&format!(
            "The SBOM generator tool '{tool_name}' is currently not supported."
        ));
        std::process::exit(1);
    };
    if info.ref_only {
        diag.info(&format!(
            "Refer to the tool's URL '{}' for setup and usage.",
            info.url
        ));
        std::process::exit(1);
    }
    let Some(adapter) = tools::adapter(tool_name) else {
        diag.err(&format!(
            "The SBOM generator tool '{tool_name}' is currently not supported."
        ));
        std::process::exit(1);
    };

    let tool_args = match args.sbom_tool_args.clone() {
        Some(tool_args) => tool_args,
        None => {
            diag.dbg("No SBOM tool args provided. Finding tool args.");
            match adapter.run_args(&args.source, args.sbom_name.as_deref()) {
                Ok(tool_args) => {
                    diag.dbg(&format!("SBOM tool args - '{tool_args}' ."));
                    tool_args
                }
                Err(Error::NotFound(msg)) => {
                    diag.err(&msg);
                    std::process::exit(1);
                }
                Err(_) => {
                    diag.err("The following arguments are required: -a/--sbom-tool-args .");
                    std::process::exit(1);
                }
            }
        }
    };

    let tool_path = if cmd_exists(tool_name) {
        PathBuf::from(tool_name)
    } else {
        let Some(tool_dir) = &args.sbom_tool_dir else {
            diag.err(&format!(
                "The SBOM generator tool '{tool_name}' was not found in system binary paths. \n\
                 To specify a path use the -p argument."
            ));
            std::process::exit(1);
        };
        if !tool_dir.exists() {
            diag.err(&format!(
                "SBOM generator tool directory '{}' doesn't exist.",
                tool_dir.display()
            ));
            std::process::exit(1);
        }
        let candidate = tool_dir.join(tool_name);
        if !candidate.exists() {
            diag.err(&format!(
                "Missing tool '{tool_name}' in SBOM generator tool directory '{}'.",
                tool_dir.display()
            ));
            std::process::exit(1);
        }
        candidate
    };

    if args.tool_version {
        print_tool_version(&tool_path, adapter, diag);
        return Ok(None);
    }

    let sbom = match &args.sbom {
        Some(path) => path.clone(),
        None => match adapter.sbom_path(&tool_args) {
            Ok(path) => {
                diag.dbg(&format!("SBOM - '{}' .", path.display()));
                path
            }
            Err(_) => {
                diag.err(
                    "Could not find the path of the SBOM file to be generated by the SBOM tool. \
                     Provide it with -s argument.",
                );
                std::process::exit(1);
            }
        },
    };

    let report = args.outfile.clone().unwrap_or_else(|| {
        PathBuf::from(format!(
            "vulnerability-report-{}.txt",
            Utc::now().format("%Y-%m-%d-%H_%M_%S")
        ))
    });

    Ok(Some(ScanPlan {
        tool_path,
        adapter,
        tool_args,
        sbom,
        report,
        sbom_name: args.sbom_name.clone(),
        subfolder_name: args.subfolder_name.clone(),
    }))
}

/// Print the recommended-tool table, optionally narrowed to tools that
/// cover an ecosystem
fn print_sbom_tools(search: Option<&str>, diag: &Diag) {
    let search_lower = search.map(str::to_lowercase);
    let tools: Vec<&ToolInfo> = match &search_lower {
        Some(ecosystem) => tools::SUPPORTED_TOOLS
            .iter()
            .filter(|t| t.ecosystems.contains(&ecosystem.as_str()))
            .collect(),
        None => tools::SUPPORTED_TOOLS.iter().collect(),
    };

    if tools.is_empty() {
        diag.err(&format!(
            "No recommendations were found for ecosystem '{}'. \
             Contact the Vigiles team to request support.",
            search.unwrap_or_default()
        ));
        std::process::exit(1);
    }

    println!("{}", "*".repeat(80));
    println!("\n\tList of Timesys recommended SBOM generator tools \n");
    println!("{}", "*".repeat(80));
    if let Some(ecosystem) = search {
        println!("{:<18} {:<12} {}", "Name", "Ecosystem", "URL");
        println!("{}", "-".repeat(80));
        for tool in &tools {
            println!("{:<18} {:<12} {}", tool.name, ecosystem, tool.url);
        }
    } else {
        println!("{:<25} {}", "Name", "Ecosystems");
        println!("{}", "-".repeat(80));
        for tool in &tools {
            println!("{:<25} {}", tool.name, tool.ecosystems.join(","));
        }
    }
    println!("{}", "-".repeat(80));
    if search.is_some() {
        println!("NOTE: Refer to tool URLs to get more details about their capabilities and setup");
        println!("      procedures.\n");
    }
}

/// Test whether `cmd` resolves to an executable on the default search
/// path
fn cmd_exists(cmd: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|prefix| is_executable(&prefix.join(cmd)))
}

fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Ask the tool for its own version and echo it
fn print_tool_version(tool_path: &Path, adapter: &dyn SbomTool, diag: &Diag) {
    match Command::new(tool_path).args(adapter.version_args()).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).replace('\n', "");
            diag.tool(tool_path, &version);
        }
        _ => {
            let name = tool_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            diag.warn(&format!("{name}: could not find tool version."));
        }
    }
}

/// Step 2: run the generator and verify the SBOM file was produced
fn run_tool(plan: &ScanPlan, diag: &Diag) -> Result<()> {
    // A stale SBOM at the target path would mask a failed run
    if plan.sbom.exists() {
        std::fs::remove_file(&plan.sbom)?;
    }

    print_tool_version(&plan.tool_path, plan.adapter, diag);
    diag.tool(
        &plan.tool_path,
        &format!("Running with arguments '{}'", plan.tool_args),
    );

    let argv: Vec<&str> = plan.tool_args.split_whitespace().collect();
    let mut child = Command::new(&plan.tool_path)
        .args(&argv)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::NotFound(format!(
                "Could not run tool '{}': {e}",
                plan.tool_path.display()
            ))
        })?;

    // Stream tool output a byte at a time as it is produced; blocks
    // until the tool closes its stdout
    if let Some(mut stdout) = child.stdout.take() {
        let mut byte = [0u8; 1];
        let mut console = std::io::stdout();
        while stdout.read(&mut byte)? == 1 {
            console.write_all(&byte)?;
            console.flush()?;
        }
    }
    child.wait()?;

    if !plan.sbom.exists() {
        diag.err(&format!(
            "Could not generate SBOM file: '{}' .",
            plan.sbom.display()
        ));
        std::process::exit(1);
    }

    diag.tool(
        &plan.tool_path,
        &format!("Generated SBOM '{}' .", plan.sbom.display()),
    );
    Ok(())
}

/// Read the SBOM as UTF-8 text, stripping trailing whitespace per line
fn read_sbom(path: &Path, diag: &Diag) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.lines().map(str::trim_end).collect(),
        Err(e) => {
            diag.err(&format!("Error: Could not open SBOM: '{e}' ."));
            std::process::exit(1);
        }
    }
}

/// Steps 3 and 4: upload the SBOM and render the scan result
async fn upload_and_report(api: &dyn Transport, plan: &ScanPlan, diag: &Diag) -> Result<()> {
    let sbom_data = read_sbom(&plan.sbom, diag);

    let mut upload = UploadManifest::new(sbom_data);
    upload.manifest_name = plan.sbom_name.clone();
    upload.subfolder_name = plan.subfolder_name.clone();

    if !api.dry_run() {
        eprintln!("Vigiles: Requesting SBOM analysis from Vigiles ...\n");
    }

    let result = manifests::upload_manifest(api, upload).await?;

    let empty = result.is_null() || result.as_object().is_some_and(|m| m.is_empty());
    if empty || api.dry_run() {
        if api.dry_run() {
            println!("{result}");
        }
        std::process::exit(1);
    }

    let header = report::render_header(&result);
    let overview = report::render_overview(&result, api.base_url());
    let summary = report::render_summary(&result);
    let cves = report::render_cves(&result);

    std::fs::write(&plan.report, format!("{header}{overview}{summary}{cves}"))?;

    print!("{overview}");
    print!("{summary}");
    println!(
        "\n\tLocal summary written to:\n\t  {}",
        plan.report.display()
    );
    Ok(())
}
