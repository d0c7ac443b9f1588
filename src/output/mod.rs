//! Leveled console output for the scan CLI
//!
//! Carried as an explicit value through the orchestrator rather than a
//! process-wide toggle; debug mode is decided once during argument
//! parsing.

use std::path::Path;

/// Console diagnostics with a debug/verbose level
#[derive(Debug, Clone, Copy)]
pub struct Diag {
    debug: bool,
    verbose: bool,
}

impl Diag {
    /// Debug mode implies verbose output
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            verbose: true,
        }
    }

    pub fn dbg(&self, msg: &str) {
        if self.debug {
            println!("Vigiles DEBUG: {msg}");
        }
    }

    pub fn info(&self, msg: &str) {
        if self.verbose {
            println!("Vigiles INFO: {msg}");
        }
    }

    pub fn warn(&self, msg: &str) {
        eprintln!("Vigiles WARNING: {msg}");
    }

    pub fn err(&self, msg: &str) {
        eprintln!("Vigiles ERROR: {msg}");
    }

    /// Message attributed to an external tool, named by its basename
    pub fn tool(&self, tool: &Path, msg: &str) {
        let name = tool
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| tool.display().to_string());
        println!("{name}: {msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_mode_is_verbose() {
        let diag = Diag::new(true);
        assert!(diag.debug);
        assert!(diag.verbose);
    }

    #[test]
    fn test_default_mode_is_verbose_without_debug() {
        let diag = Diag::new(false);
        assert!(!diag.debug);
        assert!(diag.verbose);
    }
}
