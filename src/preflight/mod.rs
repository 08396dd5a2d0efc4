//! Preflight checks for manifest generation.
//!
//! Validates that the orchestrator and the manifest compiler are installed
//! before anything runs, so a missing tool is reported up front instead of
//! halfway through a run.
//!
//! # Example
//!
//! ```rust
//! use pkgbuild_gen::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("makepkg") {
//!     println!("pacman not installed");
//! }
//!
//! let tools = &[("kde-builder", "kde-builder"), ("makepkg", "pacman")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Result};

use crate::config::Config;
use crate::process;

/// Check if a command exists on the host system.
pub fn command_exists(cmd: &str) -> bool {
    process::exists(cmd)
}

/// Check that specific tools are available.
///
/// Each tuple is (command_name, package_name). All missing tools are reported
/// in one error.
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let mut missing = Vec::new();

    for (tool, package) in tools {
        if !command_exists(tool) {
            missing.push((*tool, *package));
        }
    }

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Check the tools a `generate` run invokes.
pub fn check_host_tools(config: &Config) -> Result<()> {
    let mut tools = vec![(config.orchestrator.program.as_str(), "kde-builder")];
    if let Some(compiler) = config.packaging.srcinfo_command.first() {
        tools.push((compiler.as_str(), "pacman"));
    }
    check_required_tools(&tools)
}
