//! Orchestrator adapter.
//!
//! The orchestrator (kde-builder) owns the project universe: it resolves the
//! transitive closure of the requested targets and reports repository,
//! dependency and option metadata for each. We only run it and parse what it
//! prints.

use anyhow::Result;
use std::ffi::OsString;
use tracing::info;

use super::project::{parse_project_info, ProjectInfos};
use crate::error::Error;
use crate::process::{Cmd, CommandResult};

/// Anything that can answer a `project-info` query.
pub trait ProjectSource {
    /// Records for `targets` and everything they transitively depend on.
    fn project_info(&self, targets: &[String]) -> Result<ProjectInfos>;
}

/// `kde-builder` invoked as an external command.
#[derive(Debug, Clone)]
pub struct KdeBuilder {
    program: String,
    leading_args: Vec<String>,
}

impl KdeBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before every query, e.g. a script path for an interpreter.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Generate the orchestrator config and fetch repo metadata.
    ///
    /// Must run once on a fresh host before [`ProjectSource::project_info`].
    pub fn prepare(&self) -> Result<()> {
        run(&self.command(["--generate-config"]))?;
        run(&self.command(["--metadata-only"]))?;
        Ok(())
    }

    fn command<I, S>(&self, args: I) -> Cmd
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Cmd::new(&self.program).args(&self.leading_args).args(args)
    }
}

impl ProjectSource for KdeBuilder {
    fn project_info(&self, targets: &[String]) -> Result<ProjectInfos> {
        let cmd = self.command(["--query", "project-info"]).args(targets);
        let stdout = run(&cmd)?;
        let infos = parse_project_info(&stdout, &cmd.display())?;
        info!(projects = infos.len(), "orchestrator reported projects");
        Ok(infos)
    }
}

/// Run `cmd`, treating non-zero exit or any stderr as fatal.
fn run(cmd: &Cmd) -> Result<String> {
    let command = cmd.display();
    info!(command = %command, "running orchestrator");
    let result = cmd.run()?;
    check_result(&command, &result)?;
    Ok(result.stdout)
}

fn check_result(command: &str, result: &CommandResult) -> Result<(), Error> {
    if result.success() && result.stderr.trim().is_empty() {
        return Ok(());
    }

    let reason = if result.success() {
        "unexpected output on stderr".to_string()
    } else {
        format!("exited with {}", result.status_label())
    };
    Err(Error::Configuration {
        command: command.to_string(),
        reason,
        diagnostics: format!(
            "stdout: {}\nstderr: {}",
            result.stdout.trim(),
            result.stderr.trim()
        ),
    })
}
