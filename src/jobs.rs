//! Background `.SRCINFO` derivation.
//!
//! One worker per package directory runs the manifest compiler and captures
//! its output. Workers are launched while manifests are still being written
//! and only joined once every manifest is on disk; a worker never reads a
//! directory the main thread might still write to.
//!
//! Jobs are joined in submission order. The first failure aborts the join;
//! workers still running are left to finish on their own.
//
// TODO: per-job timeout, and kill the remaining children on first failure.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use crate::error::Error;
use crate::process::{Cmd, CommandResult};
use crate::writer::write_srcinfo;

struct PendingJob {
    package: String,
    dir: PathBuf,
    command: String,
    handle: JoinHandle<Result<CommandResult>>,
}

/// Fixed group of compiler jobs with first-failure propagation.
pub struct JobSet {
    program: String,
    args: Vec<String>,
    pending: Vec<PendingJob>,
}

impl JobSet {
    /// `command` is the compiler argv, e.g. `["makepkg", "--printsrcinfo"]`.
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("manifest compiler command is empty"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            pending: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Start the compiler for `package` in `dir` without waiting for it.
    pub fn launch(&mut self, package: &str, dir: &Path) -> Result<()> {
        let cmd = Cmd::new(&self.program).args(&self.args).current_dir(dir);
        let command = cmd.display();
        debug!(package, command = %command, "launching manifest compiler");

        let handle = thread::Builder::new()
            .name(format!("srcinfo-{package}"))
            .spawn(move || cmd.run())
            .with_context(|| format!("spawning manifest compiler worker for '{package}'"))?;

        self.pending.push(PendingJob {
            package: package.to_string(),
            dir: dir.to_path_buf(),
            command,
            handle,
        });
        Ok(())
    }

    /// Wait for every job in submission order and write each `.SRCINFO`.
    ///
    /// Returns the written paths. Stops at the first failing job with
    /// [`Error::CompilerFailure`].
    pub fn join_all(self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.pending.len());
        for job in self.pending {
            let result = job
                .handle
                .join()
                .map_err(|_| anyhow!("manifest compiler worker for '{}' panicked", job.package))?
                .with_context(|| format!("running manifest compiler for '{}'", job.package))?;

            if !result.success() {
                return Err(Error::CompilerFailure {
                    package: job.package,
                    command: job.command,
                    status: result.status_label(),
                    stderr: result.stderr.trim().to_string(),
                }
                .into());
            }

            written.push(write_srcinfo(&job.dir, &result.stdout)?);
            info!(package = %job.package, "wrote .SRCINFO");
        }
        Ok(written)
    }
}
