//! Error taxonomy for manifest generation.
//!
//! Every variant is fatal to the whole run. Pure stages return these directly;
//! I/O-bound stages wrap them in `anyhow::Error` with path/command context, so
//! callers recover the kind with `err.downcast_ref::<Error>()`.

/// Fatal generation failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The orchestrator could not be run or its output is unusable.
    #[error("orchestrator command `{command}` is unusable: {reason}\n{diagnostics}")]
    Configuration {
        command: String,
        reason: String,
        diagnostics: String,
    },

    /// The distro dependency dataset is absent, unparseable, or lacks an entry.
    #[error("missing distro dependencies for {subject}: {reason}")]
    DataMissing { subject: String, reason: String },

    /// No build-system kind could be derived from a project's options.
    #[error("unable to determine build commands for '{project}' (options: {options})")]
    UnsupportedBuildKind { project: String, options: String },

    /// The manifest compiler exited non-zero for a package directory.
    #[error("manifest compiler `{command}` failed for '{package}' ({status}):\n{stderr}")]
    CompilerFailure {
        package: String,
        command: String,
        status: String,
        stderr: String,
    },
}

impl Error {
    pub(crate) fn data_missing(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataMissing {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
