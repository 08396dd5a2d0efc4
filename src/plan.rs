//! Build-plan synthesis.
//!
//! Turns a project's build-system options into the shell commands placed in
//! the manifest's `build()` and `package()` functions, and decides how the
//! package version is resolved.
//!
//! Only CMake is supported. Anything else fails loudly: a guessed build plan
//! produces a package that builds but installs the wrong thing.

use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{Error, Result};
use crate::metadata::ProjectRecord;

/// Option key marking a CMake project.
pub const CMAKE_OPTIONS_KEY: &str = "cmake-options";

/// Separator between configure arguments: line continuation plus two tabs.
const CONTINUATION: &str = " \\\n\t\t";

const PKGVER_PLACEHOLDER: &str = "0";

const PKGVER_FUNCTION: &str = r#"pkgver() {
    cd "$srcdir/@SOURCE_DIR@"
    local described
    if described="$(git describe --long --tags --abbrev=7 2>/dev/null)"; then
        printf '%s' "$described" | sed 's/^v//;s/\([^-]*-g\)/r\1/;s/-/./g'
    else
        printf 'r%s.%s.%s' "$(git rev-list --count HEAD)" "$(git rev-parse --short=7 HEAD)" "$(date -u +%Y%m%d%H%M%S)"
    fi
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildKind {
    CMake { options: String },
}

impl BuildKind {
    /// Detect the build system from `options`.
    ///
    /// An empty map is read as "CMake without extra options" and reported
    /// through the returned warning.
    pub fn from_options(
        project: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<(Self, Option<String>)> {
        if options.is_empty() {
            let warning = format!("No package options for {project}. Assuming cmake build");
            return Ok((
                BuildKind::CMake {
                    options: String::new(),
                },
                Some(warning),
            ));
        }

        if let Some(cmake) = options.get(CMAKE_OPTIONS_KEY) {
            return Ok((
                BuildKind::CMake {
                    options: cmake.trim().to_string(),
                },
                None,
            ));
        }

        Err(Error::UnsupportedBuildKind {
            project: project.to_string(),
            options: format!("{options:?}"),
        })
    }
}

/// Commands for one project's `build()` and `package()` functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub kind: BuildKind,
    pub build_steps: Vec<String>,
    pub package_steps: Vec<String>,
    /// Non-fatal findings, e.g. a defaulted build kind.
    pub warnings: Vec<String>,
}

/// Synthesizes [`BuildPlan`]s with the global options applied.
#[derive(Debug, Clone)]
pub struct BuildPlanner {
    extra_cmake_options: Vec<String>,
    jobs: usize,
}

impl BuildPlanner {
    /// `jobs` is the `--parallel` value passed to the build step.
    pub fn new(extra_cmake_options: Vec<String>, jobs: usize) -> Self {
        Self {
            extra_cmake_options,
            jobs,
        }
    }

    pub fn plan(&self, record: &ProjectRecord) -> Result<BuildPlan> {
        let (kind, warning) = BuildKind::from_options(&record.name, &record.options)?;
        if let Some(warning) = &warning {
            warn!(project = %record.name, "{warning}");
        }

        let BuildKind::CMake { options } = &kind;
        let configure = std::iter::once(format!("cmake -B build -S \"{}\"", record.name))
            .chain(self.extra_cmake_options.iter().cloned())
            .chain((!options.is_empty()).then(|| options.clone()))
            .collect::<Vec<_>>()
            .join(CONTINUATION);

        Ok(BuildPlan {
            build_steps: vec![
                configure,
                format!("cmake --build build --parallel {}", self.jobs),
            ],
            package_steps: vec!["DESTDIR=\"$pkgdir\" cmake --install build".to_string()],
            warnings: warning.into_iter().collect(),
            kind,
        })
    }
}

/// Available processing units plus one.
pub fn default_jobs() -> usize {
    let cpus = match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!("could not detect CPU count ({e}), assuming 4");
            4
        }
    };
    cpus + 1
}

/// How the manifest declares its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PkgVer {
    /// Fixed version, seeded from a commit identifier.
    Literal(String),
    /// Derived from git history by `pkgver()` once makepkg has fetched the
    /// sources in `source_dir`.
    FromSource { source_dir: String },
}

impl PkgVer {
    /// Literal when `commit` is set, otherwise resolved at build time.
    pub fn resolve(commit: Option<&str>, source_dir: &str) -> Self {
        match commit.map(str::trim).filter(|c| !c.is_empty()) {
            Some(commit) => PkgVer::Literal(sanitize_pkgver(commit)),
            None => PkgVer::FromSource {
                source_dir: source_dir.to_string(),
            },
        }
    }

    /// Value of the `pkgver=` field.
    pub fn declared(&self) -> &str {
        match self {
            PkgVer::Literal(version) => version,
            PkgVer::FromSource { .. } => PKGVER_PLACEHOLDER,
        }
    }

    /// The `pkgver()` function, if the version is resolved at build time.
    pub fn shell_function(&self) -> Option<String> {
        match self {
            PkgVer::Literal(_) => None,
            PkgVer::FromSource { source_dir } => {
                Some(PKGVER_FUNCTION.replace("@SOURCE_DIR@", source_dir))
            }
        }
    }
}

/// pkgver may not contain hyphens, colons, slashes or whitespace.
fn sanitize_pkgver(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
