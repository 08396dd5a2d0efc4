//! Generator configuration.
//!
//! Loaded once at startup from TOML. The built-in defaults live in
//! `pkgbuild-gen.toml` at the repository root and are embedded at compile time;
//! a user-supplied file replaces them wholesale.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const BUILTIN_CONFIG: &str = include_str!("../pkgbuild-gen.toml");

/// Placeholder replaced by the project name in `packaging.description`.
pub const PROJECT_PLACEHOLDER: &str = "{project}";

#[derive(Debug, Clone)]
pub struct Config {
    pub orchestrator: OrchestratorConfig,
    pub dataset: DatasetSource,
    pub projects: ProjectRules,
    pub packaging: PackagingConfig,
    pub build: BuildConfig,
    pub report: ReportConfig,
}

/// Where the distro dependency dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    pub program: String,
    /// Arguments placed before every orchestrator invocation.
    pub args: Vec<String>,
    pub targets: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            program: "kde-builder".to_string(),
            args: Vec::new(),
            targets: Vec::new(),
        }
    }
}

/// Override lists consumed by the classifier and resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectRules {
    /// Repository prefix marking a project as built from our own sources.
    pub internal_marker: String,
    pub ignore: BTreeSet<String>,
    pub force_third_party: BTreeSet<String>,
    /// Distro dependency names dropped from every `depends` list.
    pub ignore_distro_deps: BTreeSet<String>,
    /// Extra `provides` entries per project name.
    pub virtual_packages: BTreeMap<String, Vec<String>>,
}

impl Default for ProjectRules {
    fn default() -> Self {
        Self {
            internal_marker: "kde:".to_string(),
            ignore: BTreeSet::new(),
            force_third_party: BTreeSet::new(),
            ignore_distro_deps: BTreeSet::new(),
            virtual_packages: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagingConfig {
    pub prefix: String,
    pub suffix: String,
    /// Replacement for `internal_marker` when building source URLs.
    pub source_base_url: String,
    pub maintainer: String,
    pub url: String,
    pub description: String,
    pub arch: Vec<String>,
    pub license: Vec<String>,
    pub groups: Vec<String>,
    pub pkgrel: u32,
    /// Manifest compiler invoked in each package directory.
    pub srcinfo_command: Vec<String>,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            prefix: "kde-banana-".to_string(),
            suffix: "-git".to_string(),
            source_base_url: "https://invent.kde.org/".to_string(),
            maintainer: "KDE Community <http://www.kde.org>".to_string(),
            url: "https://community.kde.org/KDE_Linux".to_string(),
            description: format!("Build of {PROJECT_PLACEHOLDER} for KDE Linux"),
            arch: vec!["x86_64".to_string()],
            license: vec!["GPL-2.0-only".to_string()],
            groups: vec!["kde-linux".to_string(), "banana".to_string()],
            pkgrel: 1,
            srcinfo_command: vec!["makepkg".to_string(), "--printsrcinfo".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub extra_cmake_options: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Packages always present in the aggregated build-dependency report.
    pub base_depends: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    #[serde(default)]
    orchestrator: OrchestratorConfig,
    #[serde(default)]
    dataset: DatasetToml,
    #[serde(default)]
    projects: ProjectRules,
    #[serde(default)]
    packaging: PackagingConfig,
    #[serde(default)]
    build: BuildConfig,
    #[serde(default)]
    report: ReportConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetToml {
    path: Option<String>,
    url: Option<String>,
}

impl Config {
    /// The configuration shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CONFIG, Path::new("<builtin pkgbuild-gen.toml>"))
    }

    /// Load `path` if given, otherwise the built-in configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        Self::from_toml_str(&contents, path)
    }

    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self> {
        let parsed: ConfigToml = toml::from_str(contents)
            .with_context(|| format!("parsing config '{}'", origin.display()))?;

        let dataset = match (parsed.dataset.path, parsed.dataset.url) {
            (Some(path), None) => DatasetSource::Path(expand_home(&path)),
            (None, Some(url)) => DatasetSource::Url(url),
            (Some(_), Some(_)) => bail!(
                "invalid config '{}': [dataset] accepts either 'path' or 'url', not both",
                origin.display()
            ),
            (None, None) => bail!(
                "invalid config '{}': [dataset] requires 'path' or 'url'",
                origin.display()
            ),
        };

        if parsed.packaging.srcinfo_command.is_empty() {
            bail!(
                "invalid config '{}': packaging.srcinfo_command must name a program",
                origin.display()
            );
        }
        if parsed.projects.internal_marker.is_empty() {
            bail!(
                "invalid config '{}': projects.internal_marker must not be empty",
                origin.display()
            );
        }
        if let Some(name) = parsed
            .projects
            .ignore
            .intersection(&parsed.projects.force_third_party)
            .next()
        {
            bail!(
                "invalid config '{}': '{}' is listed in both projects.ignore and projects.force_third_party",
                origin.display(),
                name
            );
        }

        Ok(Self {
            orchestrator: parsed.orchestrator,
            dataset,
            projects: parsed.projects,
            packaging: parsed.packaging,
            build: parsed.build,
            report: parsed.report,
        })
    }
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<Config> {
        Config::from_toml_str(contents, Path::new("test.toml"))
    }

    #[test]
    fn test_builtin_config_is_valid() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.orchestrator.program, "kde-builder");
        assert!(config.orchestrator.targets.contains(&"workspace".to_string()));
        assert!(config.projects.ignore.contains("packagekit-qt"));
        assert!(config.projects.force_third_party.contains("taglib"));
        assert_eq!(
            config.projects.virtual_packages.get("kwallet"),
            Some(&vec!["org.freedesktop.secrets".to_string()])
        );
        assert_eq!(config.packaging.prefix, "kde-banana-");
        assert!(matches!(config.dataset, DatasetSource::Path(_)));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse("[dataset]\nurl = \"https://example.org/arch.yaml\"\n").unwrap();
        assert_eq!(
            config.dataset,
            DatasetSource::Url("https://example.org/arch.yaml".to_string())
        );
        assert_eq!(config.projects.internal_marker, "kde:");
        assert_eq!(config.packaging.pkgrel, 1);
        assert_eq!(config.packaging.srcinfo_command, vec!["makepkg", "--printsrcinfo"]);
        assert!(config.build.extra_cmake_options.is_empty());
    }

    #[test]
    fn test_dataset_requires_exactly_one_source() {
        assert!(parse("").is_err());
        assert!(parse("[dataset]\npath = \"a.yaml\"\nurl = \"https://x\"\n").is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = parse("[dataset]\npath = \"a.yaml\"\n[projects]\nignroe = []\n").unwrap_err();
        assert!(format!("{err:#}").contains("ignroe"));
    }

    #[test]
    fn test_ignore_and_force_third_party_must_not_overlap() {
        let err = parse(
            "[dataset]\npath = \"a.yaml\"\n[projects]\nignore = [\"taglib\"]\nforce_third_party = [\"taglib\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("taglib"));
    }

    #[test]
    fn test_empty_srcinfo_command_is_rejected() {
        assert!(
            parse("[dataset]\npath = \"a.yaml\"\n[packaging]\nsrcinfo_command = []\n").is_err()
        );
    }

    #[test]
    fn test_expand_home_leaves_other_paths_alone() {
        assert_eq!(expand_home("/etc/arch.yaml"), PathBuf::from("/etc/arch.yaml"));
        assert_eq!(expand_home("relative.yaml"), PathBuf::from("relative.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.yaml"), home.join("x.yaml"));
        }
    }

    #[test]
    fn test_load_reads_file_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(
            &path,
            "[orchestrator]\ntargets = [\"kcoreaddons\"]\n[dataset]\npath = \"/srv/arch.yaml\"\n",
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.orchestrator.targets, vec!["kcoreaddons"]);
        assert_eq!(config.dataset, DatasetSource::Path(PathBuf::from("/srv/arch.yaml")));
    }
}
