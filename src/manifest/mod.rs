//! Resolved package manifests.
//!
//! A [`ResolvedManifest`] holds everything a PKGBUILD declares. It is built
//! once per first-party project by [`ManifestBuilder`] and turned into text by
//! [`render`]; neither step touches the filesystem.

mod render;

pub use render::{bash_quote, render};

use crate::classify::Classification;
use crate::config::{PackagingConfig, ProjectRules, PROJECT_PLACEHOLDER};
use crate::metadata::ProjectRecord;
use crate::plan::{BuildPlan, PkgVer};
use crate::resolve::ResolvedDependencies;

/// `source=` entry: `<name>::git+<locator>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSource {
    pub name: String,
    pub locator: String,
}

impl GitSource {
    pub fn to_source_entry(&self) -> String {
        format!("{}::git+{}", self.name, self.locator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub project: String,
    pub maintainer: String,
    pub pkgbase: String,
    pub pkgnames: Vec<String>,
    pub pkgver: PkgVer,
    pub pkgrel: u32,
    pub url: String,
    pub description: String,
    pub arch: Vec<String>,
    pub license: Vec<String>,
    pub groups: Vec<String>,
    pub source: GitSource,
    pub dependencies: ResolvedDependencies,
    pub build_steps: Vec<String>,
    pub package_steps: Vec<String>,
}

/// Assembles manifests from the per-project stage outputs.
pub struct ManifestBuilder<'a> {
    packaging: &'a PackagingConfig,
    internal_marker: &'a str,
    classification: &'a Classification,
    commit: Option<&'a str>,
}

impl<'a> ManifestBuilder<'a> {
    /// `commit` seeds a literal pkgver; without it the version is resolved
    /// from git history at build time.
    pub fn new(
        packaging: &'a PackagingConfig,
        rules: &'a ProjectRules,
        classification: &'a Classification,
        commit: Option<&'a str>,
    ) -> Self {
        Self {
            packaging,
            internal_marker: &rules.internal_marker,
            classification,
            commit,
        }
    }

    pub fn build(
        &self,
        record: &ProjectRecord,
        dependencies: ResolvedDependencies,
        plan: BuildPlan,
    ) -> ResolvedManifest {
        let pkgbase = self.classification.package_name(&record.name);

        ResolvedManifest {
            project: record.name.clone(),
            maintainer: self.packaging.maintainer.clone(),
            pkgnames: vec![pkgbase.clone()],
            pkgbase,
            pkgver: PkgVer::resolve(self.commit, &record.name),
            pkgrel: self.packaging.pkgrel,
            url: self.packaging.url.clone(),
            description: self
                .packaging
                .description
                .replace(PROJECT_PLACEHOLDER, &record.name),
            arch: self.packaging.arch.clone(),
            license: self.packaging.license.clone(),
            groups: self.packaging.groups.clone(),
            source: GitSource {
                name: record.name.clone(),
                locator: self.source_locator(&record.repository),
            },
            dependencies,
            build_steps: plan.build_steps,
            package_steps: plan.package_steps,
        }
    }

    /// Expand the short repository form into a fetchable URL.
    fn source_locator(&self, repository: &str) -> String {
        match repository.strip_prefix(self.internal_marker) {
            Some(path) => format!("{}{}", self.packaging.source_base_url, path),
            None => repository.to_string(),
        }
    }
}
