//! Dependency resolution for first-party projects.
//!
//! A project's final `depends` list is its distro-level dependencies (minus a
//! small ignore set) followed by one contribution per internal dependency
//! edge, rewritten through the classifier. Duplicates are dropped keeping the
//! first occurrence so the list order is stable from run to run.

use std::collections::HashSet;

use crate::classify::Classification;
use crate::config::ProjectRules;
use crate::error::Result;
use crate::metadata::{DistroDataset, OptDepend, ProjectRecord};

/// Dependency arrays of one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDependencies {
    pub depends: Vec<String>,
    pub makedepends: Vec<String>,
    pub optdepends: Vec<OptDepend>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
    pub replaces: Vec<String>,
}

pub struct DependencyResolver<'a> {
    classification: &'a Classification,
    dataset: &'a DistroDataset,
    rules: &'a ProjectRules,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(
        classification: &'a Classification,
        dataset: &'a DistroDataset,
        rules: &'a ProjectRules,
    ) -> Self {
        Self {
            classification,
            dataset,
            rules,
        }
    }

    /// Resolve the dependency arrays for a first-party project.
    ///
    /// Fails with [`crate::Error::DataMissing`] when the dataset has no usable
    /// entry for the project.
    pub fn resolve(&self, record: &ProjectRecord) -> Result<ResolvedDependencies> {
        let distro = self.dataset.require(&record.name)?;

        let mut depends: Vec<String> = distro
            .depends
            .iter()
            .filter(|dep| !self.rules.ignore_distro_deps.contains(*dep))
            .cloned()
            .collect();
        for dependency in &record.dependencies {
            depends.extend(self.classification.dependency_tokens(dependency, self.dataset));
        }

        let provides = distro
            .replaces
            .iter()
            .chain(
                self.rules
                    .virtual_packages
                    .get(&record.name)
                    .into_iter()
                    .flatten(),
            )
            .cloned()
            .collect();

        let mut seen = HashSet::new();
        let optdepends = distro
            .optdepends
            .iter()
            .filter(|opt| seen.insert(opt.package.clone()))
            .cloned()
            .collect();

        Ok(ResolvedDependencies {
            depends: dedup(depends),
            makedepends: dedup(distro.makedepends.clone()),
            optdepends,
            provides: dedup(provides),
            conflicts: dedup(distro.replaces.clone()),
            replaces: dedup(distro.replaces.clone()),
        })
    }
}

/// Drop repeated entries, keeping the first occurrence.
pub fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
