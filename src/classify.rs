//! Project classification and package naming.
//!
//! Every project name is exactly one of ignored, third-party or first-party.
//! Rules, in priority order:
//!
//! 1. listed in `projects.ignore` → ignored (never generated, edges dropped)
//! 2. listed in `projects.force_third_party` → third-party
//! 3. repository lacks the internal marker → third-party
//! 4. otherwise → first-party
//!
//! Package names follow from the class: first-party projects are namespaced
//! (`kde-banana-<name>-git`), third-party projects keep their distro name.
//! The same transform is used for a project's own `pkgbase` and for every
//! dependency edge pointing at it.

use std::collections::BTreeSet;

use crate::config::{PackagingConfig, ProjectRules};
use crate::metadata::{DistroDataset, ProjectInfos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectClass {
    Ignored,
    ThirdParty,
    FirstParty,
}

/// Prefix/suffix applied to first-party package names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNaming {
    pub prefix: String,
    pub suffix: String,
}

impl PackageNaming {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn first_party(&self, project: &str) -> String {
        format!("{}{}{}", self.prefix, project, self.suffix)
    }
}

impl From<&PackagingConfig> for PackageNaming {
    fn from(config: &PackagingConfig) -> Self {
        Self::new(&config.prefix, &config.suffix)
    }
}

/// Immutable result of classifying the project universe.
#[derive(Debug, Clone)]
pub struct Classification {
    ignored: BTreeSet<String>,
    third_party: BTreeSet<String>,
    first_party: BTreeSet<String>,
    naming: PackageNaming,
}

impl Classification {
    pub fn new(infos: &ProjectInfos, rules: &ProjectRules, naming: PackageNaming) -> Self {
        let ignored = rules.ignore.clone();

        // Forced names count even when the orchestrator never reported them.
        let mut third_party: BTreeSet<String> = rules
            .force_third_party
            .iter()
            .filter(|name| !ignored.contains(*name))
            .cloned()
            .collect();
        let mut first_party = BTreeSet::new();

        for (name, record) in infos {
            if ignored.contains(name) || third_party.contains(name) {
                continue;
            }
            if record.repository.starts_with(&rules.internal_marker) {
                first_party.insert(name.clone());
            } else {
                third_party.insert(name.clone());
            }
        }

        Self {
            ignored,
            third_party,
            first_party,
            naming,
        }
    }

    /// Class of any project name, reported or merely referenced.
    ///
    /// Names the orchestrator never reported are treated as first-party
    /// unless an override list says otherwise.
    pub fn class_of(&self, project: &str) -> ProjectClass {
        if self.ignored.contains(project) {
            ProjectClass::Ignored
        } else if self.third_party.contains(project) {
            ProjectClass::ThirdParty
        } else {
            ProjectClass::FirstParty
        }
    }

    pub fn is_third_party(&self, project: &str) -> bool {
        self.class_of(project) == ProjectClass::ThirdParty
    }

    /// Reported first-party projects, i.e. the ones that get a manifest.
    pub fn first_party(&self) -> impl Iterator<Item = &str> {
        self.first_party.iter().map(String::as_str)
    }

    /// Package name used for `project`, both as pkgbase and as a dependency.
    pub fn package_name(&self, project: &str) -> String {
        if self.is_third_party(project) {
            project.to_string()
        } else {
            self.naming.first_party(project)
        }
    }

    /// Tokens a dependency edge onto `dependency` contributes to `depends`.
    ///
    /// Ignored targets contribute nothing. Third-party targets contribute the
    /// packages their dataset entry replaces, since the distro may ship them
    /// under a different name; without such an entry the raw name is used.
    pub fn dependency_tokens(&self, dependency: &str, dataset: &DistroDataset) -> Vec<String> {
        match self.class_of(dependency) {
            ProjectClass::Ignored => Vec::new(),
            ProjectClass::ThirdParty => match dataset.get(dependency) {
                Some(deps) if !deps.replaces.is_empty() => deps.replaces.clone(),
                _ => vec![dependency.to_string()],
            },
            ProjectClass::FirstParty => vec![self.naming.first_party(dependency)],
        }
    }
}
