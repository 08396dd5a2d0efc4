//! Aggregated build-dependency report.
//!
//! Building every first-party project in one environment needs the union of
//! their distro dependencies. The report collects that union (plus a fixed set
//! of tooling packages) so a build host can be provisioned in one step.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::classify::Classification;
use crate::config::{ProjectRules, ReportConfig};
use crate::error::Error;
use crate::metadata::DistroDataset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildDepsReport {
    /// Everything that must be installed: runtime and build dependencies.
    pub depends: Vec<String>,
    pub makedepends: Vec<String>,
    /// First-party projects covered by the report.
    pub projects: Vec<String>,
}

impl BuildDepsReport {
    pub fn collect(
        classification: &Classification,
        dataset: &DistroDataset,
        rules: &ProjectRules,
        report: &ReportConfig,
    ) -> Result<Self, Error> {
        let mut depends: BTreeSet<String> = report.base_depends.iter().cloned().collect();
        let mut makedepends = BTreeSet::new();
        let mut projects = Vec::new();

        for project in classification.first_party() {
            let distro = dataset.require(project)?;
            depends.extend(
                distro
                    .depends
                    .iter()
                    .filter(|dep| !rules.ignore_distro_deps.contains(*dep))
                    .cloned(),
            );
            makedepends.extend(distro.makedepends.iter().cloned());
            projects.push(project.to_string());
        }

        depends.extend(makedepends.iter().cloned());

        Ok(Self {
            depends: depends.into_iter().collect(),
            makedepends: makedepends.into_iter().collect(),
            projects,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing build-deps report")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("writing build-deps report '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PackageNaming;
    use crate::metadata::{DistroDependencySet, ProjectInfos, ProjectRecord};
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (Classification, DistroDataset, ProjectRules) {
        let infos: ProjectInfos = [
            ProjectRecord::new("kio", "kde:frameworks/kio"),
            ProjectRecord::new("kwin", "kde:plasma/kwin"),
            ProjectRecord::new("plasma-nano", "kde:plasma/plasma-nano"),
            ProjectRecord::new("taglib", "https://github.com/taglib/taglib.git"),
        ]
        .into_iter()
        .map(|record| (record.name.clone(), record))
        .collect();
        let rules = ProjectRules {
            ignore: ["plasma-nano".to_string()].into(),
            ignore_distro_deps: ["phonon-qt6-backend".to_string()].into(),
            ..ProjectRules::default()
        };
        let dataset = DistroDataset::from_entries([
            (
                "kio".to_string(),
                DistroDependencySet {
                    depends: strings(&["qt6-base", "phonon-qt6-backend"]),
                    makedepends: strings(&["extra-cmake-modules"]),
                    ..Default::default()
                },
            ),
            (
                "kwin".to_string(),
                DistroDependencySet {
                    depends: strings(&["qt6-base", "wayland"]),
                    makedepends: strings(&["wayland-protocols", "extra-cmake-modules"]),
                    ..Default::default()
                },
            ),
        ]);
        let classification = Classification::new(&infos, &rules, PackageNaming::new("p-", "-git"));
        (classification, dataset, rules)
    }

    #[test]
    fn test_collects_sorted_union() {
        let (classification, dataset, rules) = fixture();
        let report = BuildDepsReport::collect(
            &classification,
            &dataset,
            &rules,
            &ReportConfig {
                base_depends: strings(&["gdb", "ccache"]),
            },
        )
        .unwrap();

        assert_eq!(
            report.depends,
            strings(&[
                "ccache",
                "extra-cmake-modules",
                "gdb",
                "qt6-base",
                "wayland",
                "wayland-protocols"
            ])
        );
        assert_eq!(
            report.makedepends,
            strings(&["extra-cmake-modules", "wayland-protocols"])
        );
        assert_eq!(report.projects, strings(&["kio", "kwin"]));
    }

    #[test]
    fn test_missing_entry_is_fatal() {
        let (classification, _, rules) = fixture();
        let dataset = DistroDataset::from_entries([(
            "kio".to_string(),
            DistroDependencySet {
                depends: strings(&["qt6-base"]),
                ..Default::default()
            },
        )]);
        let err =
            BuildDepsReport::collect(&classification, &dataset, &rules, &ReportConfig::default())
                .unwrap_err();
        assert!(err.to_string().contains("'kwin'"));
    }

    #[test]
    fn test_write_emits_pretty_json() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("out/build-deps.json");
        let report = BuildDepsReport {
            depends: strings(&["gdb"]),
            makedepends: Vec::new(),
            projects: strings(&["kio"]),
        };

        report.write(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["depends"], serde_json::json!(["gdb"]));
        assert_eq!(value["projects"], serde_json::json!(["kio"]));
    }
}
