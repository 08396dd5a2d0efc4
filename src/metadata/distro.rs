//! Distro dependency dataset (`distro-dependencies/arch.yaml`).
//!
//! Maintained in repo-metadata, keyed by project name. Each entry lists the
//! Arch packages a project needs at runtime and build time, plus the distro
//! package names it replaces.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use tracing::info;

use crate::config::DatasetSource;
use crate::error::Error;

/// Distro-level dependency declarations for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DistroDependencySet {
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default)]
    pub makedepends: Vec<String>,
    #[serde(default)]
    pub optdepends: Vec<OptDepend>,
    #[serde(default)]
    pub replaces: Vec<String>,
}

impl DistroDependencySet {
    pub fn is_empty(&self) -> bool {
        self.depends.is_empty()
            && self.makedepends.is_empty()
            && self.optdepends.is_empty()
            && self.replaces.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptDepend {
    #[serde(rename = "dep")]
    pub package: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct DatasetDocument {
    #[serde(default)]
    projects: Option<BTreeMap<String, Option<DistroDependencySet>>>,
}

/// The whole dataset. `None` entries are projects listed without any data.
#[derive(Debug, Clone, Default)]
pub struct DistroDataset {
    projects: BTreeMap<String, Option<DistroDependencySet>>,
}

impl DistroDataset {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, DistroDependencySet)>,
    {
        Self {
            projects: entries
                .into_iter()
                .map(|(name, deps)| (name, Some(deps)))
                .collect(),
        }
    }

    /// Parse a dataset document. `origin` labels errors.
    pub fn from_yaml_str(document: &str, origin: &str) -> Result<Self, Error> {
        let subject = format!("dataset '{origin}'");
        let parsed: Option<DatasetDocument> = serde_yaml::from_str(document)
            .map_err(|err| Error::data_missing(&subject, format!("unparseable: {err}")))?;
        let projects = parsed
            .and_then(|doc| doc.projects)
            .filter(|projects| !projects.is_empty())
            .ok_or_else(|| Error::data_missing(&subject, "no projects listed"))?;
        Ok(Self { projects })
    }

    /// Load from a local file or a remote URL. No retries.
    pub fn load(source: &DatasetSource) -> Result<Self> {
        let (origin, document) = match source {
            DatasetSource::Path(path) => {
                let origin = path.display().to_string();
                let document = fs::read_to_string(path).map_err(|err| {
                    Error::data_missing(format!("dataset '{origin}'"), err.to_string())
                })?;
                (origin, document)
            }
            DatasetSource::Url(url) => (url.clone(), fetch(url)?),
        };

        let dataset = Self::from_yaml_str(&document, &origin)?;
        info!(source = %origin, projects = dataset.len(), "loaded distro dependencies");
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Dependency data for `project`, if the dataset carries any.
    pub fn get(&self, project: &str) -> Option<&DistroDependencySet> {
        self.projects.get(project).and_then(Option::as_ref)
    }

    /// Dependency data for a project that must be built.
    pub fn require(&self, project: &str) -> Result<&DistroDependencySet, Error> {
        let subject = format!("'{project}'");
        match self.projects.get(project) {
            None => Err(Error::data_missing(subject, "project not listed in dataset")),
            Some(None) => Err(Error::data_missing(subject, "dataset entry is empty")),
            Some(Some(deps)) if deps.is_empty() => {
                Err(Error::data_missing(subject, "dataset entry is empty"))
            }
            Some(Some(deps)) => Ok(deps),
        }
    }
}

fn fetch(url: &str) -> Result<String, Error> {
    let subject = format!("dataset '{url}'");
    info!(url, "fetching distro dependencies");
    reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|err| Error::data_missing(subject, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DATASET: &str = r#"
projects:
  kcoreaddons:
    depends: [qt6-base, systemd-libs]
    makedepends: [extra-cmake-modules, qt6-tools]
    optdepends:
      - dep: qt6-declarative
        reason: QML bindings
    replaces: [kcoreaddons]
  plasma-nano:
  taglib:
    replaces: [taglib]
"#;

    #[test]
    fn test_parses_entries() {
        let dataset = DistroDataset::from_yaml_str(DATASET, "arch.yaml").unwrap();
        assert_eq!(dataset.len(), 3);

        let kcoreaddons = dataset.require("kcoreaddons").unwrap();
        assert_eq!(kcoreaddons.depends, vec!["qt6-base", "systemd-libs"]);
        assert_eq!(
            kcoreaddons.optdepends,
            vec![OptDepend {
                package: "qt6-declarative".to_string(),
                reason: "QML bindings".to_string(),
            }]
        );
        assert_eq!(dataset.get("taglib").unwrap().replaces, vec!["taglib"]);
    }

    #[test]
    fn test_null_entry_is_present_but_missing() {
        let dataset = DistroDataset::from_yaml_str(DATASET, "arch.yaml").unwrap();
        assert!(dataset.get("plasma-nano").is_none());
        let err = dataset.require("plasma-nano").unwrap_err();
        assert_eq!(
            err,
            Error::data_missing("'plasma-nano'", "dataset entry is empty")
        );
    }

    #[test]
    fn test_unknown_project_is_data_missing() {
        let dataset = DistroDataset::from_yaml_str(DATASET, "arch.yaml").unwrap();
        let err = dataset.require("kwin").unwrap_err();
        assert!(err.to_string().contains("'kwin'"));
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        for doc in ["", "projects: {}", "projects:", "other: 1"] {
            let err = DistroDataset::from_yaml_str(doc, "arch.yaml").unwrap_err();
            assert!(matches!(err, Error::DataMissing { .. }), "{doc:?}: {err:?}");
        }
    }

    #[test]
    fn test_load_reads_local_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("arch.yaml");
        fs::write(&path, DATASET).unwrap();

        let dataset = DistroDataset::load(&DatasetSource::Path(path)).unwrap();
        assert!(dataset.get("kcoreaddons").is_some());
    }

    #[test]
    fn test_load_missing_file_is_data_missing() {
        let source = DatasetSource::Path(PathBuf::from("/nonexistent/arch.yaml"));
        let err = DistroDataset::load(&source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DataMissing { .. })
        ));
    }
}
