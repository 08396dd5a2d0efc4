//! Typed project records from the orchestrator's `project-info` query.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Project records keyed by project name.
pub type ProjectInfos = BTreeMap<String, ProjectRecord>;

/// One project as reported by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    /// Repository locator, either a URL or a short form such as `kde:plasma/kwin`.
    pub repository: String,
    /// Internal project-to-project dependencies, in the orchestrator's order.
    pub dependencies: Vec<String>,
    /// Build-system kind (e.g. `cmake-options`) to option string.
    pub options: BTreeMap<String, String>,
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repository: repository.into(),
            dependencies: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_option(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(kind.into(), value.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawProjectInfo {
    repository: Option<String>,
    #[serde(default)]
    dependencies: Option<Vec<String>>,
    #[serde(default)]
    options: Option<BTreeMap<String, serde_yaml::Value>>,
}

/// Parse the YAML document printed by `--query project-info`.
///
/// `command` is only used to label errors.
pub fn parse_project_info(document: &str, command: &str) -> Result<ProjectInfos> {
    let unusable = |reason: String| Error::Configuration {
        command: command.to_string(),
        reason,
        diagnostics: document.to_string(),
    };

    let raw: Option<BTreeMap<String, Option<RawProjectInfo>>> = serde_yaml::from_str(document)
        .map_err(|err| unusable(format!("unparseable project info: {err}")))?;
    let raw = raw.unwrap_or_default();
    if raw.is_empty() {
        return Err(unusable("no project info returned".to_string()));
    }

    let mut infos = ProjectInfos::new();
    for (name, info) in raw {
        let info = info.ok_or_else(|| unusable(format!("empty project info for '{name}'")))?;
        let repository = info
            .repository
            .filter(|repo| !repo.trim().is_empty())
            .ok_or_else(|| unusable(format!("project '{name}' has no repository")))?;
        let options = info
            .options
            .unwrap_or_default()
            .into_iter()
            .map(|(kind, value)| (kind, option_value_to_string(&value)))
            .collect();

        infos.insert(
            name.clone(),
            ProjectRecord {
                name,
                repository,
                dependencies: info.dependencies.unwrap_or_default(),
                options,
            },
        );
    }
    Ok(infos)
}

fn option_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(option_value_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
