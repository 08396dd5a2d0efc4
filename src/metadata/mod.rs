//! Metadata sources: orchestrator project records and distro dependency data.
//!
//! Both sources are validated here, at the boundary, so downstream stages only
//! ever see typed records.

pub mod distro;
pub mod orchestrator;
pub mod project;

pub use distro::{DistroDataset, DistroDependencySet, OptDepend};
pub use orchestrator::{KdeBuilder, ProjectSource};
pub use project::{parse_project_info, ProjectInfos, ProjectRecord};
