//! PKGBUILD generation for kde-builder projects.
//!
//! Turns the project universe reported by kde-builder, plus the distro
//! dependency dataset from repo-metadata, into one Arch Linux `PKGBUILD` per
//! first-party project, each with its `.SRCINFO` next to it.
//!
//! - **Metadata** - orchestrator queries and the distro dataset
//! - **Classification** - ignored, third-party and first-party projects
//! - **Resolution** - distro dependencies merged with project-to-project edges
//! - **Build plans** - cmake configure/build/install steps and pkgver strategy
//! - **Manifests** - pure rendering, then writing and `.SRCINFO` jobs
//!
//! # Architecture
//!
//! ```text
//! kde-builder --query project-info      arch.yaml
//!          │                                │
//!          └──────────────┬─────────────────┘
//!                         ▼
//!                  classify::Classification
//!                         │
//!          ┌──────────────┼──────────────────┐
//!          ▼              ▼                  ▼
//!   resolve::*       plan::BuildPlanner   report::BuildDepsReport
//!          └──────┬───────┘
//!                 ▼
//!     manifest::ManifestBuilder → manifest::render
//!                 │
//!                 ▼
//!     writer::write_manifest → jobs::JobSet (makepkg --printsrcinfo)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pkgbuild_gen::config::Config;
//! use pkgbuild_gen::metadata::{DistroDataset, KdeBuilder};
//! use pkgbuild_gen::pipeline::{generate, GenerateOptions};
//!
//! let config = Config::load(None)?;
//! let dataset = DistroDataset::load(&config.dataset)?;
//! let orchestrator = KdeBuilder::new(&config.orchestrator.program);
//! let summary = generate(&config, &orchestrator, &dataset, &GenerateOptions {
//!     pkgbuilds_dir: "pkgbuilds".into(),
//!     commit: None,
//!     jobs: pkgbuild_gen::plan::default_jobs(),
//!     skip_srcinfo: false,
//! })?;
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod jobs;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod plan;
pub mod preflight;
pub mod process;
pub mod report;
pub mod resolve;
pub mod writer;

pub use error::{Error, Result};
