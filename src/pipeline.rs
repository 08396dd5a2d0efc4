//! End-to-end manifest generation.
//!
//! Phases, each completing before the next starts:
//!
//! 1. query the orchestrator and classify every reported project
//! 2. resolve dependencies and build plans for every first-party project
//! 3. render and write every manifest, launching its `.SRCINFO` job
//! 4. join all jobs
//!
//! All fallible synthesis happens in phase 2, so a missing dataset entry or an
//! unsupported build system aborts the run before any file is written.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::classify::{Classification, PackageNaming};
use crate::config::Config;
use crate::jobs::JobSet;
use crate::manifest::{render, ManifestBuilder, ResolvedManifest};
use crate::metadata::{DistroDataset, ProjectInfos, ProjectSource};
use crate::plan::BuildPlanner;
use crate::report::BuildDepsReport;
use crate::resolve::DependencyResolver;
use crate::writer::write_manifest;

/// Per-run inputs that do not come from the config file.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub pkgbuilds_dir: PathBuf,
    /// Commit identifier seeding a literal pkgver.
    pub commit: Option<String>,
    /// `--parallel` value for the build step.
    pub jobs: usize,
    /// Skip `.SRCINFO` derivation.
    pub skip_srcinfo: bool,
}

/// Manifests resolved in memory, not yet written.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub manifests: Vec<ResolvedManifest>,
    /// Non-fatal findings from build-plan synthesis.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    pub package_dirs: Vec<PathBuf>,
    pub srcinfo_files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

pub fn classify(config: &Config, infos: &ProjectInfos) -> Classification {
    Classification::new(infos, &config.projects, PackageNaming::from(&config.packaging))
}

/// Resolve a manifest for every first-party project. Pure: no I/O.
pub fn resolve_manifests(
    config: &Config,
    infos: &ProjectInfos,
    dataset: &DistroDataset,
    commit: Option<&str>,
    jobs: usize,
) -> crate::Result<Resolution> {
    let classification = classify(config, infos);
    let resolver = DependencyResolver::new(&classification, dataset, &config.projects);
    let planner = BuildPlanner::new(config.build.extra_cmake_options.clone(), jobs);
    let builder = ManifestBuilder::new(
        &config.packaging,
        &config.projects,
        &classification,
        commit,
    );

    let mut resolution = Resolution {
        manifests: Vec::new(),
        warnings: Vec::new(),
    };
    for project in classification.first_party() {
        let record = &infos[project];
        let dependencies = resolver.resolve(record)?;
        let plan = planner.plan(record)?;
        resolution.warnings.extend(plan.warnings.iter().cloned());
        resolution.manifests.push(builder.build(record, dependencies, plan));
    }
    Ok(resolution)
}

/// Write every manifest and derive its `.SRCINFO`.
pub fn write_all(
    resolution: &Resolution,
    srcinfo_command: &[String],
    options: &GenerateOptions,
) -> Result<GenerateSummary> {
    let rendered = resolution
        .manifests
        .iter()
        .map(|manifest| (manifest.pkgbase.as_str(), render(manifest)))
        .collect::<Vec<_>>();

    let mut jobs = JobSet::new(srcinfo_command)?;
    let mut package_dirs = Vec::with_capacity(rendered.len());
    for (pkgbase, text) in &rendered {
        let dir = write_manifest(&options.pkgbuilds_dir, pkgbase, text)?;
        info!(package = %pkgbase, dir = %dir.display(), "wrote PKGBUILD");
        if !options.skip_srcinfo {
            jobs.launch(pkgbase, &dir)?;
        }
        package_dirs.push(dir);
    }

    let srcinfo_files = jobs.join_all()?;
    Ok(GenerateSummary {
        package_dirs,
        srcinfo_files,
        warnings: resolution.warnings.clone(),
    })
}

/// Full run: query, resolve, write, join.
pub fn generate(
    config: &Config,
    source: &dyn ProjectSource,
    dataset: &DistroDataset,
    options: &GenerateOptions,
) -> Result<GenerateSummary> {
    let infos = source
        .project_info(&config.orchestrator.targets)
        .context("querying project info")?;
    let resolution = resolve_manifests(
        config,
        &infos,
        dataset,
        options.commit.as_deref(),
        options.jobs,
    )?;
    info!(manifests = resolution.manifests.len(), "resolved all manifests");
    write_all(&resolution, &config.packaging.srcinfo_command, options)
}

/// Query the orchestrator and write the aggregated build-dependency report.
pub fn build_deps_report(
    config: &Config,
    source: &dyn ProjectSource,
    dataset: &DistroDataset,
    output: &Path,
) -> Result<BuildDepsReport> {
    let infos = source
        .project_info(&config.orchestrator.targets)
        .context("querying project info")?;
    let classification = classify(config, &infos);
    let report =
        BuildDepsReport::collect(&classification, dataset, &config.projects, &config.report)?;
    report.write(output)?;
    info!(
        output = %output.display(),
        packages = report.depends.len(),
        "wrote build-deps report"
    );
    Ok(report)
}
