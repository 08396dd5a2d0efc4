use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pkgbuild_gen::config::Config;
use pkgbuild_gen::metadata::{DistroDataset, KdeBuilder};
use pkgbuild_gen::pipeline::{build_deps_report, generate, GenerateOptions};
use pkgbuild_gen::{plan, preflight};

/// Generate Arch Linux PKGBUILDs for kde-builder projects.
///
/// ENVIRONMENT VARIABLES:
///     CI_PROJECT_DIR        Project root (default: current directory)
///     PKGBUILDS_DIR         Output root for package directories
///     CI_COMMIT_SHA         Literal pkgver; unset means pkgver() from git
///     PKGBUILD_GEN_CONFIG   Configuration file replacing the built-in one
///     RUST_LOG              Log filter (default: info)
#[derive(Parser)]
#[command(name = "pkgbuild-gen")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "PKGBUILD_GEN_CONFIG")]
    config: Option<PathBuf>,

    /// Project root; default output paths are relative to it
    #[arg(long, global = true, env = "CI_PROJECT_DIR", default_value = ".")]
    project_dir: PathBuf,

    /// Do not run `--generate-config` / `--metadata-only` before querying
    #[arg(long, global = true)]
    skip_prepare: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one PKGBUILD and .SRCINFO per first-party project
    Generate {
        /// Output root (default: <project-dir>/pkgbuilds)
        #[arg(long, env = "PKGBUILDS_DIR")]
        pkgbuilds_dir: Option<PathBuf>,
        /// Commit identifier used as a literal pkgver
        #[arg(long, env = "CI_COMMIT_SHA")]
        commit: Option<String>,
        /// Parallel jobs for the generated build step (default: CPUs + 1)
        #[arg(long, short = 'j', value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        jobs: Option<usize>,
        /// Skip host tool checks
        #[arg(long)]
        skip_preflight: bool,
        /// Write manifests without running the manifest compiler
        #[arg(long)]
        skip_srcinfo: bool,
        /// Targets replacing the configured ones
        targets: Vec<String>,
    },

    /// Write the aggregated build-dependency report as JSON
    Deps {
        /// Output file (default: <project-dir>/build-deps.json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Targets replacing the configured ones
        targets: Vec<String>,
    },

    /// Validate the configuration and check host tools
    Check,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            pkgbuilds_dir,
            commit,
            jobs,
            skip_preflight,
            skip_srcinfo,
            targets,
        } => {
            override_targets(&mut config, targets);
            if !skip_preflight {
                preflight::check_host_tools(&config)?;
            }
            let options = GenerateOptions {
                pkgbuilds_dir: pkgbuilds_dir
                    .unwrap_or_else(|| cli.project_dir.join("pkgbuilds")),
                commit: commit.filter(|c| !c.trim().is_empty()),
                jobs: jobs.unwrap_or_else(plan::default_jobs),
                skip_srcinfo,
            };
            let orchestrator = orchestrator(&config, cli.skip_prepare)?;
            let dataset = DistroDataset::load(&config.dataset)?;

            let summary = generate(&config, &orchestrator, &dataset, &options)?;
            info!(
                packages = summary.package_dirs.len(),
                srcinfo = summary.srcinfo_files.len(),
                warnings = summary.warnings.len(),
                dir = %options.pkgbuilds_dir.display(),
                "generation complete"
            );
            Ok(())
        }
        Commands::Deps { output, targets } => {
            override_targets(&mut config, targets);
            let output = output.unwrap_or_else(|| cli.project_dir.join("build-deps.json"));
            let orchestrator = orchestrator(&config, cli.skip_prepare)?;
            let dataset = DistroDataset::load(&config.dataset)?;
            build_deps_report(&config, &orchestrator, &dataset, &output)?;
            Ok(())
        }
        Commands::Check => check(&config, cli.config.as_deref()),
    }
}

fn override_targets(config: &mut Config, targets: Vec<String>) {
    if !targets.is_empty() {
        config.orchestrator.targets = targets;
    }
}

fn orchestrator(config: &Config, skip_prepare: bool) -> Result<KdeBuilder> {
    let orchestrator = KdeBuilder::new(&config.orchestrator.program)
        .with_leading_args(config.orchestrator.args.iter().cloned());
    if !skip_prepare {
        orchestrator
            .prepare()
            .with_context(|| format!("preparing '{}'", orchestrator.program()))?;
    }
    Ok(orchestrator)
}

fn check(config: &Config, path: Option<&Path>) -> Result<()> {
    let origin = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    info!(config = %origin, targets = config.orchestrator.targets.len(), "configuration ok");
    preflight::check_host_tools(config)?;
    info!("host tools ok");
    Ok(())
}
