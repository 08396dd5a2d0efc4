//! Persisting manifests.
//!
//! Layout: `<pkgbuilds_dir>/<pkgbase>/PKGBUILD`, with the compiler's index
//! next to it as `.SRCINFO`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILENAME: &str = "PKGBUILD";
pub const SRCINFO_FILENAME: &str = ".SRCINFO";

pub fn package_dir(pkgbuilds_dir: &Path, pkgbase: &str) -> PathBuf {
    pkgbuilds_dir.join(pkgbase)
}

/// Write `text` as the manifest for `pkgbase`, creating its directory if needed.
///
/// Returns the package directory.
pub fn write_manifest(pkgbuilds_dir: &Path, pkgbase: &str, text: &str) -> Result<PathBuf> {
    let dir = package_dir(pkgbuilds_dir, pkgbase);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating package directory '{}'", dir.display()))?;
    let path = dir.join(MANIFEST_FILENAME);
    fs::write(&path, text).with_context(|| format!("writing manifest '{}'", path.display()))?;
    Ok(dir)
}

/// Write the compiler output verbatim as the package's `.SRCINFO`.
pub fn write_srcinfo(package_dir: &Path, contents: &str) -> Result<PathBuf> {
    let path = package_dir.join(SRCINFO_FILENAME);
    fs::write(&path, contents).with_context(|| format!("writing '{}'", path.display()))?;
    Ok(path)
}
