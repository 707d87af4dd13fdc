//! Build packager
//!
//! Bundles a staging directory into the gzip-compressed tar build context
//! handed to the container engine.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::debug;

use crate::error::{JobError, Result};

/// Packages the direct contents of `dir` into `dir/<token>.tar.gz`
///
/// Returns the path of the build context.
pub async fn package(dir: &Path, token: &str) -> Result<PathBuf> {
    let output = dir.join(format!("{}.tar.gz", token));

    let (source, target) = (dir.to_path_buf(), output.clone());
    tokio::task::spawn_blocking(move || package_sync(&source, &target))
        .await
        .map_err(|e| JobError::Packaging(e.to_string()))?
        .map_err(|e| JobError::Packaging(format!("{}: {}", output.display(), e)))?;

    Ok(output)
}

fn package_sync(dir: &Path, output: &Path) -> std::io::Result<()> {
    // List before creating the output so the context never contains itself
    let mut names = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<Vec<OsString>>>()?;
    names.sort();

    if let Some(own) = output.file_name() {
        names.retain(|name| name != own);
    }

    let file = File::create(output)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    for name in &names {
        let path = dir.join(name);
        if std::fs::symlink_metadata(&path)?.is_dir() {
            builder.append_dir_all(name, &path)?;
        } else {
            builder.append_path_with_name(&path, name)?;
        }
    }

    builder.into_inner()?.finish()?;

    debug!(
        entries = names.len(),
        "Packaged {} into {}",
        dir.display(),
        output.display()
    );
    Ok(())
}
