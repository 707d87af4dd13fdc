//! Job archive loading
//!
//! Turns the path given to `quartz job deploy` into an upload: archives are
//! sent as they are, directories are packed into a `.tar.gz` in memory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::write::GzEncoder;

/// Entries never shipped from a job directory
const IGNORED: &[&str] = &[".git", "node_modules"];

const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".tar"];

/// Archive ready to upload
#[derive(Debug)]
pub struct Payload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Loads `path` as an upload
pub fn load(path: &Path) -> Result<Payload> {
    let metadata =
        fs::metadata(path).with_context(|| format!("Cannot access {}", path.display()))?;

    let name = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "job".to_string());

    if metadata.is_dir() {
        let bytes = pack_dir(path)?;
        return Ok(Payload {
            file_name: format!("{}.tar.gz", name),
            bytes,
        });
    }

    if !ARCHIVE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        bail!(
            "{} is not a job directory or a .tar.gz/.tgz/.tar archive",
            path.display()
        );
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Payload {
        file_name: name,
        bytes,
    })
}

/// Packs the contents of `dir` into a gzip-compressed tar
pub fn pack_dir(dir: &Path) -> Result<Vec<u8>> {
    if !dir.join("config.json").is_file() {
        bail!("{} has no config.json at its root", dir.display());
    }

    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for entry in entries {
        let file_name = entry.file_name();
        if IGNORED.iter().any(|ignored| file_name == *ignored) {
            continue;
        }

        let path = entry.path();
        if entry.file_type()?.is_dir() {
            builder.append_dir_all(&file_name, &path)?;
        } else {
            builder.append_path_with_name(&path, &file_name)?;
        }
    }

    let bytes = builder.into_inner()?.finish()?;
    Ok(bytes)
}
