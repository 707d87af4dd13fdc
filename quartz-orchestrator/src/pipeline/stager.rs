//! Archive stager
//!
//! Extracts an uploaded archive into a fresh staging directory and removes
//! the archive itself, leaving only its contents.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{JobError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const USTAR_MAGIC: &[u8] = b"ustar";
const USTAR_OFFSET: usize = 257;

/// Archive formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    TarGz,
}

impl ArchiveFormat {
    /// Picks the format from the file extension, falling back to magic bytes
    pub fn detect(file_name: &str, bytes: &[u8]) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            return Some(Self::TarGz);
        }
        if lower.ends_with(".tar") {
            return Some(Self::Tar);
        }

        if bytes.starts_with(&GZIP_MAGIC) {
            return Some(Self::TarGz);
        }
        if bytes.get(USTAR_OFFSET..USTAR_OFFSET + USTAR_MAGIC.len()) == Some(USTAR_MAGIC) {
            return Some(Self::Tar);
        }

        None
    }
}

/// Stage an uploaded archive into `dest`
///
/// `dest` must not exist yet; its parent must. On failure the caller owns
/// cleanup of whatever was left in `dest`.
pub async fn stage_archive(file_name: &str, bytes: Vec<u8>, dest: &Path) -> Result<()> {
    let base_name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| JobError::Upload("archive file name is missing".to_string()))?
        .to_string();

    if bytes.is_empty() {
        return Err(JobError::Upload(format!("archive {} is empty", base_name)));
    }

    let format = ArchiveFormat::detect(&base_name, &bytes).ok_or_else(|| {
        JobError::Upload(format!("unsupported archive format: {}", base_name))
    })?;

    tokio::fs::create_dir(dest).await.map_err(|e| {
        JobError::Upload(format!(
            "failed to create staging directory {}: {}",
            dest.display(),
            e
        ))
    })?;

    let archive_path = dest.join(&base_name);
    tokio::fs::write(&archive_path, &bytes)
        .await
        .map_err(|e| JobError::Upload(format!("failed to save {}: {}", base_name, e)))?;

    let (archive, target) = (archive_path.clone(), dest.to_path_buf());
    tokio::task::spawn_blocking(move || extract(&archive, &target, format))
        .await
        .map_err(|e| JobError::Upload(e.to_string()))?
        .map_err(|e| JobError::Upload(format!("failed to extract {}: {}", base_name, e)))?;

    tokio::fs::remove_file(&archive_path)
        .await
        .map_err(|e| JobError::Upload(format!("failed to remove {}: {}", base_name, e)))?;

    debug!("Staged {} into {}", base_name, dest.display());
    Ok(())
}

fn extract(archive: &Path, dest: &Path, format: ArchiveFormat) -> std::io::Result<()> {
    let file = File::open(archive)?;
    match format {
        ArchiveFormat::TarGz => unpack(GzDecoder::new(file), dest),
        ArchiveFormat::Tar => unpack(file, dest),
    }
}

/// Unpacks regular entries into `dest`
///
/// Links are refused: later stages write through well-known names in `dest`
/// and must never reach outside it.
fn unpack<R: Read>(reader: R, dest: &Path) -> std::io::Result<()> {
    let mut archive = tar::Archive::new(reader);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let kind = entry.header().entry_type();
        let path = entry.path()?.display().to_string();

        if kind.is_symlink() || kind.is_hard_link() {
            return Err(invalid_entry(format!("links are not allowed: {}", path)));
        }

        if !entry.unpack_in(dest)? {
            return Err(invalid_entry(format!("entry escapes the archive root: {}", path)));
        }
    }

    Ok(())
}

fn invalid_entry(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, message)
}
