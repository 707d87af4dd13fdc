//! Deployment pipeline stages
//!
//! Each stage works on a per-request staging directory and returns a
//! [`crate::error::Result`]. The stages are sequenced, and compensated on
//! failure, by [`crate::service::deploy::Deployer`].
//!
//! Data flows one way: stager -> template -> schedule -> package.

pub mod package;
pub mod schedule;
pub mod stager;
pub mod template;

use std::path::Path;

/// Removes `path` if it is a symlink, so the next write creates a regular
/// file instead of following the link
pub(crate) async fn unlink_if_symlink(path: &Path) -> std::io::Result<()> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.file_type().is_symlink() => tokio::fs::remove_file(path).await,
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
