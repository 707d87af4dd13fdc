//! Container engine
//!
//! Capability interface over the engine that builds images and runs
//! containers. Names passed in are deployment request tokens, which double
//! as image tags and container names.
//!
//! Removal and stop operations treat a missing resource as success, so a
//! teardown can be replayed safely after a partial deployment.

#[cfg(test)]
pub mod memory;
pub mod podman;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use podman::PodmanEngine;

/// Errors reported by a container engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable could not be launched
    #[error("failed to run container engine for {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but reported a failure
    #[error("container engine {operation} failed for {target}: {stderr}")]
    CommandFailed {
        operation: &'static str,
        target: String,
        stderr: String,
    },

    /// The engine did not answer before the configured deadline
    #[error("container engine {operation} timed out for {target}")]
    TimedOut {
        operation: &'static str,
        target: String,
    },

    /// The build context could not be prepared for the engine
    #[error("invalid build context: {0}")]
    Context(String),
}

/// Operations the deployment pipeline needs from a container engine
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Builds an image tagged `tag` from a gzip-compressed tar build context
    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), EngineError>;

    /// Force-removes an image; a missing image is not an error
    async fn remove_image(&self, tag: &str) -> Result<(), EngineError>;

    /// Creates a container called `name` from `image`
    async fn create_container(&self, name: &str, image: &str) -> Result<(), EngineError>;

    /// Starts a previously created container
    async fn start_container(&self, name: &str) -> Result<(), EngineError>;

    /// Stops a container; a missing container is not an error
    async fn stop_container(&self, name: &str) -> Result<(), EngineError>;

    /// Force-removes a container; a missing container is not an error
    async fn remove_container(&self, name: &str) -> Result<(), EngineError>;
}
