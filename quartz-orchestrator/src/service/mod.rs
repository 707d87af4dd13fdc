//! Service Module
//!
//! Business logic layer for the orchestrator. Services sequence the
//! pipeline stages and coordinate the container engine with the registry.

pub mod deploy;
pub mod job;
pub mod teardown;

// Re-export for convenience
pub use deploy::{Deployer, Upload};
pub use job as job_service;
pub use teardown::Teardown;
