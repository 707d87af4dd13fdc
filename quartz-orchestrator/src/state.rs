//! Shared application state handed to every handler

use std::sync::Arc;

use crate::repository::JobRepository;
use crate::service::{Deployer, Teardown};

#[derive(Clone)]
pub struct AppState {
    pub deployer: Arc<Deployer>,
    pub teardown: Arc<Teardown>,
    pub jobs: Arc<dyn JobRepository>,
}
