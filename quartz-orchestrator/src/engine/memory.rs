//! In-memory container engine used by tests
//!
//! Tracks images and containers in process and records the entries of every
//! build context it receives. Any operation can be made to fail.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use flate2::read::GzDecoder;

use super::{ContainerEngine, EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineOp {
    BuildImage,
    RemoveImage,
    CreateContainer,
    StartContainer,
    StopContainer,
    RemoveContainer,
}

impl EngineOp {
    fn name(self) -> &'static str {
        match self {
            EngineOp::BuildImage => "build",
            EngineOp::RemoveImage => "rmi",
            EngineOp::CreateContainer => "create",
            EngineOp::StartContainer => "start",
            EngineOp::StopContainer => "stop",
            EngineOp::RemoveContainer => "rm",
        }
    }
}

#[derive(Default)]
struct State {
    images: HashSet<String>,
    /// container name -> running
    containers: HashMap<String, bool>,
    /// image tag -> files of the build context it was built from
    contexts: HashMap<String, BTreeMap<String, Vec<u8>>>,
    failures: HashSet<EngineOp>,
    /// operations that take effect and then report failure, like a call
    /// that completes after its deadline
    late_failures: HashSet<EngineOp>,
}

#[derive(Default)]
pub struct InMemoryEngine {
    state: Mutex<State>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of `op` fail
    pub fn fail_on(&self, op: EngineOp) {
        self.state.lock().unwrap().failures.insert(op);
    }

    /// Makes every subsequent call of `op` take effect and then fail
    pub fn fail_after(&self, op: EngineOp) {
        self.state.lock().unwrap().late_failures.insert(op);
    }

    pub fn has_image(&self, tag: &str) -> bool {
        self.state.lock().unwrap().images.contains(tag)
    }

    pub fn has_container(&self, name: &str) -> bool {
        self.state.lock().unwrap().containers.contains_key(name)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .containers
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    pub fn image_count(&self) -> usize {
        self.state.lock().unwrap().images.len()
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().unwrap().containers.len()
    }

    /// Entry paths of the build context an image was built from
    pub fn context_entries(&self, tag: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .contexts
            .get(tag)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Contents of one file of the build context an image was built from
    pub fn context_file(&self, tag: &str, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .contexts
            .get(tag)
            .and_then(|files| files.get(path))
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    fn check(&self, op: EngineOp, target: &str) -> Result<(), EngineError> {
        if self.state.lock().unwrap().failures.contains(&op) {
            return Err(EngineError::CommandFailed {
                operation: op.name(),
                target: target.to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn finish(&self, op: EngineOp, target: &str) -> Result<(), EngineError> {
        if self.state.lock().unwrap().late_failures.contains(&op) {
            return Err(EngineError::TimedOut {
                operation: op.name(),
                target: target.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerEngine for InMemoryEngine {
    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), EngineError> {
        self.check(EngineOp::BuildImage, tag)?;

        let entries = read_context(context)?;
        {
            let mut state = self.state.lock().unwrap();
            state.images.insert(tag.to_string());
            state.contexts.insert(tag.to_string(), entries);
        }
        self.finish(EngineOp::BuildImage, tag)
    }

    async fn remove_image(&self, tag: &str) -> Result<(), EngineError> {
        self.check(EngineOp::RemoveImage, tag)?;
        self.state.lock().unwrap().images.remove(tag);
        Ok(())
    }

    async fn create_container(&self, name: &str, image: &str) -> Result<(), EngineError> {
        self.check(EngineOp::CreateContainer, name)?;

        {
            let mut state = self.state.lock().unwrap();
            if !state.images.contains(image) {
                return Err(EngineError::CommandFailed {
                    operation: "create",
                    target: name.to_string(),
                    stderr: format!("{}: image not known", image),
                });
            }
            state.containers.insert(name.to_string(), false);
        }
        self.finish(EngineOp::CreateContainer, name)
    }

    async fn start_container(&self, name: &str) -> Result<(), EngineError> {
        self.check(EngineOp::StartContainer, name)?;

        let mut state = self.state.lock().unwrap();
        match state.containers.get_mut(name) {
            Some(running) => {
                *running = true;
                Ok(())
            }
            None => Err(EngineError::CommandFailed {
                operation: "start",
                target: name.to_string(),
                stderr: "no such container".to_string(),
            }),
        }
    }

    async fn stop_container(&self, name: &str) -> Result<(), EngineError> {
        self.check(EngineOp::StopContainer, name)?;

        if let Some(running) = self.state.lock().unwrap().containers.get_mut(name) {
            *running = false;
        }
        Ok(())
    }

    async fn remove_container(&self, name: &str) -> Result<(), EngineError> {
        self.check(EngineOp::RemoveContainer, name)?;
        self.state.lock().unwrap().containers.remove(name);
        Ok(())
    }
}

fn read_context(context: &Path) -> Result<BTreeMap<String, Vec<u8>>, EngineError> {
    let invalid = |e: std::io::Error| EngineError::Context(e.to_string());

    let file = File::open(context).map_err(invalid)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let mut files = BTreeMap::new();
    for entry in archive.entries().map_err(invalid)? {
        let mut entry = entry.map_err(invalid)?;
        let path = entry.path().map_err(invalid)?.to_string_lossy().into_owned();

        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(invalid)?;
        files.insert(path, data);
    }

    Ok(files)
}
