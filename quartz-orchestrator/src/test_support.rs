//! Fixtures shared by unit tests: archive builders, a runtime template on
//! disk and a fully wired deployer over in-memory collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::engine::memory::InMemoryEngine;
use crate::pipeline::template::RuntimeTemplate;
use crate::repository::memory::InMemoryJobRepository;
use crate::service::deploy::{Deployer, Upload};
use crate::service::teardown::Teardown;

pub const RECIPE: &str = "FROM node:20-alpine\nWORKDIR /app\nCOPY . /app\n";
pub const ENTRYPOINT: &str = "require(\"./index.js\");\n";

fn append_files<W: std::io::Write>(builder: &mut tar::Builder<W>, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .unwrap();
    }
}

/// Plain tar archive holding `files`
pub fn tar_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    append_files(&mut builder, files);
    builder.into_inner().unwrap()
}

/// Gzip-compressed tar archive holding `files`
pub fn tar_gz_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append_files(&mut builder, files);
    builder.into_inner().unwrap().finish().unwrap()
}

/// Link entry for [`tar_gz_with_links`]
pub struct LinkEntry {
    kind: tar::EntryType,
    path: String,
    target: PathBuf,
}

pub fn link_entry(kind: tar::EntryType, path: &str, target: &Path) -> LinkEntry {
    LinkEntry {
        kind,
        path: path.to_string(),
        target: target.to_path_buf(),
    }
}

/// Gzip-compressed tar archive holding `files` followed by `links`
pub fn tar_gz_with_links(files: &[(&str, &str)], links: &[LinkEntry]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append_files(&mut builder, files);

    for link in links {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(link.kind);
        header.set_size(0);
        header.set_mode(0o777);
        header.set_link_name(&link.target).unwrap();
        header.set_cksum();
        builder
            .append_data(&mut header, &link.path, std::io::empty())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Writes template assets into `dir` and returns a template pointing at them
pub fn write_template(dir: &Path) -> RuntimeTemplate {
    std::fs::write(dir.join("Dockerfile"), RECIPE).unwrap();
    std::fs::write(dir.join("entry.js"), ENTRYPOINT).unwrap();

    RuntimeTemplate {
        dir: dir.to_path_buf(),
        ..RuntimeTemplate::default()
    }
}

/// Upload of a job archive with the given manifest
pub fn job_upload(config: &str) -> Upload {
    Upload {
        file_name: "job.tar.gz".to_string(),
        bytes: tar_gz_bytes(&[("config.json", config), ("index.js", "console.log(1)")]),
    }
}

/// Deployer wired to in-memory collaborators inside a temporary directory
pub struct Harness {
    pub engine: Arc<InMemoryEngine>,
    pub jobs: Arc<InMemoryJobRepository>,
    pub deployer: Deployer,
    pub teardown: Arc<Teardown>,
    pub staging: PathBuf,
    _root: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let assets = root.path().join("template");
        std::fs::create_dir(&assets).unwrap();
        let template = write_template(&assets);
        Self::with_template(root, template)
    }

    pub fn with_template(root: tempfile::TempDir, template: RuntimeTemplate) -> Self {
        let staging = root.path().join("staging");
        let engine = Arc::new(InMemoryEngine::new());
        let jobs = Arc::new(InMemoryJobRepository::new());
        let teardown = Arc::new(Teardown::new(engine.clone(), jobs.clone()));
        let deployer = Deployer::new(
            engine.clone(),
            jobs.clone(),
            teardown.clone(),
            staging.clone(),
            template,
        );

        Self {
            engine,
            jobs,
            deployer,
            teardown,
            staging,
            _root: root,
        }
    }

    /// Number of entries left in the staging root
    pub fn staged_entries(&self) -> usize {
        match std::fs::read_dir(&self.staging) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}
