//! Init command handler
//!
//! Scaffolds a job directory the orchestrator can deploy: a `config.json`
//! manifest and an `index.js` entry module.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::*;
use quartz_core::dto::job::JobConfig;

const INDEX_JS: &str = r#"// Runs on every tick of the schedule in config.json.
module.exports = async () => {
  console.log(`hello from ${require("./config.json").name}`);
};
"#;

/// Creates `config.json` and `index.js` in `dir`
pub async fn scaffold_job(dir: &str, name: Option<String>, force: bool) -> Result<()> {
    let dir = Path::new(dir);
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let name = match name {
        Some(name) => name,
        None => default_name(dir)?,
    };

    let config = JobConfig {
        name,
        timezone: "UTC".to_string(),
        schedule: vec!["0 0 * * *".to_string()],
    };
    let manifest = serde_json::to_string_pretty(&config)? + "\n";

    write_new(&dir.join("config.json"), &manifest, force)?;
    write_new(&dir.join("index.js"), INDEX_JS, force)?;

    println!("{}", "✓ Job scaffolded!".green().bold());
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Edit the schedule in config.json");
    println!("  2. Put your job in index.js");
    println!(
        "  3. Run {} to deploy it",
        format!("quartz job deploy {}", dir.display()).cyan()
    );

    Ok(())
}

fn default_name(dir: &Path) -> Result<String> {
    let absolute = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;

    absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Cannot derive a job name from the directory, pass --name")
}

fn write_new(path: &Path, contents: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  {} {}", "Created".green(), path.display());

    Ok(())
}
