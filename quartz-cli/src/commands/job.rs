//! Job command handlers
//!
//! Handles all job-related CLI commands: deploying, listing, viewing
//! details and deleting.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use quartz_client::OrchestratorClient;
use quartz_core::domain::job::Job;

use crate::archive;
use crate::config::Config;
use crate::id_resolver::resolve_job_id;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Deploy a job directory or archive
    Deploy {
        /// Job directory (with config.json at its root) or .tar.gz/.tgz/.tar archive
        path: String,
    },
    /// List all jobs
    List,
    /// Get job details
    Get {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Delete a job and its container
    Delete {
        /// Job ID or unambiguous prefix
        id: String,
    },
}

/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    match command {
        JobCommands::Deploy { path } => deploy_job(&client, &path).await,
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::Delete { id } => delete_job(&client, &id).await,
    }
}

/// Package and deploy a job
async fn deploy_job(client: &OrchestratorClient, path: &str) -> Result<()> {
    let payload = archive::load(Path::new(path))?;

    println!(
        "{} {} ({} bytes)",
        "Uploading".cyan(),
        payload.file_name,
        payload.bytes.len()
    );

    let created = client.deploy_job(payload.file_name, payload.bytes).await?;

    println!("{}", "✓ Job deployed!".green().bold());
    println!("  ID:        {}", created.id.to_string().cyan());
    println!("  Container: {}", created.container_id.dimmed());

    Ok(())
}

/// List all jobs
async fn list_jobs(client: &OrchestratorClient) -> Result<()> {
    let jobs = client.list_jobs().await?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_job_id(client, id).await?;

    let job = client.get_job(uuid).await?;

    print_job_details(&job);

    Ok(())
}

/// Delete a job
async fn delete_job(client: &OrchestratorClient, id: &str) -> Result<()> {
    let uuid = resolve_job_id(client, id).await?;

    client.delete_job(uuid).await?;

    println!("{} {}", "✓ Job deleted:".green().bold(), uuid);

    Ok(())
}

/// Print a job summary
fn print_job_summary(job: &Job) {
    println!("  {} {} {}", "▸".cyan(), job.name.bold(), job.id.to_string().dimmed());
    println!("    Schedule: {}", format_schedule(job).yellow());
    println!("    Timezone: {}", job.timezone);
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.to_string().cyan());
    println!("  Name:      {}", job.name);
    println!("  Timezone:  {}", job.timezone);
    println!("  Container: {}", job.container_id.dimmed());
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated:   {}", job.updated_at.format("%Y-%m-%d %H:%M:%S"));

    println!("\n{}", "Schedule:".bold());
    if job.schedule.is_empty() {
        println!("  {}", "(none, the job never runs)".yellow());
    }
    for cron in &job.schedule {
        println!("  {}", cron.expression.cyan());
    }
}

fn format_schedule(job: &Job) -> String {
    if job.schedule.is_empty() {
        "none".to_string()
    } else {
        job.expressions().join(", ")
    }
}
