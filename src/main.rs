use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use cloudos_phesant::config::{Args, RunConfig};
use cloudos_phesant::Outcome;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("starting up");

    let args = Args::parse();
    let config = RunConfig::from_args(args)?;
    debug!("{:?}", config);

    let outcome = cloudos_phesant::run(&config).await?;
    println!("Project '{}': {}", config.project_name, outcome.project_id());
    println!("Workflow '{}': {}", config.workflow_name, outcome.workflow_id());

    match outcome {
        Outcome::Submitted { job_id, status_url, .. } => {
            info!("Submitted job {}", job_id);
            println!("Job successfully sent to CloudOS. You can check the status of the job in {}", status_url);
        }
        Outcome::DryRun { submission } => {
            let json = serde_json::to_string_pretty(&submission).context("Serialising job submission")?;
            println!("{}", json);
        }
    }

    Ok(())
}
