//! Launch the PHESANT (Biobank scanner) pipeline on CloudOS
//!
//! A run resolves a project and a workflow by name, then submits a job built from a
//! [`job::template::JobTemplate`] and reports where to follow it.

use log::{info, warn};

use crate::cloudos::CloudOsClient;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::job::payload::JobSubmission;
use crate::state::RunState;

/// Command line arguments and the run configuration
pub mod config;
/// Error taxonomy for a run
pub mod error;
/// Execution platform tag
pub mod platform;
/// Linear run progress, used for logging
pub mod state;
/// CloudOS REST API client
pub mod cloudos;
/// Job templates and the job submission payload
pub mod job;

/// How a successful run ended
#[derive(Debug)]
pub enum Outcome {
    Submitted {
        project_id: String,
        workflow_id: String,
        job_id: String,
        status_url: String,
    },
    /// --dry-run: everything resolved, nothing created
    DryRun { submission: JobSubmission },
}

impl Outcome {
    pub fn project_id(&self) -> &str {
        match self {
            Outcome::Submitted { project_id, .. } => project_id,
            Outcome::DryRun { submission } => &submission.project,
        }
    }

    pub fn workflow_id(&self) -> &str {
        match self {
            Outcome::Submitted { workflow_id, .. } => workflow_id,
            Outcome::DryRun { submission } => &submission.workflow,
        }
    }
}

/// Resolve, build, submit. The first error aborts the run.
pub async fn run(config: &RunConfig) -> Result<Outcome> {
    let mut state = RunState::Start;

    let mut template = config.template.read().map_err(Error::from).inspect_err(|_| abort(state))?;
    if let Some(platform) = config.execution_platform {
        info!("Overriding execution platform with {}", platform);
        template.execution_platform = platform;
    }

    let client = CloudOsClient::new(config).inspect_err(|_| abort(state))?;

    let project_id = client
        .resolve_project(&config.project_name)
        .await
        .inspect_err(|_| abort(state))?;
    state = advance(state);

    let workflow_id = client
        .resolve_workflow(&config.workflow_name)
        .await
        .inspect_err(|_| abort(state))?;
    state = advance(state);

    let submission = JobSubmission::new(&template, &project_id, &workflow_id, &config.job_name);
    if config.dry_run {
        info!("--dry-run set, not submitting job");
        return Ok(Outcome::DryRun { submission });
    }

    let job_id = client.submit_job(&submission).await.inspect_err(|_| abort(state))?;
    state = advance(state);

    let status_url = client.job_status_url(&job_id);
    advance(state);
    Ok(Outcome::Submitted { project_id, workflow_id, job_id, status_url })
}

fn advance(state: RunState) -> RunState {
    let next = state.next().unwrap_or(state);
    info!("Run state: {} -> {}", state.as_str(), next.as_str());
    next
}

fn abort(state: RunState) {
    warn!("Run state: {} -> {}", state.as_str(), RunState::Aborted.as_str());
}
