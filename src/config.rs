//! Command line arguments and the run configuration built from them

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::Result;
use crate::job::template::TemplateSource;
use crate::platform::ExecutionPlatform;

pub const DEFAULT_URL: &str = "https://cloudos.lifebit.ai";
pub const DEFAULT_PROJECT: &str = "API jobs";
pub const DEFAULT_WORKFLOW: &str = "Biobank scanner";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Launch the PHESANT (Biobank scanner) pipeline as a CloudOS job
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Personal CloudOS API key. Found on the workspace or personal settings page, 'Lifebit API' tab
    #[arg(short = 'H', long = "apikey")]
    pub apikey: String,

    /// CloudOS workspace id. If not specified the personal workspace is used
    #[arg(short = 'w', long = "workspace_id")]
    pub workspace_id: Option<String>,

    /// CloudOS url
    #[arg(short = 'u', long = "url", default_value = DEFAULT_URL)]
    pub url: String,

    /// Workspace project name
    #[arg(short = 'p', long = "project_name", default_value = DEFAULT_PROJECT)]
    pub project_name: String,

    /// Workflow name. Change if the workflow has a different name in a custom workspace
    #[arg(long = "workflow_name", visible_alias = "workflow", default_value = DEFAULT_WORKFLOW)]
    pub workflow_name: String,

    /// JSON job template with pipeline parameters and compute profile (default: PHESANT example inputs)
    #[arg(short = 't', long = "template")]
    pub template: Option<PathBuf>,

    /// Job name shown in CloudOS (default: "<workflow name> API")
    #[arg(long = "job_name")]
    pub job_name: Option<String>,

    /// Override the template's execution platform
    #[arg(long = "execution_platform", value_enum)]
    pub execution_platform: Option<ExecutionPlatform>,

    /// Timeout for each request to CloudOS, in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Resolve the project and workflow and print the job, but don't submit it
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a run needs, built once from the command line and passed around
#[derive(Clone)]
pub struct RunConfig {
    pub base_url: Url,
    pub api_key: String,
    /// Team id, `None` means the personal workspace
    pub workspace: Option<String>,
    pub project_name: String,
    pub workflow_name: String,
    pub job_name: String,
    pub template: TemplateSource,
    pub execution_platform: Option<ExecutionPlatform>,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl RunConfig {
    pub fn from_args(args: Args) -> Result<RunConfig> {
        let base_url = Url::parse(args.url.trim_end_matches('/'))?;
        let workspace = args.workspace_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        let job_name = args.job_name.unwrap_or_else(|| format!("{} API", args.workflow_name));

        Ok(RunConfig {
            base_url,
            api_key: args.apikey,
            workspace,
            project_name: args.project_name,
            workflow_name: args.workflow_name,
            job_name,
            template: TemplateSource::from_option(args.template),
            execution_platform: args.execution_platform,
            timeout: Duration::from_secs(args.timeout),
            dry_run: args.dry_run,
        })
    }
}

// the api key must never end up in logs
impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("workspace", &self.workspace)
            .field("project_name", &self.project_name)
            .field("workflow_name", &self.workflow_name)
            .field("job_name", &self.job_name)
            .field("template", &self.template)
            .field("execution_platform", &self.execution_platform)
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}
