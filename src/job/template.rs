use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TemplateError;
use crate::platform::ExecutionPlatform;

/// included PHESANT (Biobank scanner) template, used when no --template is given
static PHESANT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/phesant.json"));

/// included JSON schema every template is validated against
static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/job_template.json"));

/// Everything about a job that isn't resolved at run time
///
/// A template pins the pipeline inputs and the compute profile. Project id, workflow id and job
/// name are filled in later, see [`crate::job::payload::JobSubmission::new`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobTemplate {
    pub execution_platform: ExecutionPlatform,
    pub instance_type: String,
    /// -1 means no cost limit
    pub compute_cost_limit: i64,
    pub optim: String,
    /// Order is preserved in the submitted job
    pub parameters: Vec<ParameterSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(flatten)]
    pub source: ParameterSource,
}

/// Where a parameter's value comes from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSource {
    /// An object already stored in a bucket
    S3File { file_name: String, bucket: String, key: String },
    /// A literal passed straight through to the pipeline
    Text { value: String },
}

fn default_prefix() -> String {
    "--".to_string()
}

/// Where to read a template from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    File(PathBuf),
}

impl TemplateSource {
    pub fn from_option(path: Option<PathBuf>) -> TemplateSource {
        match path {
            Some(path) => TemplateSource::File(path),
            None => TemplateSource::Embedded,
        }
    }

    /// Read, validate, then deserialise a template
    pub fn read(&self) -> Result<JobTemplate, TemplateError> {
        let json: Value = self.parse_untyped_json()?;

        match validate(&json) {
            Ok(_) => {
                info!("Job template is valid");
                parse_json(json)
            }
            Err(err) => {
                warn!("Job template fails validation");
                Err(err)
            }
        }
    }

    fn read_string(&self) -> Result<String, TemplateError> {
        match self {
            TemplateSource::Embedded => {
                info!("Using embedded PHESANT job template");
                Ok(PHESANT.to_string())
            }
            TemplateSource::File(path) => read_file(path),
        }
    }

    fn parse_untyped_json(&self) -> Result<Value, TemplateError> {
        let json_string = self.read_string()?;
        serde_json::from_str::<Value>(&json_string).map_err(TemplateError::Decode)
    }
}

fn read_file(path: &Path) -> Result<String, TemplateError> {
    info!("Reading job template at {}", path.display());
    fs::read_to_string(path).map_err(|source| {
        warn!("Can't read job template at path {}: {}", path.display(), source);
        TemplateError::Read { path: path.display().to_string(), source }
    })
}

fn validate(json: &Value) -> Result<(), TemplateError> {
    info!("Validating job template against JSON schema");
    let schema: Value = serde_json::from_str(SCHEMA).map_err(TemplateError::Decode)?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| TemplateError::Validation(vec![format!("embedded schema doesn't compile: {err}")]))?;

    let result = compiled.validate(json);
    match result {
        Ok(_) => Ok(()),
        Err(errors) => {
            let problems = errors
                .map(|err| format!("{} at '{}'", err, err.instance_path))
                .collect();
            Err(TemplateError::Validation(problems))
        }
    }
}

fn parse_json(value: Value) -> Result<JobTemplate, TemplateError> {
    info!("Deserialising valid JSON into a job template");
    serde_json::from_value::<JobTemplate>(value).map_err(TemplateError::Deserialisation)
}
