use serde::{Deserialize, Serialize};

use crate::job::template::{JobTemplate, ParameterSource, ParameterSpec};
use crate::platform::ExecutionPlatform;

/// Body of `POST /api/v1/jobs`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub parameters: Vec<WorkflowParameter>,
    pub project: String,
    pub workflow: String,
    pub name: String,
    pub execution_platform: ExecutionPlatform,
    pub execution: Execution,
    pub instance_type: String,
    pub master_instance: MasterInstance,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub compute_cost_limit: i64,
    pub optim: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterInstance {
    pub requested_instance: RequestedInstance,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestedInstance {
    #[serde(rename = "type")]
    pub instance_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowParameter {
    pub prefix: String,
    pub name: String,
    #[serde(flatten)]
    pub value: ParameterValue,
}

/// A file reference or a literal, told apart on the wire by which keys are present
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    File {
        #[serde(rename = "dataItemEmbedded")]
        data_item: DataItem,
    },
    Text {
        #[serde(rename = "parameterKind")]
        kind: ParameterKind,
        #[serde(rename = "textValue")]
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum DataItem {
    S3File(S3Object),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct S3Object {
    pub name: String,
    #[serde(rename = "s3BucketName")]
    pub bucket: String,
    #[serde(rename = "s3ObjectKey")]
    pub key: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ParameterKind {
    #[serde(rename = "textValue")]
    TextValue,
}

/// Response of `POST /api/v1/jobs`, only the id is used
#[derive(Debug, Deserialize)]
pub struct JobCreated {
    #[serde(rename = "_id")]
    pub id: String,
}

impl JobSubmission {
    pub fn new(template: &JobTemplate, project_id: &str, workflow_id: &str, name: &str) -> JobSubmission {
        JobSubmission {
            parameters: template.parameters.iter().map(WorkflowParameter::from).collect(),
            project: project_id.to_string(),
            workflow: workflow_id.to_string(),
            name: name.to_string(),
            execution_platform: template.execution_platform,
            execution: Execution {
                compute_cost_limit: template.compute_cost_limit,
                optim: template.optim.clone(),
            },
            instance_type: template.instance_type.clone(),
            master_instance: MasterInstance {
                requested_instance: RequestedInstance { instance_type: template.instance_type.clone() },
            },
        }
    }
}

impl From<&ParameterSpec> for WorkflowParameter {
    fn from(spec: &ParameterSpec) -> Self {
        let value = match &spec.source {
            ParameterSource::S3File { file_name, bucket, key } => ParameterValue::File {
                data_item: DataItem::S3File(S3Object {
                    name: file_name.clone(),
                    bucket: bucket.clone(),
                    key: key.clone(),
                }),
            },
            ParameterSource::Text { value } => ParameterValue::Text {
                kind: ParameterKind::TextValue,
                text: value.clone(),
            },
        };
        WorkflowParameter { prefix: spec.prefix.clone(), name: spec.name.clone(), value }
    }
}
