use std::fmt;

use thiserror::Error;

/// The two kinds of named CloudOS resource that get resolved to an id
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Workflow,
}

impl ResourceKind {
    /// Collection name under `/api/v1/`
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Project => "projects",
            ResourceKind::Workflow => "workflows",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceKind::Project => write!(f, "project"),
            ResourceKind::Workflow => write!(f, "workflow"),
        }
    }
}

/// Problems with a job template, before anything is sent to CloudOS
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("can't read job template at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("job template is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("job template fails validation: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("job template can't be deserialised: {0}")]
    Deserialisation(#[source] serde_json::Error),
}

/// Every way a run can abort. Nothing is retried, the first error ends the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} id couldn't be found. Check that you provided a valid {kind} name ('{name}')", capitalise(.kind))]
    NotFound { kind: ResourceKind, name: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid CloudOS url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn capitalise(kind: &ResourceKind) -> String {
    let label = kind.to_string();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}
