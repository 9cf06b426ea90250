use std::fmt;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Cloud provider a CloudOS job executes on
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPlatform {
    Aws,
    Azure
}

impl fmt::Display for ExecutionPlatform {
      fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionPlatform::Aws => write!(f, "aws"),
            ExecutionPlatform::Azure => write!(f, "azure")
        }
    }
}
