use log::{info, warn};
use serde_json::Value;

use crate::cloudos::CloudOsClient;
use crate::error::{Error, ResourceKind, Result};

/// Id of the first record whose name is exactly `name`, case included
///
/// Records are read in order and only as far as the first match: a record without a string
/// `name` is skipped, and nothing after the match is looked at. A match with a missing, non-string
/// or empty `_id` resolves to `None`, later records with the same name are not tried.
pub fn find_id_by_name<'a>(records: &'a [Value], name: &str) -> Option<&'a str> {
    records
        .iter()
        .find(|record| record.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|record| record.get("_id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

impl CloudOsClient {
    /// Look up the id of the project or workflow called `name` in the configured workspace
    pub async fn resolve(&self, kind: ResourceKind, name: &str) -> Result<String> {
        info!("Resolving {} '{}'", kind, name);
        let listing: Vec<Value> = self.get_json(kind.collection()).await?;
        info!("CloudOS listed {} {}", listing.len(), kind.collection());

        match find_id_by_name(&listing, name) {
            Some(id) => {
                info!("Resolved {} '{}': {}", kind, name, id);
                Ok(id.to_string())
            }
            None => {
                warn!("No {} called '{}' with an id", kind, name);
                Err(Error::NotFound { kind, name: name.to_string() })
            }
        }
    }

    pub async fn resolve_project(&self, name: &str) -> Result<String> {
        self.resolve(ResourceKind::Project, name).await
    }

    pub async fn resolve_workflow(&self, name: &str) -> Result<String> {
        self.resolve(ResourceKind::Workflow, name).await
    }
}
