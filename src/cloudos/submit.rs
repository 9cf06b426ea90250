use log::info;

use crate::cloudos::CloudOsClient;
use crate::error::{Error, Result};
use crate::job::payload::{JobCreated, JobSubmission};

impl CloudOsClient {
    /// POST a job and return its id, which is never empty
    ///
    /// Nothing stops the same submission from being sent twice: CloudOS creates a new job for
    /// every request, so callers must not retry this blindly.
    pub async fn submit_job(&self, submission: &JobSubmission) -> Result<String> {
        info!(
            "Submitting job '{}' (project {}, workflow {}, {} parameters)",
            submission.name,
            submission.project,
            submission.workflow,
            submission.parameters.len()
        );
        let created: JobCreated = self.post_json("jobs", submission).await?;
        if created.id.is_empty() {
            return Err(Error::MalformedResponse {
                endpoint: self.endpoint("jobs")?.to_string(),
                reason: "job id (_id) is empty".to_string(),
            });
        }
        info!("CloudOS job id: {}", created.id);
        Ok(created.id)
    }
}
