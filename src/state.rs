/// Progress of a single run.
///
/// A run only ever moves forward: Start -> ProjectResolved -> WorkflowResolved -> JobSubmitted ->
/// Done. Any error moves the run to Aborted from whichever state it reached; there is no recovery.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    Start,
    ProjectResolved,
    WorkflowResolved,
    JobSubmitted,
    Done,
    Aborted,
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            RunState::Start => "start",
            RunState::ProjectResolved => "project resolved",
            RunState::WorkflowResolved => "workflow resolved",
            RunState::JobSubmitted => "job submitted",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
        }
    }

    /// The state that follows this one, `None` once the run is done
    pub fn next(&self) -> Option<RunState> {
        match self {
            RunState::Start => Some(RunState::ProjectResolved),
            RunState::ProjectResolved => Some(RunState::WorkflowResolved),
            RunState::WorkflowResolved => Some(RunState::JobSubmitted),
            RunState::JobSubmitted => Some(RunState::Done),
            RunState::Done | RunState::Aborted => None,
        }
    }
}
