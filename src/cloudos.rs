//! Talk to the CloudOS REST API
//!
//! Three requests make up a run, always in this order and never retried:
//! - list projects and pick the one with the requested name
//! - list workflows and pick the one with the requested name
//! - POST a job referencing both

/// HTTP plumbing shared by every request: endpoints, authentication, status and body checks
pub mod client;

/// Turn human readable project and workflow names into CloudOS ids
pub mod resolve;

/// Create a job. Not idempotent, every call creates a new job
pub mod submit;

pub use client::CloudOsClient;
