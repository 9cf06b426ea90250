//! Describe the CloudOS job that gets submitted

/// Declarative job templates: which inputs a pipeline gets and on what hardware
pub mod template;

/// The JSON body POSTed to the CloudOS jobs endpoint
pub mod payload;
