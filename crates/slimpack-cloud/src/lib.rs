//! AWS Lambda publishing for slimpack archives.
//!
//! The archive produced by `slimpack-build` is uploaded once per configured
//! function. Uploads run concurrently and independently: one function
//! failing never cancels the others, and every outcome is reported.

pub mod aws;
pub mod client;
pub mod executor;

pub use aws::AwsError;
pub use client::{LambdaClient, PublishError, PublishOutcome, PublishReport};
pub use executor::{AwsExecutor, RealExecutor};
