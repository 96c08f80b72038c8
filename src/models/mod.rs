//! # Models
//!
//! Row and request shapes for the job store.

pub mod job;

pub use job::{ExportJobFilter, Job, JobRequest, JobStatus};
