//! # Services
//!
//! Namespace-scoped operations composed from the partition and bulk layers.

pub mod job_transfer;

pub use job_transfer::{ImportSummary, JobTransferService};
