//! # Job Stores
//!
//! Backing-store collaborators for the job transfer service: the keyset
//! query, the transaction boundary, and group existence checks.
//!
//! - [`postgres::PgJobStore`]: SQLx/PostgreSQL implementation
//! - [`in_memory::InMemoryJobStore`]: thread-safe implementation for tests and
//!   development

pub mod fetcher;
pub mod in_memory;
pub mod postgres;

use crate::bulk::{TransactionProvider, UnitOfWork};
use crate::context::NamespaceContext;
use crate::error::Result;
use crate::models::{ExportJobFilter, Job, JobRequest};
use async_trait::async_trait;
use std::collections::BTreeSet;

pub use fetcher::JobCursorFetcher;
pub use in_memory::InMemoryJobStore;
pub use postgres::PgJobStore;

/// Read side of a job store plus its transaction boundary
#[async_trait]
pub trait JobStore: TransactionProvider {
    /// Up to `limit` live jobs in the context namespace matching `filter`
    /// with `id > cursor`, ascending by id
    async fn fetch_jobs_after(
        &self,
        ctx: &NamespaceContext,
        filter: &ExportJobFilter,
        cursor: i64,
        limit: u32,
    ) -> Result<Vec<Job>>;
}

/// Write side of a job store, scoped to one open transaction
#[async_trait]
pub trait JobTransaction: UnitOfWork {
    /// The subset of `group_names` with no group configured in `namespace_id`
    async fn missing_groups(
        &mut self,
        namespace_id: &str,
        group_names: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>>;

    async fn insert_job(&mut self, namespace_id: &str, request: &JobRequest) -> Result<Job>;
}
