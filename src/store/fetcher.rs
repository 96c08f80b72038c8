use super::JobStore;
use crate::context::NamespaceContext;
use crate::error::{PartitionError, Result};
use crate::models::{ExportJobFilter, Job};
use crate::partition::{CursorFetcher, PartitionTask};
use async_trait::async_trait;
use tracing::debug;

/// Keyset fetcher over one namespace's jobs: "next `page_size` jobs with
/// id > cursor"
pub struct JobCursorFetcher<'a, S: ?Sized> {
    store: &'a S,
    ctx: &'a NamespaceContext,
    filter: &'a ExportJobFilter,
    page_size: u32,
}

impl<'a, S: JobStore + ?Sized> JobCursorFetcher<'a, S> {
    pub fn new(
        store: &'a S,
        ctx: &'a NamespaceContext,
        filter: &'a ExportJobFilter,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            ctx,
            filter,
            page_size,
        }
    }
}

#[async_trait]
impl<'a, S: JobStore + ?Sized> CursorFetcher<PartitionTask<Job>> for JobCursorFetcher<'a, S> {
    async fn fetch(&mut self, cursor: i64) -> Result<Vec<PartitionTask<Job>>> {
        let jobs = self
            .store
            .fetch_jobs_after(self.ctx, self.filter, cursor, self.page_size)
            .await
            .map_err(|e| match e {
                PartitionError::Fetch { .. } => e,
                other => PartitionError::fetch(other.to_string()),
            })?;

        debug!(
            namespace_id = %self.ctx.namespace_id,
            cursor = cursor,
            fetched = jobs.len(),
            "Fetched job page"
        );

        Ok(jobs
            .into_iter()
            .map(|job| PartitionTask::from_keyed(job, |job| job.id))
            .collect())
    }
}
