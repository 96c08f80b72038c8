//! # Job Transfer Service
//!
//! Export and import of job definitions for one namespace.
//!
//! - **Export** walks the namespace's jobs with the keyset [`BatchProcessor`],
//!   converting each row into a [`JobRequest`] and serializing the whole
//!   accumulation as a JSON array.
//! - **Import** runs through the [`BulkMutator`]: every referenced group must
//!   exist before anything is written, and all jobs are inserted in one
//!   transaction or not at all.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

use crate::bulk::{BulkMutation, BulkMutator};
use crate::config::ExportConfig;
use crate::context::NamespaceContext;
use crate::error::{PartitionError, Result};
use crate::models::{ExportJobFilter, Job, JobRequest};
use crate::partition::{BatchProcessor, FnConsumer, PartitionTask};
use crate::store::{JobCursorFetcher, JobStore, JobTransaction};

/// Result of a committed import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub job_ids: Vec<i64>,
}

pub struct JobTransferService<S> {
    store: S,
    export: ExportConfig,
}

impl<S> JobTransferService<S>
where
    S: JobStore,
    S::Tx: JobTransaction,
{
    pub fn new(store: S, export: ExportConfig) -> Self {
        Self { store, export }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every live job matching `filter`, ascending by id, as import requests
    #[instrument(skip(self, filter), fields(namespace_id = %ctx.namespace_id))]
    pub async fn export_job_requests(
        &self,
        ctx: &NamespaceContext,
        filter: &ExportJobFilter,
    ) -> Result<Vec<JobRequest>> {
        let mut fetcher = JobCursorFetcher::new(&self.store, ctx, filter, self.export.page_size);
        let mut requests = Vec::new();
        let mut sink = FnConsumer::new(|batch: &[PartitionTask<Job>]| -> Result<()> {
            for task in batch {
                requests.push(JobRequest::try_from(task.payload())?);
            }
            Ok(())
        });

        let summary = BatchProcessor::new("export_jobs")
            .process(0, &mut fetcher, &mut sink)
            .await?;

        info!(
            exported = summary.items,
            batches = summary.batches,
            "Exported jobs"
        );

        Ok(requests)
    }

    /// Export as a JSON array of [`JobRequest`]
    pub async fn export_jobs(
        &self,
        ctx: &NamespaceContext,
        filter: &ExportJobFilter,
    ) -> Result<String> {
        let requests = self.export_job_requests(ctx, filter).await?;
        Ok(serde_json::to_string(&requests)?)
    }

    /// Insert every request or none of them
    #[instrument(
        skip(self, requests),
        fields(namespace_id = %ctx.namespace_id, requests = requests.len())
    )]
    pub async fn import_jobs(
        &self,
        ctx: &NamespaceContext,
        requests: &[JobRequest],
    ) -> Result<ImportSummary> {
        let importer = JobImporter { ctx };
        let jobs = BulkMutator::new("import_jobs")
            .apply_all(&self.store, &importer, requests)
            .await?;

        let summary = ImportSummary {
            imported: jobs.len(),
            job_ids: jobs.iter().map(|job| job.id).collect(),
        };
        info!(
            imported = summary.imported,
            operator = ctx.operator.as_deref(),
            "Imported jobs"
        );
        Ok(summary)
    }

    /// Parse a JSON array of [`JobRequest`] and import it
    pub async fn import_jobs_json(
        &self,
        ctx: &NamespaceContext,
        json: &str,
    ) -> Result<ImportSummary> {
        let requests: Vec<JobRequest> = serde_json::from_str(json)?;
        self.import_jobs(ctx, &requests).await
    }
}

/// Validates group existence across the whole import, then inserts each job
struct JobImporter<'a> {
    ctx: &'a NamespaceContext,
}

#[async_trait]
impl<'a, Tx> BulkMutation<Tx, JobRequest> for JobImporter<'a>
where
    Tx: JobTransaction,
{
    type Output = Job;

    async fn validate(&self, tx: &mut Tx, requests: &[JobRequest]) -> Result<()> {
        let group_names: BTreeSet<String> = requests
            .iter()
            .map(|request| request.group_name.clone())
            .collect();

        let missing = tx
            .missing_groups(&self.ctx.namespace_id, &group_names)
            .await?;

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PartitionError::validation(
                missing,
                self.ctx.namespace_id.clone(),
            ))
        }
    }

    async fn apply(&self, tx: &mut Tx, index: usize, request: &JobRequest) -> Result<Job> {
        request.validate(index)?;
        tx.insert_job(&self.ctx.namespace_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryJobStore;

    fn request(group: &str, name: &str) -> JobRequest {
        serde_json::from_value(serde_json::json!({
            "groupName": group,
            "jobName": name,
            "jobStatus": 1,
            "executorInfo": "testExecutor",
            "triggerType": 2,
            "triggerInterval": "30"
        }))
        .unwrap()
    }

    fn service() -> JobTransferService<InMemoryJobStore> {
        JobTransferService::new(InMemoryJobStore::new(), ExportConfig { page_size: 2 })
    }

    #[tokio::test]
    async fn test_export_serializes_json_array() {
        let service = service();
        service.store().seed_job("ns", &request("billing", "invoice"));

        let json = service
            .export_jobs(&NamespaceContext::new("ns"), &ExportJobFilter::default())
            .await
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["groupName"], "billing");
        assert_eq!(parsed[0]["jobName"], "invoice");
        assert!(parsed[0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_import_reports_all_missing_groups_sorted() {
        let service = service();
        service.store().add_group("ns", "billing");

        let requests = vec![
            request("zeta", "a"),
            request("billing", "b"),
            request("alpha", "c"),
        ];
        let err = service
            .import_jobs(&NamespaceContext::new("ns"), &requests)
            .await
            .unwrap_err();

        match err {
            PartitionError::Validation { missing, scope } => {
                assert_eq!(missing, vec!["alpha".to_string(), "zeta".to_string()]);
                assert_eq!(scope, "ns");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.store().job_count(), 0);
    }

    #[tokio::test]
    async fn test_import_json_round_trips_through_export() {
        let source = service();
        source.store().add_group("src", "billing");
        source.store().seed_job("src", &request("billing", "invoice"));
        source.store().seed_job("src", &request("billing", "refund"));

        let json = source
            .export_jobs(&NamespaceContext::new("src"), &ExportJobFilter::default())
            .await
            .unwrap();

        let target = service();
        target.store().add_group("dst", "billing");
        let summary = target
            .import_jobs_json(&NamespaceContext::new("dst"), &json)
            .await
            .unwrap();

        assert_eq!(summary.imported, 2);
        let names: Vec<String> = target.store().jobs().into_iter().map(|j| j.job_name).collect();
        assert_eq!(names, vec!["invoice", "refund"]);
    }

    #[tokio::test]
    async fn test_export_fails_on_unknown_stored_status() {
        let service = service();
        service.store().seed_job("ns", &request("billing", "invoice"));
        let broken = service.store().seed_job("ns", &request("billing", "refund"));
        service.store().set_raw_status(broken.id, 2);

        let err = service
            .export_jobs(&NamespaceContext::new("ns"), &ExportJobFilter::default())
            .await
            .unwrap_err();

        match err {
            PartitionError::Consume { message } => {
                assert!(message.contains("Unknown job status: 2"), "{message}");
            }
            other => panic!("expected consume error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_json() {
        let err = service()
            .import_jobs_json(&NamespaceContext::new("ns"), "{not json")
            .await
            .unwrap_err();
        assert!(matches!(err, PartitionError::Serialization(_)));
    }
}
