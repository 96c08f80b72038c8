//! # In-Memory Job Store
//!
//! Thread-safe in-memory store for testing and development.
//!
//! ## Features
//!
//! - **Append-only ids**: ids are handed out from a counter and never reused,
//!   including ids allocated by rolled-back transactions
//! - **Staged transactions**: inserts become visible only on commit
//! - **Failure injection**: fail the n-th fetch to exercise error paths

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use super::{JobStore, JobTransaction};
use crate::bulk::{TransactionProvider, UnitOfWork};
use crate::context::NamespaceContext;
use crate::error::{PartitionError, Result};
use crate::models::job::DEFAULT_BUCKET_TOTAL;
use crate::models::{ExportJobFilter, Job, JobRequest};

#[derive(Debug, Default)]
struct InMemoryState {
    jobs: BTreeMap<i64, Job>,
    /// (namespace_id, group_name)
    groups: BTreeSet<(String, String)>,
    last_id: i64,
}

impl InMemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory job store
///
/// ```rust
/// use partition_core::store::{InMemoryJobStore, JobStore};
/// use partition_core::{ExportJobFilter, NamespaceContext};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryJobStore::new();
/// store.add_group("ns", "billing");
///
/// let ctx = NamespaceContext::new("ns");
/// let jobs = store
///     .fetch_jobs_after(&ctx, &ExportJobFilter::default(), 0, 100)
///     .await
///     .unwrap();
/// assert!(jobs.is_empty());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    state: Arc<RwLock<InMemoryState>>,
    fetch_calls: AtomicUsize,
    /// 1-based fetch call number that should fail
    fail_fetch_on: Mutex<Option<usize>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group so imports referencing it validate
    pub fn add_group(&self, namespace_id: &str, group_name: &str) {
        self.state
            .write()
            .groups
            .insert((namespace_id.to_string(), group_name.to_string()));
    }

    /// Insert a committed job directly, bypassing validation
    pub fn seed_job(&self, namespace_id: &str, request: &JobRequest) -> Job {
        let mut state = self.state.write();
        let id = state.allocate_id();
        let job = build_job(id, namespace_id, request);
        state.jobs.insert(id, job.clone());
        job
    }

    /// Mark a job deleted; it stays in storage but is excluded from fetches
    pub fn soft_delete(&self, id: i64) -> bool {
        match self.state.write().jobs.get_mut(&id) {
            Some(job) => {
                job.deleted = 1;
                true
            }
            None => false,
        }
    }

    /// Overwrite the stored status code without going through [`JobStatus`]
    ///
    /// [`JobStatus`]: crate::models::JobStatus
    pub fn set_raw_status(&self, id: i64, job_status: i16) -> bool {
        match self.state.write().jobs.get_mut(&id) {
            Some(job) => {
                job.job_status = job_status;
                true
            }
            None => false,
        }
    }

    /// Remove a job entirely
    pub fn remove_job(&self, id: i64) -> Option<Job> {
        self.state.write().jobs.remove(&id)
    }

    /// All stored jobs, including deleted ones, ascending by id
    pub fn jobs(&self) -> Vec<Job> {
        self.state.read().jobs.values().cloned().collect()
    }

    pub fn job_count(&self) -> usize {
        self.state.read().jobs.len()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Make the `call_number`-th fetch (1-based, counted from now) fail
    pub fn fail_fetch_on(&self, call_number: usize) {
        let base = self.fetch_calls();
        *self.fail_fetch_on.lock() = Some(base + call_number);
    }

    pub fn clear_fetch_failure(&self) {
        *self.fail_fetch_on.lock() = None;
    }
}

fn build_job(id: i64, namespace_id: &str, request: &JobRequest) -> Job {
    let now = Utc::now().naive_utc();
    Job {
        id,
        namespace_id: namespace_id.to_string(),
        group_name: request.group_name.clone(),
        job_name: request.job_name.trim().to_string(),
        args_str: request.args_str.clone(),
        args_type: request.args_type,
        job_status: i16::from(request.job_status),
        task_type: request.task_type,
        route_key: request.route_key,
        executor_type: request.executor_type,
        executor_info: request.executor_info.clone(),
        trigger_type: request.trigger_type,
        trigger_interval: request.trigger_interval.clone(),
        block_strategy: request.block_strategy,
        executor_timeout: request.executor_timeout,
        max_retry_times: request.max_retry_times,
        parallel_num: request.parallel_num,
        retry_interval: request.retry_interval,
        bucket_index: request.bucket_index(DEFAULT_BUCKET_TOTAL),
        resident: request.resident,
        notify_ids: request.notify_ids.clone(),
        owner_id: request.owner_id,
        labels: request.labels.clone(),
        description: request.description.clone(),
        ext_attrs: None,
        deleted: 0,
        create_dt: now,
        update_dt: now,
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn fetch_jobs_after(
        &self,
        ctx: &NamespaceContext,
        filter: &ExportJobFilter,
        cursor: i64,
        limit: u32,
    ) -> Result<Vec<Job>> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_fetch_on.lock() == Some(call) {
            return Err(PartitionError::fetch(format!(
                "injected failure on fetch call {call}"
            )));
        }

        let state = self.state.read();
        let jobs = state
            .jobs
            .range(cursor.saturating_add(1)..)
            .map(|(_, job)| job)
            .filter(|job| job.namespace_id == ctx.namespace_id && !job.is_deleted())
            .filter(|job| filter.matches(job))
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(jobs)
    }
}

#[async_trait]
impl TransactionProvider for InMemoryJobStore {
    type Tx = InMemoryJobTransaction;

    async fn begin(&self) -> Result<InMemoryJobTransaction> {
        Ok(InMemoryJobTransaction {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
        })
    }
}

/// Transaction over an [`InMemoryJobStore`]; dropping it discards staged rows
#[derive(Debug)]
pub struct InMemoryJobTransaction {
    state: Arc<RwLock<InMemoryState>>,
    staged: Vec<Job>,
}

impl InMemoryJobTransaction {
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryJobTransaction {
    async fn commit(self) -> Result<()> {
        let mut state = self.state.write();
        for job in self.staged {
            state.jobs.insert(job.id, job);
        }
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl JobTransaction for InMemoryJobTransaction {
    async fn missing_groups(
        &mut self,
        namespace_id: &str,
        group_names: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>> {
        let state = self.state.read();
        Ok(group_names
            .iter()
            .filter(|name| {
                !state
                    .groups
                    .contains(&(namespace_id.to_string(), (*name).clone()))
            })
            .cloned()
            .collect())
    }

    async fn insert_job(&mut self, namespace_id: &str, request: &JobRequest) -> Result<Job> {
        let id = self.state.write().allocate_id();
        let job = build_job(id, namespace_id, request);
        self.staged.push(job.clone());
        Ok(job)
    }
}
