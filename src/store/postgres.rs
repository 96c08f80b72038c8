//! # PostgreSQL Job Store
//!
//! SQLx-backed store over the `sj_job` and `sj_group_config` tables.
//!
//! The export query is a keyset scan: every page is selected with
//! `id > $cursor ORDER BY id ASC LIMIT $page_size`, so each fetch costs about
//! one page regardless of how far the traversal has progressed.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use super::{JobStore, JobTransaction};
use crate::bulk::{TransactionProvider, UnitOfWork};
use crate::context::NamespaceContext;
use crate::error::{PartitionError, Result};
use crate::models::job::DEFAULT_BUCKET_TOTAL;
use crate::models::{ExportJobFilter, Job, JobRequest};

const JOB_COLUMNS: &str = "id, namespace_id, group_name, job_name, args_str, args_type, \
    job_status, task_type, route_key, executor_type, executor_info, trigger_type, \
    trigger_interval, block_strategy, executor_timeout, max_retry_times, parallel_num, \
    retry_interval, bucket_index, resident, notify_ids, owner_id, labels, description, \
    ext_attrs, deleted, create_dt, update_dt";

#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Build the keyset page query for `filter` after `cursor`
pub fn keyset_page_query(
    ctx: &NamespaceContext,
    filter: &ExportJobFilter,
    cursor: i64,
    limit: u32,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM sj_job"));

    query.push(" WHERE namespace_id = ");
    query.push_bind(ctx.namespace_id.clone());
    query.push(" AND deleted = 0");

    if let Some(group_name) = filter.group_name() {
        query.push(" AND group_name = ");
        query.push_bind(group_name.to_string());
    }

    if let Some(prefix) = filter.job_name_prefix() {
        query.push(" AND job_name LIKE ");
        query.push_bind(format!("{}%", escape_like(prefix)));
    }

    if let Some(status) = filter.job_status {
        query.push(" AND job_status = ");
        query.push_bind(i16::from(status));
    }

    if !filter.job_ids.is_empty() {
        query.push(" AND id = ANY(");
        query.push_bind(filter.job_ids.clone());
        query.push(")");
    }

    query.push(" AND id > ");
    query.push_bind(cursor);
    query.push(" ORDER BY id ASC LIMIT ");
    query.push_bind(i64::from(limit));

    query
}

/// Escape LIKE wildcards so a prefix matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn fetch_jobs_after(
        &self,
        ctx: &NamespaceContext,
        filter: &ExportJobFilter,
        cursor: i64,
        limit: u32,
    ) -> Result<Vec<Job>> {
        let mut query = keyset_page_query(ctx, filter, cursor, limit);
        let jobs = query
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PartitionError::fetch(format!("sj_job keyset query: {e}")))?;
        Ok(jobs)
    }
}

#[async_trait]
impl TransactionProvider for PgJobStore {
    type Tx = PgJobTransaction;

    async fn begin(&self) -> Result<PgJobTransaction> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PartitionError::transaction("begin", e.to_string()))?;
        Ok(PgJobTransaction { tx })
    }
}

/// An open PostgreSQL transaction; dropping it rolls back
pub struct PgJobTransaction {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for PgJobTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgJobTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl UnitOfWork for PgJobTransaction {
    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| PartitionError::transaction("commit", e.to_string()))
    }

    async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| PartitionError::transaction("rollback", e.to_string()))
    }
}

#[async_trait]
impl JobTransaction for PgJobTransaction {
    async fn missing_groups(
        &mut self,
        namespace_id: &str,
        group_names: &BTreeSet<String>,
    ) -> Result<BTreeSet<String>> {
        let requested: Vec<String> = group_names.iter().cloned().collect();
        let existing: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT group_name
            FROM sj_group_config
            WHERE namespace_id = $1 AND group_name = ANY($2)
            "#,
        )
        .bind(namespace_id)
        .bind(&requested)
        .fetch_all(&mut *self.tx)
        .await?;

        let existing: BTreeSet<String> = existing.into_iter().collect();
        debug!(
            namespace_id = %namespace_id,
            requested = requested.len(),
            found = existing.len(),
            "Checked group existence"
        );

        Ok(group_names.difference(&existing).cloned().collect())
    }

    async fn insert_job(&mut self, namespace_id: &str, request: &JobRequest) -> Result<Job> {
        let sql = format!(
            r#"
            INSERT INTO sj_job (
                namespace_id, group_name, job_name, args_str, args_type, job_status,
                task_type, route_key, executor_type, executor_info, trigger_type,
                trigger_interval, block_strategy, executor_timeout, max_retry_times,
                parallel_num, retry_interval, bucket_index, resident, notify_ids,
                owner_id, labels, description, deleted, create_dt, update_dt
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, 0, NOW(), NOW()
            )
            RETURNING {JOB_COLUMNS}
            "#
        );

        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(namespace_id)
            .bind(&request.group_name)
            .bind(request.job_name.trim())
            .bind(&request.args_str)
            .bind(request.args_type)
            .bind(i16::from(request.job_status))
            .bind(request.task_type)
            .bind(request.route_key)
            .bind(request.executor_type)
            .bind(&request.executor_info)
            .bind(request.trigger_type)
            .bind(&request.trigger_interval)
            .bind(request.block_strategy)
            .bind(request.executor_timeout)
            .bind(request.max_retry_times)
            .bind(request.parallel_num)
            .bind(request.retry_interval)
            .bind(request.bucket_index(DEFAULT_BUCKET_TOTAL))
            .bind(request.resident)
            .bind(&request.notify_ids)
            .bind(request.owner_id)
            .bind(&request.labels)
            .bind(&request.description)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(job)
    }
}
