use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{PartitionError, Result};

/// Bucket count used to spread jobs across scheduler shards
pub const DEFAULT_BUCKET_TOTAL: i32 = 128;

/// Longest job name accepted on import
pub const MAX_JOB_NAME_LEN: usize = 64;

/// Job represents a scheduled job definition
/// Maps to `sj_job` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub namespace_id: String,
    pub group_name: String,
    pub job_name: String,
    pub args_str: Option<String>,
    pub args_type: i16,
    pub job_status: i16,
    pub task_type: i16,
    pub route_key: i16,
    pub executor_type: i16,
    pub executor_info: String,
    pub trigger_type: i16,
    pub trigger_interval: String,
    pub block_strategy: i16,
    pub executor_timeout: i32,
    pub max_retry_times: i32,
    pub parallel_num: i32,
    pub retry_interval: i32,
    pub bucket_index: i32,
    pub resident: i16,
    pub notify_ids: Option<String>,
    pub owner_id: Option<i64>,
    pub labels: Option<String>,
    pub description: String,
    pub ext_attrs: Option<String>,
    pub deleted: i16,
    pub create_dt: NaiveDateTime,
    pub update_dt: NaiveDateTime,
}

impl Job {
    pub fn is_deleted(&self) -> bool {
        self.deleted != 0
    }
}

/// Enabled/disabled flag stored as a small integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum JobStatus {
    Disabled,
    Enabled,
}

impl From<JobStatus> for i16 {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Disabled => 0,
            JobStatus::Enabled => 1,
        }
    }
}

impl TryFrom<i16> for JobStatus {
    type Error = String;

    fn try_from(value: i16) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(JobStatus::Disabled),
            1 => Ok(JobStatus::Enabled),
            other => Err(format!("Unknown job status: {other}")),
        }
    }
}

/// Import/export shape of a job: user-facing fields only, no identity or
/// bookkeeping columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub group_name: String,
    pub job_name: String,
    #[serde(default)]
    pub args_str: Option<String>,
    #[serde(default)]
    pub args_type: i16,
    pub job_status: JobStatus,
    #[serde(default)]
    pub task_type: i16,
    #[serde(default)]
    pub route_key: i16,
    #[serde(default)]
    pub executor_type: i16,
    pub executor_info: String,
    pub trigger_type: i16,
    pub trigger_interval: String,
    #[serde(default)]
    pub block_strategy: i16,
    #[serde(default)]
    pub executor_timeout: i32,
    #[serde(default)]
    pub max_retry_times: i32,
    #[serde(default = "default_parallel_num")]
    pub parallel_num: i32,
    #[serde(default)]
    pub retry_interval: i32,
    #[serde(default)]
    pub resident: i16,
    #[serde(default)]
    pub notify_ids: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub labels: Option<String>,
    #[serde(default)]
    pub description: String,
}

fn default_parallel_num() -> i32 {
    1
}

/// Fails when the stored status code has no [`JobStatus`] counterpart
impl TryFrom<&Job> for JobRequest {
    type Error = PartitionError;

    fn try_from(job: &Job) -> Result<Self> {
        let job_status = JobStatus::try_from(job.job_status)
            .map_err(|reason| PartitionError::consume(format!("job {}: {reason}", job.id)))?;

        Ok(Self {
            group_name: job.group_name.clone(),
            job_name: job.job_name.clone(),
            args_str: job.args_str.clone(),
            args_type: job.args_type,
            job_status,
            task_type: job.task_type,
            route_key: job.route_key,
            executor_type: job.executor_type,
            executor_info: job.executor_info.clone(),
            trigger_type: job.trigger_type,
            trigger_interval: job.trigger_interval.clone(),
            block_strategy: job.block_strategy,
            executor_timeout: job.executor_timeout,
            max_retry_times: job.max_retry_times,
            parallel_num: job.parallel_num,
            retry_interval: job.retry_interval,
            resident: job.resident,
            notify_ids: job.notify_ids.clone(),
            owner_id: job.owner_id,
            labels: job.labels.clone(),
            description: job.description.clone(),
        })
    }
}

impl JobRequest {
    /// Field-level checks for the request at position `index` of an import
    pub fn validate(&self, index: usize) -> Result<()> {
        let job_name = self.job_name.trim();
        if job_name.is_empty() {
            return Err(PartitionError::invalid_request(index, "jobName", "must not be blank"));
        }
        if job_name.chars().count() > MAX_JOB_NAME_LEN {
            return Err(PartitionError::invalid_request(
                index,
                "jobName",
                format!("must be at most {MAX_JOB_NAME_LEN} characters"),
            ));
        }
        if self.group_name.trim().is_empty() {
            return Err(PartitionError::invalid_request(index, "groupName", "must not be blank"));
        }
        if self.executor_info.trim().is_empty() {
            return Err(PartitionError::invalid_request(
                index,
                "executorInfo",
                "must not be blank",
            ));
        }
        if self.trigger_interval.trim().is_empty() {
            return Err(PartitionError::invalid_request(
                index,
                "triggerInterval",
                "must not be blank",
            ));
        }

        for (field, value) in [
            ("maxRetryTimes", self.max_retry_times),
            ("parallelNum", self.parallel_num),
            ("executorTimeout", self.executor_timeout),
            ("retryInterval", self.retry_interval),
        ] {
            if value < 0 {
                return Err(PartitionError::invalid_request(index, field, "must not be negative"));
            }
        }

        Ok(())
    }

    /// Scheduler shard for this job: BKDR hash of group + name as stored,
    /// masked to 31 bits
    pub fn bucket_index(&self, bucket_total: i32) -> i32 {
        let hash = format!("{}{}", self.group_name, self.job_name.trim())
            .bytes()
            .fold(0_u32, |acc, b| acc.wrapping_mul(131).wrapping_add(u32::from(b)))
            & 0x7FFF_FFFF;
        (hash % bucket_total.max(1) as u32) as i32
    }
}

/// Filters applied on top of the keyset predicate when exporting.
///
/// Namespace scoping and soft-delete exclusion are always applied and are
/// not part of the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJobFilter {
    /// Exact group name
    #[serde(default)]
    pub group_name: Option<String>,
    /// Job name prefix, trimmed before matching
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub job_status: Option<JobStatus>,
    /// Restrict to these ids; empty means no restriction
    #[serde(default)]
    pub job_ids: Vec<i64>,
}

impl ExportJobFilter {
    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref().filter(|g| !g.trim().is_empty())
    }

    pub fn job_name_prefix(&self) -> Option<&str> {
        self.job_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Evaluate the filter against a row, for stores without a query engine
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(group) = self.group_name() {
            if job.group_name != group {
                return false;
            }
        }
        if let Some(prefix) = self.job_name_prefix() {
            if !job.job_name.starts_with(prefix) {
                return false;
            }
        }
        if let Some(status) = self.job_status {
            if job.job_status != i16::from(status) {
                return false;
            }
        }
        self.job_ids.is_empty() || self.job_ids.contains(&job.id)
    }
}
