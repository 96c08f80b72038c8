//! Test data builders for job requests and seeded stores.

use partition_core::store::InMemoryJobStore;
use partition_core::{Job, JobRequest, JobStatus};

/// Builder pattern for creating test JobRequests
pub struct JobRequestBuilder {
    group_name: String,
    job_name: String,
    job_status: JobStatus,
    executor_info: String,
    trigger_interval: String,
    max_retry_times: i32,
}

impl JobRequestBuilder {
    pub fn new(group_name: &str, job_name: &str) -> Self {
        Self {
            group_name: group_name.to_string(),
            job_name: job_name.to_string(),
            job_status: JobStatus::Enabled,
            executor_info: "testExecutor".to_string(),
            trigger_interval: "60".to_string(),
            max_retry_times: 3,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.job_status = status;
        self
    }

    pub fn with_executor_info(mut self, executor_info: &str) -> Self {
        self.executor_info = executor_info.to_string();
        self
    }

    pub fn with_max_retry_times(mut self, max_retry_times: i32) -> Self {
        self.max_retry_times = max_retry_times;
        self
    }

    pub fn build(self) -> JobRequest {
        serde_json::from_value(serde_json::json!({
            "groupName": self.group_name,
            "jobName": self.job_name,
            "jobStatus": i16::from(self.job_status),
            "executorInfo": self.executor_info,
            "triggerType": 2,
            "triggerInterval": self.trigger_interval,
            "maxRetryTimes": self.max_retry_times,
            "description": format!("{} job", self.job_name),
        }))
        .expect("builder produces a valid JobRequest")
    }
}

/// Seed `count` jobs named `job-000`, `job-001`, ... into one group
pub fn seed_jobs(
    store: &InMemoryJobStore,
    namespace_id: &str,
    group: &str,
    count: usize,
) -> Vec<Job> {
    store.add_group(namespace_id, group);
    (0..count)
        .map(|i| {
            let request = JobRequestBuilder::new(group, &format!("job-{i:03}")).build();
            store.seed_job(namespace_id, &request)
        })
        .collect()
}
