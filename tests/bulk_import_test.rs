mod common;

use common::*;
use partition_core::config::ExportConfig;
use partition_core::store::InMemoryJobStore;
use partition_core::{JobRequest, JobStatus, JobTransferService, NamespaceContext, PartitionError};

fn service_with_groups(
    namespace_id: &str,
    groups: &[&str],
) -> JobTransferService<InMemoryJobStore> {
    let store = InMemoryJobStore::new();
    for group in groups {
        store.add_group(namespace_id, group);
    }
    JobTransferService::new(store, ExportConfig { page_size: 10 })
}

fn requests(groups: &[&str]) -> Vec<JobRequest> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| JobRequestBuilder::new(group, &format!("job-{i}")).build())
        .collect()
}

#[tokio::test]
async fn test_import_commits_every_request() {
    let service = service_with_groups("ns", &["billing", "reports"]);
    let ctx = NamespaceContext::new("ns").with_operator("ops@example.com");

    let summary = service
        .import_jobs(&ctx, &requests(&["billing", "reports", "billing"]))
        .await
        .unwrap();

    assert_eq!(summary.imported, 3);
    assert_eq!(summary.job_ids, vec![1, 2, 3]);

    let jobs = service.store().jobs();
    assert_eq!(jobs.len(), 3);
    assert!(jobs.iter().all(|job| job.namespace_id == "ns" && !job.is_deleted()));
    assert_eq!(jobs[1].group_name, "reports");
}

#[tokio::test]
async fn test_missing_middle_group_persists_nothing() {
    let service = service_with_groups("ns", &["billing"]);

    let err = service
        .import_jobs(
            &NamespaceContext::new("ns"),
            &requests(&["billing", "unknown", "billing"]),
        )
        .await
        .unwrap_err();

    match err {
        PartitionError::Validation { missing, scope } => {
            assert_eq!(missing, vec!["unknown".to_string()]);
            assert_eq!(scope, "ns");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(service.store().job_count(), 0);
}

#[tokio::test]
async fn test_missing_group_at_any_position_is_rejected_wholesale() {
    for position in 0..3 {
        let service = service_with_groups("ns", &["billing"]);
        let mut groups = vec!["billing"; 3];
        groups[position] = "absent";

        let err = service
            .import_jobs(&NamespaceContext::new("ns"), &requests(&groups))
            .await
            .unwrap_err();

        assert!(err.is_validation(), "position {position}: {err:?}");
        assert_eq!(service.store().job_count(), 0, "position {position}");
    }
}

#[tokio::test]
async fn test_groups_from_other_namespaces_do_not_count() {
    let service = service_with_groups("other", &["billing"]);

    let err = service
        .import_jobs(&NamespaceContext::new("ns"), &requests(&["billing"]))
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn test_per_item_failure_rolls_back_earlier_inserts() {
    for position in 0..3 {
        let service = service_with_groups("ns", &["billing"]);
        let mut batch = requests(&["billing", "billing", "billing"]);
        batch[position] = JobRequestBuilder::new("billing", "broken")
            .with_executor_info("  ")
            .build();

        let err = service
            .import_jobs(&NamespaceContext::new("ns"), &batch)
            .await
            .unwrap_err();

        match err {
            PartitionError::Mutation { index, message } => {
                assert_eq!(index, position);
                assert!(message.contains("executorInfo"), "{message}");
            }
            other => panic!("expected mutation error, got {other:?}"),
        }
        assert_eq!(service.store().job_count(), 0, "position {position}");
    }
}

#[tokio::test]
async fn test_negative_retry_count_is_rejected() {
    let service = service_with_groups("ns", &["billing"]);
    let batch = vec![JobRequestBuilder::new("billing", "retrying")
        .with_max_retry_times(-1)
        .build()];

    let err = service
        .import_jobs(&NamespaceContext::new("ns"), &batch)
        .await
        .unwrap_err();

    assert!(err.is_mutation());
}

#[tokio::test]
async fn test_empty_import_is_a_no_op() {
    let service = service_with_groups("ns", &[]);

    let summary = service
        .import_jobs(&NamespaceContext::new("ns"), &[])
        .await
        .unwrap();

    assert_eq!(summary.imported, 0);
    assert!(summary.job_ids.is_empty());
}

#[tokio::test]
async fn test_import_preserves_request_status() {
    let service = service_with_groups("ns", &["billing"]);
    let batch = vec![JobRequestBuilder::new("billing", "paused")
        .with_status(JobStatus::Disabled)
        .build()];

    service
        .import_jobs(&NamespaceContext::new("ns"), &batch)
        .await
        .unwrap();

    assert_eq!(service.store().jobs()[0].job_status, i16::from(JobStatus::Disabled));
}

#[tokio::test]
async fn test_import_json_accepts_minimal_payload() {
    let service = service_with_groups("ns", &["billing"]);
    let json = r#"[{
        "groupName": "billing",
        "jobName": "nightly-invoice",
        "jobStatus": 1,
        "executorInfo": "invoiceExecutor",
        "triggerType": 3,
        "triggerInterval": "0 0 2 * * ?"
    }]"#;

    let summary = service
        .import_jobs_json(&NamespaceContext::new("ns"), json)
        .await
        .unwrap();

    assert_eq!(summary.imported, 1);
    let job = &service.store().jobs()[0];
    assert_eq!(job.parallel_num, 1);
    assert_eq!(job.trigger_interval, "0 0 2 * * ?");
}
