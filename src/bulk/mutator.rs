//! # Bulk Mutator
//!
//! Runs a [`BulkMutation`] as one all-or-nothing unit: validation of the full
//! request set, then every per-item mutation, inside a single transaction.

use super::transaction::{BulkMutation, TransactionProvider, UnitOfWork};
use crate::error::{PartitionError, Result};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Default)]
pub struct BulkMutator {
    label: String,
}

impl BulkMutator {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Apply every request or none of them.
    ///
    /// - Validation failures roll back before any mutation and are returned
    ///   as-is.
    /// - A failing `apply` rolls back the whole transaction and is reported as
    ///   [`PartitionError::Mutation`] with the request index.
    /// - An empty request list does not open a transaction.
    #[instrument(skip_all, fields(operation = %self.label, requests = requests.len()))]
    pub async fn apply_all<P, M, R>(
        &self,
        provider: &P,
        mutation: &M,
        requests: &[R],
    ) -> Result<Vec<M::Output>>
    where
        P: TransactionProvider + ?Sized,
        M: BulkMutation<P::Tx, R> + ?Sized,
        R: Sync,
    {
        if requests.is_empty() {
            debug!("No requests supplied, skipping transaction");
            return Ok(Vec::new());
        }

        let mut tx = provider.begin().await?;

        if let Err(e) = mutation.validate(&mut tx, requests).await {
            warn!(error = %e, "Bulk validation failed, nothing applied");
            rollback_after_failure(tx).await;
            return Err(e);
        }

        let mut outputs = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            match mutation.apply(&mut tx, index, request).await {
                Ok(output) => outputs.push(output),
                Err(e) => {
                    warn!(index = index, error = %e, "Mutation failed, rolling back");
                    rollback_after_failure(tx).await;
                    return Err(into_mutation_error(index, e));
                }
            }
        }

        tx.commit().await?;

        info!(applied = outputs.len(), "Bulk mutation committed");
        Ok(outputs)
    }
}

/// The original failure is what the caller sees; a rollback error is logged
async fn rollback_after_failure<Tx: UnitOfWork>(tx: Tx) {
    if let Err(rollback_error) = tx.rollback().await {
        warn!(error = %rollback_error, "Rollback failed after aborted bulk mutation");
    }
}

fn into_mutation_error(index: usize, error: PartitionError) -> PartitionError {
    match error {
        PartitionError::Mutation { .. } => error,
        other => PartitionError::mutation(index, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Ledger of committed values; transactions stage until commit
    #[derive(Default)]
    struct Ledger {
        committed: Arc<Mutex<Vec<i32>>>,
        begun: Mutex<usize>,
    }

    struct StagedTx {
        committed: Arc<Mutex<Vec<i32>>>,
        staged: Vec<i32>,
    }

    #[async_trait]
    impl UnitOfWork for StagedTx {
        async fn commit(self) -> Result<()> {
            self.committed.lock().extend(self.staged);
            Ok(())
        }

        async fn rollback(self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl TransactionProvider for Ledger {
        type Tx = StagedTx;

        async fn begin(&self) -> Result<StagedTx> {
            *self.begun.lock() += 1;
            Ok(StagedTx {
                committed: Arc::clone(&self.committed),
                staged: Vec::new(),
            })
        }
    }

    /// Rejects negative values up front and zero during apply
    struct PositiveOnly;

    #[async_trait]
    impl BulkMutation<StagedTx, i32> for PositiveOnly {
        type Output = i32;

        async fn validate(&self, _tx: &mut StagedTx, requests: &[i32]) -> Result<()> {
            let negative: Vec<String> = requests
                .iter()
                .filter(|v| **v < 0)
                .map(|v| v.to_string())
                .collect();
            if negative.is_empty() {
                Ok(())
            } else {
                Err(PartitionError::validation(negative, "test"))
            }
        }

        async fn apply(&self, tx: &mut StagedTx, index: usize, request: &i32) -> Result<i32> {
            if *request == 0 {
                return Err(PartitionError::invalid_request(index, "value", "must not be zero"));
            }
            tx.staged.push(*request);
            Ok(*request * 10)
        }
    }

    #[tokio::test]
    async fn test_all_requests_commit_together() {
        let ledger = Ledger::default();
        let outputs = BulkMutator::new("test")
            .apply_all(&ledger, &PositiveOnly, &[1, 2, 3])
            .await
            .unwrap();

        assert_eq!(outputs, vec![10, 20, 30]);
        assert_eq!(*ledger.committed.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_validation_failure_applies_nothing() {
        let ledger = Ledger::default();
        let err = BulkMutator::new("test")
            .apply_all(&ledger, &PositiveOnly, &[1, -2, 3])
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(ledger.committed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_mid_transaction_failure_rolls_back_earlier_items() {
        let ledger = Ledger::default();
        let err = BulkMutator::new("test")
            .apply_all(&ledger, &PositiveOnly, &[4, 5, 0])
            .await
            .unwrap_err();

        match err {
            PartitionError::Mutation { index, .. } => assert_eq!(index, 2),
            other => panic!("expected mutation error, got {other:?}"),
        }
        assert!(ledger.committed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_skips_transaction() {
        let ledger = Ledger::default();
        let requests: [i32; 0] = [];
        let outputs = BulkMutator::default()
            .apply_all(&ledger, &PositiveOnly, &requests)
            .await
            .unwrap();

        assert!(outputs.is_empty());
        assert_eq!(*ledger.begun.lock(), 0);
    }
}
