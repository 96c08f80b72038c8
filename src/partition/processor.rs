//! # Batch Processor
//!
//! Drives repeated fetch/consume cycles over a keyset cursor until the
//! fetcher reports exhaustion with an empty batch.
//!
//! ## Traversal contract
//!
//! - One fetch at a time; the next fetch starts only after the consumer has
//!   returned for the previous batch.
//! - The cursor only moves forward, to the largest key of the last consumed
//!   batch.
//! - A short but non-empty batch does not end the traversal. Filtered
//!   queries may return fewer rows than the page size while more remain
//!   above the cursor.
//! - Failures from the fetcher or consumer abort immediately and surface as
//!   `Fetch` or `Consume`. The cursor is not persisted, so re-running starts
//!   again from the initial cursor.

use super::consumer::BatchConsumer;
use super::fetcher::CursorFetcher;
use super::task::PartitionItem;
use crate::error::{PartitionError, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Outcome of one completed traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessSummary<K> {
    /// Non-empty batches handed to the consumer
    pub batches: usize,
    /// Items across all consumed batches
    pub items: usize,
    /// Fetch calls issued, including the terminating empty one
    pub fetches: usize,
    /// Cursor value when the traversal ended
    pub last_cursor: K,
}

/// Stateless driver for keyset traversals.
///
/// The processor owns no cursor between calls; each [`process`] call owns its
/// own cursor for its whole duration.
///
/// [`process`]: BatchProcessor::process
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    label: String,
}

impl BatchProcessor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Walk every item after `initial_cursor`, one batch at a time.
    ///
    /// ```rust
    /// use partition_core::partition::{
    ///     BatchProcessor, CollectingConsumer, FnFetcher, PartitionTask,
    /// };
    /// use partition_core::PartitionError;
    ///
    /// # tokio_test::block_on(async {
    /// let ids = vec![1_i64, 3, 4, 7, 9, 12];
    /// let mut fetcher = FnFetcher::new(move |cursor: i64| {
    ///     let page: Vec<PartitionTask<()>> = ids
    ///         .iter()
    ///         .copied()
    ///         .filter(|id| *id > cursor)
    ///         .take(2)
    ///         .map(|id| PartitionTask::new(id, ()))
    ///         .collect();
    ///     async move { Ok::<_, PartitionError>(page) }
    /// });
    /// let mut sink = CollectingConsumer::new(|task: &PartitionTask<()>| task.id());
    ///
    /// let summary = BatchProcessor::new("doc")
    ///     .process(0, &mut fetcher, &mut sink)
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(sink.items(), &[1, 3, 4, 7, 9, 12]);
    /// assert_eq!(summary.batches, 3);
    /// assert_eq!(summary.fetches, 4);
    /// # });
    /// ```
    #[instrument(skip(self, fetcher, consumer), fields(traversal = %self.label))]
    pub async fn process<T, F, C>(
        &self,
        initial_cursor: T::Key,
        fetcher: &mut F,
        consumer: &mut C,
    ) -> Result<ProcessSummary<T::Key>>
    where
        T: PartitionItem + Send + Sync,
        F: CursorFetcher<T> + ?Sized,
        C: BatchConsumer<T> + ?Sized,
    {
        let mut cursor = initial_cursor;
        let mut summary = ProcessSummary {
            batches: 0,
            items: 0,
            fetches: 0,
            last_cursor: initial_cursor,
        };

        loop {
            let batch = fetcher.fetch(cursor).await.map_err(into_fetch_error)?;
            summary.fetches += 1;

            let Some(last) = batch.last() else {
                break;
            };
            let next_cursor = last.partition_key();

            if let Err(e) = check_ordering(cursor, &batch) {
                warn!(
                    cursor = ?cursor,
                    batch_len = batch.len(),
                    error = %e,
                    "Fetcher returned a batch that does not advance the cursor"
                );
                return Err(e);
            }

            debug!(
                cursor = ?cursor,
                next_cursor = ?next_cursor,
                batch_len = batch.len(),
                "Consuming batch"
            );

            consumer.consume(&batch).await.map_err(into_consume_error)?;

            summary.batches += 1;
            summary.items += batch.len();
            cursor = next_cursor;
            summary.last_cursor = cursor;
        }

        info!(
            batches = summary.batches,
            items = summary.items,
            fetches = summary.fetches,
            last_cursor = ?summary.last_cursor,
            "Traversal complete"
        );

        Ok(summary)
    }
}

/// Failures raised inside the fetcher surface as `Fetch`, whatever their type
fn into_fetch_error(error: PartitionError) -> PartitionError {
    match error {
        PartitionError::Fetch { .. } => error,
        other => PartitionError::fetch(other.to_string()),
    }
}

fn into_consume_error(error: PartitionError) -> PartitionError {
    match error {
        PartitionError::Consume { .. } => error,
        other => PartitionError::consume(other.to_string()),
    }
}

/// Every key must exceed the cursor and its predecessor
fn check_ordering<T: PartitionItem>(cursor: T::Key, batch: &[T]) -> Result<()> {
    let mut previous = cursor;
    for item in batch {
        let key = item.partition_key();
        if key <= previous {
            return Err(PartitionError::out_of_order(previous, key));
        }
        previous = key;
    }
    Ok(())
}
