//! # Cursor Fetcher
//!
//! The leaf capability of a traversal: given the highest key already
//! consumed, return the next ordered batch.

use super::task::PartitionItem;
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;

/// Produces the next batch strictly after a cursor.
///
/// Implementations must filter `key > cursor`, order ascending by key, and
/// cap the result at their page size. An empty vector is the only
/// end-of-traversal signal; a short page is not.
#[async_trait]
pub trait CursorFetcher<T: PartitionItem>: Send {
    async fn fetch(&mut self, cursor: T::Key) -> Result<Vec<T>>;
}

/// Adapts an async closure into a [`CursorFetcher`]
///
/// ```rust
/// use partition_core::partition::{FnFetcher, CursorFetcher, PartitionTask};
/// use partition_core::PartitionError;
///
/// # tokio_test::block_on(async {
/// let rows = vec![1_i64, 3, 4];
/// let mut fetcher = FnFetcher::new(move |cursor: i64| {
///     let page: Vec<PartitionTask<()>> = rows
///         .iter()
///         .copied()
///         .filter(|id| *id > cursor)
///         .take(2)
///         .map(|id| PartitionTask::new(id, ()))
///         .collect();
///     async move { Ok::<_, PartitionError>(page) }
/// });
/// let batch = fetcher.fetch(1).await.unwrap();
/// assert_eq!(batch.len(), 2);
/// # });
/// ```
pub struct FnFetcher<F> {
    fetch_fn: F,
}

impl<F> FnFetcher<F> {
    pub fn new(fetch_fn: F) -> Self {
        Self { fetch_fn }
    }
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, F, Fut> CursorFetcher<T> for FnFetcher<F>
where
    T: PartitionItem + Send + 'static,
    T::Key: 'static,
    F: FnMut(T::Key) -> Fut + Send,
    Fut: Future<Output = Result<Vec<T>>> + Send,
{
    async fn fetch(&mut self, cursor: T::Key) -> Result<Vec<T>> {
        (self.fetch_fn)(cursor).await
    }
}
