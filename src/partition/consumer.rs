//! # Batch Consumers
//!
//! Caller-supplied logic applied to each non-empty batch. Consumers borrow
//! the batch for the duration of the call; anything they want to keep must
//! be copied out.

use super::task::PartitionItem;
use crate::error::Result;
use async_trait::async_trait;

/// Receives each non-empty batch of a traversal in ascending key order
#[async_trait]
pub trait BatchConsumer<T: PartitionItem + Sync>: Send {
    async fn consume(&mut self, batch: &[T]) -> Result<()>;
}

/// Adapts a synchronous closure into a [`BatchConsumer`]
pub struct FnConsumer<F> {
    consume_fn: F,
}

impl<F> FnConsumer<F> {
    pub fn new(consume_fn: F) -> Self {
        Self { consume_fn }
    }
}

impl<F> std::fmt::Debug for FnConsumer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnConsumer").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, F> BatchConsumer<T> for FnConsumer<F>
where
    T: PartitionItem + Sync,
    F: FnMut(&[T]) -> Result<()> + Send,
{
    async fn consume(&mut self, batch: &[T]) -> Result<()> {
        (self.consume_fn)(batch)
    }
}

/// Accumulates a transformed copy of every item it sees.
///
/// Items appended before a failing batch stay in the sink; call
/// [`CollectingConsumer::clear`] before retrying a traversal.
pub struct CollectingConsumer<O, M> {
    items: Vec<O>,
    mapper: M,
}

impl<O, M> CollectingConsumer<O, M> {
    pub fn new(mapper: M) -> Self {
        Self {
            items: Vec::new(),
            mapper,
        }
    }

    pub fn items(&self) -> &[O] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<O> {
        self.items
    }
}

impl<T: Clone> CollectingConsumer<T, fn(&T) -> T> {
    /// A sink that clones every item unchanged
    pub fn cloning() -> Self {
        Self::new(T::clone)
    }
}

impl<O, M> std::fmt::Debug for CollectingConsumer<O, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectingConsumer")
            .field("collected", &self.items.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, O, M> BatchConsumer<T> for CollectingConsumer<O, M>
where
    T: PartitionItem + Sync,
    O: Send,
    M: FnMut(&T) -> O + Send,
{
    async fn consume(&mut self, batch: &[T]) -> Result<()> {
        self.items.reserve(batch.len());
        for item in batch {
            self.items.push((self.mapper)(item));
        }
        Ok(())
    }
}
