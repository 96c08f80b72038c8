//! Transaction boundary seams used by the bulk mutator.

use crate::error::Result;
use async_trait::async_trait;

/// One open transaction.
///
/// Dropping a unit of work without committing must discard its changes;
/// `rollback` makes that explicit and surfaces any failure doing so.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}

/// Opens transactions against a backing store
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    type Tx: UnitOfWork;

    async fn begin(&self) -> Result<Self::Tx>;
}

/// A validate-then-apply mutation over a finite request list.
///
/// `validate` sees the whole input before anything is written; `apply` is
/// called once per request, in input order, inside the same transaction.
#[async_trait]
pub trait BulkMutation<Tx, R>: Send + Sync
where
    Tx: Send,
    R: Sync,
{
    type Output: Send;

    async fn validate(&self, tx: &mut Tx, requests: &[R]) -> Result<()>;

    async fn apply(&self, tx: &mut Tx, index: usize, request: &R) -> Result<Self::Output>;
}
