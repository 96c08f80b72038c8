//! # Partition Tasks
//!
//! The unit the batch processor reasons about: an orderable key plus an
//! opaque payload.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// An item that exposes the key the cursor advances over.
///
/// Keys must be unique and assigned in append-only order by the backing
/// store; the processor relies on "new records get larger keys" for
/// completeness under concurrent inserts.
pub trait PartitionItem {
    type Key: Ord + Copy + Debug + Send + Sync;

    fn partition_key(&self) -> Self::Key;
}

/// Generic wrapper pairing a cursor key with a caller-defined payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTask<T, K = i64> {
    id: K,
    payload: T,
}

impl<T, K> PartitionTask<T, K>
where
    K: Ord + Copy + Debug + Send + Sync,
{
    pub fn new(id: K, payload: T) -> Self {
        Self { id, payload }
    }

    /// Wrap a payload, deriving its key with `key_fn`
    pub fn from_keyed(payload: T, key_fn: impl FnOnce(&T) -> K) -> Self {
        let id = key_fn(&payload);
        Self { id, payload }
    }

    pub fn id(&self) -> K {
        self.id
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Take ownership of the payload, dropping the key
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T, K> PartitionItem for PartitionTask<T, K>
where
    K: Ord + Copy + Debug + Send + Sync,
{
    type Key = K;

    fn partition_key(&self) -> K {
        self.id
    }
}
