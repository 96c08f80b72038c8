//! # Error Types
//!
//! Structured error handling for traversal and bulk mutation using thiserror.
//!
//! Nothing in this crate retries or swallows a failure. Errors raised by a
//! fetcher, consumer or per-item mutation reach the caller of
//! [`BatchProcessor::process`] or [`BulkMutator::apply_all`] tagged as
//! `Fetch`, `Consume` or `Mutation`, with the underlying message kept.
//!
//! [`BatchProcessor::process`]: crate::partition::BatchProcessor::process
//! [`BulkMutator::apply_all`]: crate::bulk::BulkMutator::apply_all

use crate::config::ConfigurationError;
use thiserror::Error;

/// Error taxonomy for the partition core and the job transfer service
#[derive(Error, Debug)]
pub enum PartitionError {
    /// The cursor fetcher could not produce the next batch
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    /// The batch consumer failed while processing a batch
    #[error("Consume failed: {message}")]
    Consume { message: String },

    /// A fetcher returned items that do not advance strictly past the cursor
    #[error("Out-of-order batch: key {key} does not advance past cursor {cursor}")]
    OutOfOrderBatch { cursor: String, key: String },

    /// One or more referenced entities are absent; nothing was applied
    #[error("Validation failed: missing {missing:?} in scope '{scope}'")]
    Validation { missing: Vec<String>, scope: String },

    /// A single request failed its own field checks
    #[error("Invalid request at index {index}: {field}: {reason}")]
    InvalidRequest {
        index: usize,
        field: String,
        reason: String,
    },

    /// A per-item mutation failed; all earlier mutations were rolled back
    #[error("Mutation failed at index {index}: {message}")]
    Mutation { index: usize, message: String },

    /// Begin, commit or rollback of a transaction failed
    #[error("Transaction {operation} failed: {message}")]
    Transaction { operation: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl PartitionError {
    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a consume error
    pub fn consume(message: impl Into<String>) -> Self {
        Self::Consume {
            message: message.into(),
        }
    }

    /// Create an out-of-order batch error
    pub fn out_of_order(cursor: impl std::fmt::Debug, key: impl std::fmt::Debug) -> Self {
        Self::OutOfOrderBatch {
            cursor: format!("{cursor:?}"),
            key: format!("{key:?}"),
        }
    }

    /// Create a validation error listing the missing references
    pub fn validation<I, S>(missing: I, scope: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            missing: missing.into_iter().map(Into::into).collect(),
            scope: scope.into(),
        }
    }

    /// Create a per-request validation error
    pub fn invalid_request(
        index: usize,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRequest {
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a mutation error for the request at `index`
    pub fn mutation(index: usize, message: impl Into<String>) -> Self {
        Self::Mutation {
            index,
            message: message.into(),
        }
    }

    /// Create a transaction lifecycle error
    pub fn transaction(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transaction {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised before any mutation was applied
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Whether this error aborted a transaction after mutations had started
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Mutation { .. })
    }
}

pub type Result<T> = std::result::Result<T, PartitionError>;
