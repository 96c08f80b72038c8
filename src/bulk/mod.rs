//! # Bulk Mutation
//!
//! Validate-then-mutate-as-one-unit for finite request lists, on top of a
//! store-provided transaction boundary.

pub mod mutator;
pub mod transaction;

pub use mutator::BulkMutator;
pub use transaction::{BulkMutation, TransactionProvider, UnitOfWork};
