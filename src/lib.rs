#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Partition Core
//!
//! Keyset-cursor batch traversal and all-or-nothing bulk mutation for job
//! scheduler stores.
//!
//! ## Overview
//!
//! Large record sets are walked in bounded batches using "id greater than the
//! last id seen" instead of row offsets, so every fetch costs about one page
//! no matter how deep the traversal is. Imports of many records run as one
//! transaction: the whole input is validated up front, then each record is
//! applied, and any failure rolls everything back.
//!
//! ## Module Organization
//!
//! - [`partition`] - Cursor fetcher and batch consumer seams plus the batch processor
//! - [`bulk`] - Validate-then-mutate-as-one-unit over a transaction boundary
//! - [`store`] - PostgreSQL and in-memory job stores
//! - [`services`] - Namespace-scoped job export and import
//! - [`models`] - Job rows, import requests and export filters
//! - [`config`] - Layered configuration
//! - [`database`] - Connection pooling and migrations
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use partition_core::config::ExportConfig;
//! use partition_core::services::JobTransferService;
//! use partition_core::store::InMemoryJobStore;
//! use partition_core::{ExportJobFilter, NamespaceContext};
//!
//! # tokio_test::block_on(async {
//! let service = JobTransferService::new(InMemoryJobStore::new(), ExportConfig::default());
//! let json = service
//!     .export_jobs(&NamespaceContext::new("default"), &ExportJobFilter::default())
//!     .await
//!     .unwrap();
//! assert_eq!(json, "[]");
//! # });
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod bulk;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod partition;
pub mod services;
pub mod store;

pub use bulk::{BulkMutation, BulkMutator, TransactionProvider, UnitOfWork};
pub use config::{ConfigurationError, DatabaseConfig, ExportConfig, PartitionConfig};
pub use context::NamespaceContext;
pub use error::{PartitionError, Result};
pub use models::{ExportJobFilter, Job, JobRequest, JobStatus};
pub use partition::{
    BatchConsumer, BatchProcessor, CursorFetcher, PartitionItem, PartitionTask, ProcessSummary,
};
pub use services::{ImportSummary, JobTransferService};
