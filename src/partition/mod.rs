//! # Keyset Partition Traversal
//!
//! Walks an unbounded, ordered record set in bounded batches without
//! materializing it, using "key greater than last seen key" instead of row
//! offsets.
//!
//! ## Components
//!
//! - [`CursorFetcher`]: returns the next batch after a cursor
//! - [`BatchConsumer`]: applies caller logic to each batch
//! - [`BatchProcessor`]: owns the loop and the cursor
//! - [`PartitionTask`]: generic key + payload wrapper for fetched records

pub mod consumer;
pub mod fetcher;
pub mod processor;
pub mod task;

pub use consumer::{BatchConsumer, CollectingConsumer, FnConsumer};
pub use fetcher::{CursorFetcher, FnFetcher};
pub use processor::{BatchProcessor, ProcessSummary};
pub use task::{PartitionItem, PartitionTask};
