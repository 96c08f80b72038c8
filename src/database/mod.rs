//! # Database Operations
//!
//! Connection management and schema migrations for the PostgreSQL job store.
//!
//! - [`connection`] - Pooled connections built from [`DatabaseConfig`]
//! - [`migrations`] - Embedded schema migrations
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use partition_core::config::DatabaseConfig;
//! use partition_core::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::new(&DatabaseConfig::default()).await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! assert!(db.health_check().await?);
//! # Ok(())
//! # }
//! ```
//!
//! [`DatabaseConfig`]: crate::config::DatabaseConfig

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
