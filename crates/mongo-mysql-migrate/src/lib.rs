//! # mongo-mysql-migrate
//!
//! One-time structural migration of a billing dataset from MongoDB into a
//! normalized MySQL schema.
//!
//! The engine streams every document of ten source collections, maps each
//! into one parent row plus any denormalized child rows, and writes them in
//! a fixed dependency order. Re-running the whole pipeline is safe: parents
//! are skipped when their primary key already exists in the destination and
//! child rows are written with insert-or-ignore semantics.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mongo_mysql_migrate::{Config, Migrator};
//!
//! #[tokio::main]
//! async fn main() -> mongo_mysql_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let migrator = Migrator::new(config).await?;
//!     migrator.prepare_schema(false).await?;
//!     let summary = migrator.run().await?;
//!     println!("Moved {} rows", summary.rows_moved);
//!     Ok(())
//! }
//! ```

pub mod charge_link;
pub mod config;
pub mod datetime;
pub mod error;
pub mod migrate;
pub mod model;
pub mod source;
pub mod target;

// Re-exports for convenient access
pub use config::{Config, SourceConfig, TargetConfig};
pub use error::{MigrateError, Result};
pub use migrate::{CountCheck, MigrationSummary, Migrator, StepReport, TableReport};
pub use source::{DocumentStream, MongoSource, SourceStore};
pub use target::{MysqlTarget, Row, TargetStore};
