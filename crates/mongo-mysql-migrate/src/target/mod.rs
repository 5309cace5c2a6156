//! Target store: row writes into MySQL.
//!
//! The write interface is as narrow as the migration needs: plain insert
//! (fails on constraint violation), insert-or-ignore for denormalized child
//! rows, a primary-key existence probe and a row count. Everything is
//! parameterized; table and column names come from compile-time constants
//! in [`crate::model::rows`] and are backtick-quoted anyway.

pub mod schema;

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Pool, Value};
use tracing::info;

use crate::config::TargetConfig;
use crate::error::{MigrateError, Result};

/// One destination row as ordered `(column, value)` pairs.
pub type Row = Vec<(&'static str, Value)>;

/// MySQL error code for a primary-key or unique-constraint violation.
const ER_DUP_ENTRY: u16 = 1062;

/// Write access to the destination store.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Insert a row. Fails with [`MigrateError::DuplicateKey`] when the row
    /// violates a primary-key or unique constraint.
    async fn insert(&self, table: &str, row: Row) -> Result<()>;

    /// Insert a row, silently dropping it when it would violate a
    /// uniqueness constraint. Returns whether a row was actually written.
    async fn insert_ignore(&self, table: &str, row: Row) -> Result<bool>;

    /// Whether a row with the given primary key exists.
    async fn exists(&self, table: &str, id: &str) -> Result<bool>;

    /// Count the rows of a table.
    async fn count_rows(&self, table: &str) -> Result<u64>;
}

/// MySQL-backed target store over a connection pool.
pub struct MysqlTarget {
    pool: Pool,
}

impl MysqlTarget {
    /// Connect to MySQL and verify the connection.
    ///
    /// The session character set and time zone are fixed at connect time, so
    /// every pooled connection binds naive UTC datetimes consistently.
    pub async fn connect(config: &TargetConfig) -> Result<Self> {
        let opts: Opts = OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .tcp_port(config.port)
            .db_name(Some(&config.database))
            .user(Some(&config.user))
            .pass(Some(&config.password))
            .init(vec![
                "SET NAMES utf8mb4".to_string(),
                format!("SET time_zone = '{}'", config.timezone),
            ])
            .into();
        let pool = Pool::new(opts);

        let mut conn = pool.get_conn().await?;
        conn.query_drop("SELECT 1").await?;
        drop(conn);

        info!(
            "Connected to MySQL target: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { pool })
    }

    /// Test the database connection.
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop("SELECT 1").await?;
        Ok(())
    }

    /// Execute a single DDL statement.
    pub(crate) async fn execute(&self, sql: &str) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop(sql).await?;
        Ok(())
    }

    /// Quote a MySQL identifier.
    fn quote_ident(name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// Build a placeholder insert statement for one row.
    fn build_insert(verb: &str, table: &str, row: &Row) -> String {
        let cols: Vec<String> = row.iter().map(|(col, _)| Self::quote_ident(col)).collect();
        format!(
            "{} INTO {} ({}) VALUES ({})",
            verb,
            Self::quote_ident(table),
            cols.join(", "),
            vec!["?"; row.len()].join(", ")
        )
    }

    fn params(row: Row) -> Vec<Value> {
        row.into_iter().map(|(_, value)| value).collect()
    }
}

fn is_duplicate_key(err: &mysql_async::Error) -> bool {
    matches!(err, mysql_async::Error::Server(server) if server.code == ER_DUP_ENTRY)
}

#[async_trait]
impl TargetStore for MysqlTarget {
    async fn insert(&self, table: &str, row: Row) -> Result<()> {
        let sql = Self::build_insert("INSERT", table, &row);
        let mut conn = self.pool.get_conn().await?;
        match conn.exec_drop(&sql, Self::params(row)).await {
            Ok(()) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(MigrateError::DuplicateKey {
                table: table.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_ignore(&self, table: &str, row: Row) -> Result<bool> {
        let sql = Self::build_insert("INSERT IGNORE", table, &row);
        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(&sql, Self::params(row)).await?;
        Ok(conn.affected_rows() > 0)
    }

    async fn exists(&self, table: &str, id: &str) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE `id` = ? LIMIT 1",
            Self::quote_ident(table)
        );
        let mut conn = self.pool.get_conn().await?;
        let found: Option<u8> = conn.exec_first(&sql, (id,)).await?;
        Ok(found.is_some())
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::quote_ident(table));
        let mut conn = self.pool.get_conn().await?;
        let count: Option<u64> = conn.query_first(&sql).await?;
        Ok(count.unwrap_or(0))
    }
}
