//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] mongodb::error::Error),

    /// Destination database connection or query error
    #[error("Destination database error: {0}")]
    Target(#[from] mysql_async::Error),

    /// A source document could not be decoded into its typed representation
    #[error("Failed to decode {collection} document {record}: {message}")]
    Decode {
        collection: String,
        record: String,
        message: String,
    },

    /// A destination insert failed for a specific record
    #[error("Insert into {table} failed for record {record}: {message}")]
    Insert {
        table: String,
        record: String,
        message: String,
    },

    /// An insert hit an existing primary key or unique constraint
    #[error("Duplicate key in table {table}")]
    DuplicateKey { table: String },

    /// Destination schema preparation failed
    #[error("Schema preparation failed: {0}")]
    Schema(String),

    /// A named migration step failed; wraps the underlying cause
    #[error("Migration step '{step}' failed: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Decode error with record context.
    pub fn decode(
        collection: impl Into<String>,
        record: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        MigrateError::Decode {
            collection: collection.into(),
            record: record.into(),
            message: message.to_string(),
        }
    }

    /// Create an Insert error with record context.
    pub fn insert(
        table: impl Into<String>,
        record: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        MigrateError::Insert {
            table: table.into(),
            record: record.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an error with the name of the failed migration step.
    pub fn step(step: impl Into<String>, source: MigrateError) -> Self {
        MigrateError::Step {
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
