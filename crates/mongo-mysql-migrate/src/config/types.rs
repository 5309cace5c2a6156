//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (MongoDB).
    pub source: SourceConfig,

    /// Target database configuration (MySQL).
    pub target: TargetConfig,
}

/// Source database (MongoDB) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub uri: String,

    /// Database name.
    pub database: String,
}

/// Target database (MySQL) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// Session time zone offset applied on connect (default: "+00:00").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_timezone() -> String {
    "+00:00".to_string()
}
