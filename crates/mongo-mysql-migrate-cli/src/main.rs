//! mongo-mysql-migrate CLI - billing dataset migration from MongoDB to MySQL.

use clap::{Parser, Subcommand};
use mongo_mysql_migrate::{Config, MigrateError, Migrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "mongo-mysql-migrate")]
#[command(about = "Billing dataset migration from MongoDB to MySQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full migration pipeline
    Run {
        /// Drop and recreate all destination tables before migrating
        #[arg(long)]
        reset: bool,
    },

    /// Compare per-entity counts between source and destination
    Validate,

    /// Test both database connections
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { reset } => {
            let migrator = Migrator::new(config).await?;
            migrator.prepare_schema(reset).await?;
            let summary = migrator.run().await?;

            if cli.output_json {
                println!("{}", summary.to_json()?);
            } else {
                println!("\nMigration completed!");
                println!("  Run ID: {}", summary.run_id);
                println!("  Duration: {:.2}s", summary.duration_seconds);
                println!("  Documents seen: {}", summary.documents_seen);
                println!("  Rows moved: {}", summary.rows_moved);
                println!("  Rows skipped: {}", summary.rows_skipped);
            }
        }

        Commands::Validate => {
            let migrator = Migrator::new(config).await?;
            let checks = migrator.validate().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&checks)?);
            } else {
                let mut mismatches = 0;
                for check in &checks {
                    let status = if check.matches { "ok" } else { "MISMATCH" };
                    println!(
                        "  {:<10} {} -> {} (source={}, destination={})",
                        status, check.collection, check.table, check.source, check.destination
                    );
                    if !check.matches {
                        mismatches += 1;
                    }
                }
                if mismatches > 0 {
                    println!("\n{} entities differ between source and destination", mismatches);
                } else {
                    println!("\nAll entity counts match");
                }
            }
        }

        Commands::HealthCheck => {
            let migrator = Migrator::new(config).await?;
            migrator.health_check().await?;
            println!("Both connections healthy");
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().try_init().map_err(|e| e.to_string())
    } else {
        subscriber.try_init().map_err(|e| e.to_string())
    }
}
