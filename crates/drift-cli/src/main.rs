//! drift command-line interface.
//!
//! Connects to the target database, opens the invocation transaction, and
//! dispatches to the library. All configuration comes in through flags; the
//! transaction commits only when the requested command succeeds.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use drift::Migrator;
use tokio_postgres::NoTls;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Declarative schema migrations for PostgreSQL.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Database host name
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Database port number
    #[arg(long, default_value_t = 5432)]
    port: u16,

    /// Database user
    #[arg(long, default_value = "postgres")]
    user: String,

    /// Database user password
    #[arg(long, default_value = "postgres")]
    password: String,

    /// Database name
    #[arg(long)]
    db: String,

    /// Path to the schema SQL files
    #[arg(long = "sql-path", default_value = "./")]
    sql_path: PathBuf,

    /// Path where migration files are generated and read from
    #[arg(long = "migrations-path", default_value = "./drift_migrations")]
    migrations_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute schema changes under --sql-path and write the next migration file
    Make,
    /// Run pending migration files from --migrations-path
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let conn_str = format!(
        "host={} port={} user={} password={} dbname={}",
        cli.host, cli.port, cli.user, cli.password, cli.db
    );
    let (mut client, connection) = tokio_postgres::connect(&conn_str, NoTls)
        .await
        .context("failed to connect to the database")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("connection error: {e}");
        }
    });

    let tx = client.transaction().await?;
    let migrator = Migrator::new(&tx, &cli.sql_path, &cli.migrations_path);
    migrator.init().await?;

    match cli.command {
        Command::Make => {
            migrator.make().await?;
        }
        Command::Migrate => {
            migrator.migrate().await?;
        }
    }

    tx.commit().await?;
    Ok(())
}
