// src/main.rs - ldb command line
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{error, info};

use ldb::logging::{init_tracing, LoggingConfig};
use ldb::{Ldb, LdbConfig, MutationKind, RedisCache};

#[derive(Parser)]
#[command(name = "ldb", version, about = "Run SQL through the ldb cache-aside layer")]
struct Cli {
    /// JSON configuration file (overrides LDB_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a single value: QUERY [GROUP [TTL]]
    Value {
        #[arg(required = true, num_args = 1..=3)]
        args: Vec<String>,
    },
    /// Read all rows as JSON: QUERY [GROUP [TTL]]
    Query {
        #[arg(required = true, num_args = 1..=3)]
        args: Vec<String>,
    },
    /// Run a mutating statement and print the insert id or affected row count
    Exec {
        statement: String,
        /// Report the last inserted id
        #[arg(long, conflicts_with = "affected_rows")]
        insert_id: bool,
        /// Report the number of affected rows
        #[arg(long)]
        affected_rows: bool,
    },
    /// Check the cache server
    Ping,
}

fn run(cli: Cli) -> ldb::Result<()> {
    if let Some(path) = &cli.config {
        std::env::set_var("LDB_CONFIG", path);
    }
    let config = LdbConfig::load()?;

    if let Command::Ping = cli.command {
        let cache = if config.cache_enabled {
            RedisCache::new(
                &config.cache_url(),
                std::time::Duration::from_millis(config.cache_timeout_ms),
            )?
        } else {
            RedisCache::disabled()
        };
        println!("{}", cache.ping()?);
        return Ok(());
    }

    let ldb = Ldb::from_config(&config)?;

    match cli.command {
        Command::Value { args } => {
            println!("{}", ldb.query_value_args(&args)?);
        }
        Command::Query { args } => {
            let rows = ldb.query_args(&args)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Exec {
            statement,
            insert_id,
            affected_rows,
        } => {
            let id = if insert_id {
                ldb.execute_as(&statement, MutationKind::InsertId)?
            } else if affected_rows {
                ldb.execute_as(&statement, MutationKind::AffectedRows)?
            } else {
                ldb.execute(&statement)?
            };
            println!("{}", id);
        }
        Command::Ping => {}
    }

    info!(stats = ?ldb.stats(), "Done");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(&LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {}", e);
            None
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "ldb command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
