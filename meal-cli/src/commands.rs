//! CLI Commands
//!
//! Command definitions for the meal CLI. Every global option can also be
//! set from the environment (or a `.env` file).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// School meal claim ledger CLI
#[derive(Parser, Debug)]
#[command(name = "meal")]
#[command(version)]
#[command(about = "School meal allocation and claim ledger")]
pub struct Cli {
    /// SQLite database file (env: MEAL_DB_PATH)
    #[arg(long, env = "MEAL_DB_PATH", default_value = "meal.db")]
    pub db_path: String,

    /// Milliseconds to wait on a locked database (env: MEAL_DB_BUSY_TIMEOUT_MS)
    #[arg(long, env = "MEAL_DB_BUSY_TIMEOUT_MS", default_value = "5000")]
    pub busy_timeout_ms: u64,

    /// Prefix of scannable student tokens (env: MEAL_TOKEN_PREFIX)
    #[arg(long, env = "MEAL_TOKEN_PREFIX", default_value = meal_core::DEFAULT_TOKEN_PREFIX)]
    pub token_prefix: String,

    /// School calendar offset, minutes east of UTC (env: MEAL_UTC_OFFSET_MINUTES)
    #[arg(
        long,
        env = "MEAL_UTC_OFFSET_MINUTES",
        default_value = "0",
        allow_hyphen_values = true
    )]
    pub utc_offset_minutes: i32,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable
    #[default]
    Pretty,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema
    Init,

    /// Start the API server (initializes the schema first)
    Start {
        /// Host to bind to (env: MEAL_API_HOST)
        #[arg(short = 'H', long, env = "MEAL_API_HOST", default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on (env: MEAL_API_PORT)
        #[arg(short, long, env = "MEAL_API_PORT", default_value = "3000")]
        port: u16,
        /// Disable permissive CORS
        #[arg(long)]
        no_cors: bool,
    },

    /// Load governments, schools, menus and students from a JSON file
    Seed {
        /// Reference data file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Check the health of a running server
    Status {
        /// API server URL
        #[arg(short, long, env = "MEAL_API_URL", default_value = "http://localhost:3000")]
        api_url: String,
    },
}
