//! Meal CLI - Command Line Interface
//!
//! Operates a school meal claim ledger: creates the database, loads
//! reference data, serves the HTTP API and probes a running server.
//!
//! # Usage
//!
//! ```text
//! meal [OPTIONS] <COMMAND>
//!
//! Commands:
//!   init    Create the database schema
//!   start   Start the API server
//!   seed    Load governments, schools, menus and students from JSON
//!   status  Check the health of a running server
//!
//! Options:
//!   --db-path <PATH>               SQLite file [env: MEAL_DB_PATH] [default: meal.db]
//!   --token-prefix <PREFIX>        [env: MEAL_TOKEN_PREFIX] [default: STUDENT]
//!   --utc-offset-minutes <MIN>     [env: MEAL_UTC_OFFSET_MINUTES] [default: 0]
//!   --log-format <json|pretty>     [default: pretty]
//! ```

pub mod client;
pub mod commands;
pub mod error;
pub mod handler;

pub use client::MealClient;
pub use commands::{Cli, Commands, LogFormat};
pub use error::{CliError, CliResult};

/// Meal CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
