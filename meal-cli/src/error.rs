//! Failures of the `meal` binary
//!
//! Each variant maps to its own process exit code so scripts driving
//! `meal seed` or `meal status` can tell a bad reference file from an
//! unreachable server.

use meal_core::MealError;
use meal_db::MealDbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// A flag or environment value the ledger cannot run with
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// No answer from the server at `--api-url`
    #[error("meal API unreachable: {message}")]
    Unreachable { message: String },

    /// The server answered with a non-success status
    #[error("meal API answered {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Reading a reference data file
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    /// Reference data or a health body that is not the expected JSON
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// A ledger rule refused the operation
    #[error("{0}")]
    Ledger(#[from] MealError),

    #[error("database: {0}")]
    Database(#[from] MealDbError),

    /// The API server stopped or never bound its address
    #[error("server stopped: {message}")]
    Serve { message: String },
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        CliError::Config {
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        CliError::Unreachable {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        CliError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn serve(message: impl Into<String>) -> Self {
        CliError::Serve {
            message: message.into(),
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => 1,
            CliError::Unreachable { .. } => 3,
            CliError::Rejected { .. } => 4,
            CliError::Io(_) => 5,
            CliError::Json(_) => 6,
            CliError::Http(_) => 7,
            CliError::Ledger(_) => 10,
            CliError::Serve { .. } => 30,
            CliError::Database(_) => 31,
        }
    }
}
