//! Command Handlers

use meal_api::{run_server, ApiConfig};
use meal_db::{DbConfig, MealDatabase, ReferenceData};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::client::MealClient;
use crate::commands::{Cli, Commands};
use crate::error::{CliError, CliResult};

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Init => handle_init(&cli).await,
        Commands::Start {
            host,
            port,
            no_cors,
        } => handle_start(&cli, host.clone(), *port, !*no_cors).await,
        Commands::Seed { file } => handle_seed(&cli, file).await,
        Commands::Status { api_url } => handle_status(api_url).await,
    }
}

fn db_config(cli: &Cli) -> DbConfig {
    DbConfig {
        path: cli.db_path.clone(),
        busy_timeout: Duration::from_millis(cli.busy_timeout_ms),
    }
}

/// Open the configured database and make sure the schema exists
async fn open_database(cli: &Cli) -> CliResult<MealDatabase> {
    let config = db_config(cli);
    let database = MealDatabase::open(&config)?;
    database.init_schema().await?;
    Ok(database)
}

/// Handle database initialization
async fn handle_init(cli: &Cli) -> CliResult<()> {
    println!("Initializing meal database...");
    println!("  Path: {}", cli.db_path);

    open_database(cli).await?;

    println!("Database schema initialized successfully.");
    Ok(())
}

/// Handle starting the API server
async fn handle_start(cli: &Cli, host: String, port: u16, enable_cors: bool) -> CliResult<()> {
    let config = ApiConfig {
        host,
        port,
        enable_cors,
        token_prefix: cli.token_prefix.clone(),
        utc_offset_minutes: cli.utc_offset_minutes,
    };
    // Reject a bad prefix or offset before touching the database
    config
        .service_settings()
        .map_err(|e| CliError::config(e.to_string()))?;

    println!("Starting meal API server...");
    println!("  Host: {}:{}", config.host, config.port);
    println!("  Database: {}", cli.db_path);

    let database = Arc::new(open_database(cli).await?);

    run_server(config, database)
        .await
        .map_err(|e| CliError::serve(e.to_string()))
}

/// Handle loading reference data
async fn handle_seed(cli: &Cli, file: &Path) -> CliResult<()> {
    let raw = std::fs::read_to_string(file)?;
    let data: ReferenceData = serde_json::from_str(&raw)?;

    let database = open_database(cli).await?;
    let report = database.references.seed(data).await?;

    tracing::info!(
        file = %file.display(),
        governments = report.governments,
        schools = report.schools,
        menus = report.menus,
        students = report.students,
        "reference data seeded"
    );
    println!("Seeded {}:", file.display());
    println!("  Governments: {}", report.governments);
    println!("  Schools:     {}", report.schools);
    println!("  Menus:       {}", report.menus);
    println!("  Students:    {}", report.students);
    Ok(())
}

/// Handle health check of a running server
async fn handle_status(api_url: &str) -> CliResult<()> {
    let client = MealClient::new(api_url)?;
    println!("Checking meal API status at {}...", client.base_url());

    let health = client.health().await?;
    println!("  Status:   {}", health.status);
    println!("  Version:  {}", health.version);

    // /ready answers 503 when the database is unreachable
    let ready = client.ready().await?;
    println!("  Database: {}", ready.database);
    Ok(())
}
