use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use fileshare::db::FileRecordRepository;
use fileshare::{Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

fn load_config() -> Config {
    if !Path::new(CONFIG_PATH).exists() {
        return Config::default();
    }

    match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    }
}

async fn run(config: Config) -> fileshare::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let count = FileRecordRepository::new(db.pool()).count().await?;
    info!("{} file(s) on record", count);

    let server = WebServer::from_database(&config, db.clone())?;
    server.run().await?;

    db.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut config = load_config();
    if let Err(e) = config.apply_env_overrides() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = fileshare::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        fileshare::logging::init_console_only(&config.logging.level);
    }

    info!(
        "fileshare configured on {}:{}",
        config.server.host, config.server.port
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}
