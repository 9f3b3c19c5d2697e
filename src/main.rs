mod api;
mod backoffice;
mod cli;
mod config;
mod forms;
mod listing;
mod models;
mod notify;
mod session;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use cli::{App, Cli, Reported};
use config::Config;
use notify::ConsoleNotifier;
use session::{FileSessionStore, MemorySessionStore, SessionStore};

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = config::load_dotenv();
    let cli = Cli::parse();

    // Config first so the log level can come from the environment
    let config = Config::from_env();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    // RUST_LOG wins over everything else
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = dotenv {
        debug!("Loaded {}", path.display());
    }

    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);
    debug!("API: {}", config.api_url);

    let store: Arc<dyn SessionStore> = if cli.ephemeral {
        Arc::new(MemorySessionStore::new())
    } else {
        let files = FileSessionStore::new(config.session_dir.clone());
        debug!("Session cache: {}", files.dir().display());
        Arc::new(files)
    };

    let mut app = match App::new(&config, store, Arc::new(ConsoleNotifier)) {
        Ok(app) => app,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match app.run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // already shown as a notice
            if e.downcast_ref::<Reported>().is_none() {
                eprintln!("❌ {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
