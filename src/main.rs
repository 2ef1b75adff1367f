//! play-ledger binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use play_ledger::api::{serve_with_state, AppState};
use play_ledger::cli::{self, Args};
use play_ledger::config::Config;
use play_ledger::store::{FileKeyValueStore, RestRecordStore};
use play_ledger::{logging, ActiveSessionTracker, RecordStore};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args)?;
    logging::try_init_with_level(config.log_filter()).ok();

    info!("play-ledger v{}", env!("CARGO_PKG_VERSION"));

    // Both are fatal: nothing works without the record store
    let rest = config.rest_config()?;
    let server_config = config.to_server_config()?;

    let records: Arc<dyn RecordStore> = Arc::new(RestRecordStore::new(rest)?);
    let device = Arc::new(FileKeyValueStore::in_dir(&config.device.data_dir));
    info!(path = %device.path().display(), "device state store ready");

    let mut tracker = ActiveSessionTracker::new(Arc::clone(&records), device);
    if let Some(ref user_id) = config.store.user_id {
        tracker = tracker.with_user_id(user_id.clone());
    }
    let state = tracker.restore().await?;
    info!(%state, "tracker initialized");

    let app = AppState::from_tracker(tracker, records);
    app.spawn_list_watcher();

    serve_with_state(server_config, app).await?;
    info!("play-ledger stopped");
    Ok(())
}
