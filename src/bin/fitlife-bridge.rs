//! Message bridge for FitLife
//!
//! Serves length-prefixed JSON requests on stdin and writes responses to
//! stdout until the UI shell closes the pipe. Logs go to stderr.

use fitlife_lib::{bridge::Bridge, config::Config, controllers::Controllers, open_store, session::SessionContext};
use log::{error, info, warn};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FITLIFE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // Installs the log -> tracing forwarder as well.
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .is_err()
    {
        warn!("Tracing subscriber already installed");
    }
}

fn main() -> ExitCode {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let db = match open_store(&config) {
        Ok(db) => db,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let controllers = Controllers::new(&db, config.bcrypt_cost, config.history_limit);
    let mut context = SessionContext::new();
    match controllers.auth.restore_session() {
        Ok(Some(session)) => {
            info!("Restored session for user {}", session.user_id);
            context.begin(session);
        }
        Ok(None) => {}
        Err(e) => warn!("Could not restore session: {e}"),
    }

    let mut bridge = Bridge::new(controllers, context);
    if let Err(e) = bridge.run(io::stdin().lock(), io::stdout().lock()) {
        error!("Bridge error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
