use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finanzas_rs::{
    AppState, SheetSync, build_router, graceful_shutdown, import_seed, load_seed_file,
};

/// The web server for recording personal income and expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "FINANZAS_DB_PATH", default_value = "finanzas.db")]
    db_path: PathBuf,

    /// File path to the JSON file with the categories, subcategories and users to import.
    #[arg(long, env = "FINANZAS_SEED_PATH", default_value = "data.json")]
    seed_path: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, used to pick today's date.
    #[arg(long, env = "FINANZAS_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The URL that new transactions are posted to. Sync is disabled if unset.
    #[arg(long, env = "SHEET_SYNC_URL")]
    sync_url: Option<String>,

    /// How many seconds to wait for the sync endpoint before giving up.
    #[arg(long, default_value_t = 10)]
    sync_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let sheet_sync = args.sync_url.as_deref().map(|url| {
        SheetSync::new(url, Duration::from_secs(args.sync_timeout_secs))
            .expect("Could not create the HTTP client for the sync endpoint.")
    });

    match &sheet_sync {
        Some(sheet_sync) => tracing::info!("syncing new transactions to {}", sheet_sync.url()),
        None => tracing::info!("SHEET_SYNC_URL is not set, transactions are only stored locally"),
    }

    let connection = Connection::open(&args.db_path).expect("Could not open the database.");
    let state = AppState::new(connection, &args.timezone, args.seed_path, sheet_sync)
        .expect("Could not create the app state.");

    bootstrap_from_seed_file(&state);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

/// Add the rows of the seed file that are not in the database yet.
///
/// A missing seed file only logs a warning. A broken one is logged and the
/// server starts anyway, the import page reports the problem again.
fn bootstrap_from_seed_file(state: &AppState) {
    let load = match load_seed_file(&state.seed_path) {
        Ok(load) => load,
        Err(error) => {
            tracing::error!("skipping start-up import: {error}");
            return;
        }
    };

    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire the database lock.");

    if let Err(error) = import_seed(&load.data, &connection) {
        tracing::error!(
            "could not import seed file {}: {error}",
            state.seed_path.display()
        );
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
