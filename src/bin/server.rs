use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledger_rs::{
    AppState, build_router, graceful_shutdown, logging_middleware, open_database,
    parse_port_or_default,
};

/// The REST API server for ledger_rs.
///
/// The secret for signing bearer tokens is read from the `JWT_SECRET` environment variable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The IP address to listen on.
    #[arg(long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// The port to serve the API from. Falls back to the `PORT` environment variable, then 3000.
    #[arg(short, long)]
    port: Option<u16>,

    /// File path to write debug logs to.
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// How many hours bearer tokens stay valid.
    #[arg(long, default_value_t = 24)]
    token_hours: i64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(args.log_path.as_deref()) {
        eprintln!("Could not open the log file: {error}");
        return ExitCode::FAILURE;
    }

    let secret = match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::error!("The environment variable 'JWT_SECRET' must be set");
            return ExitCode::FAILURE;
        }
    };

    let port = args
        .port
        .unwrap_or_else(|| parse_port_or_default("PORT", 3000));
    let addr = SocketAddr::new(args.address, port);

    let state = match open_database(&args.db_path)
        .and_then(|connection| AppState::new(connection, &secret))
    {
        Ok(state) => state.with_token_duration(Duration::hours(args.token_hours)),
        Err(error) => {
            tracing::error!("Could not open the database at {}: {error}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("The server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging(log_path: Option<&Path>) -> Result<(), std::io::Error> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = match log_path {
        Some(path) => {
            let log_file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(log_file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
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
        // Errors are already logged by the error type, so `TraceLayer` does not need to log 5xx
        // responses.
        .on_failure(());

    router.layer(tracing_layer)
}
