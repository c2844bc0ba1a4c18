use clap::{Args as ClapArgs, Parser, Subcommand};
use pulseboard_core::config;
use pulseboard_core::storage::load_store;
use pulseboard_server::api::auth::AuthConfig;
use pulseboard_server::api::handlers::AppState;
use pulseboard_server::api::{create_router, metrics, parse_cors_origins};
use pulseboard_server::commands;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pulseboard", about = "Survey analytics dashboard API", version)]
struct Args {
    /// Directory holding the record snapshot
    #[arg(short, long, global = true, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve(ServeArgs),
    /// Replace the stored records with the contents of a JSON array file
    Seed {
        /// JSON file containing an array of record objects
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Report what the stored snapshot contains
    Check,
}

#[derive(ClapArgs)]
struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    shutdown_timeout: u64,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(config::DEFAULT_PORT),
            shutdown_timeout: config::DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "pulseboard_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "pulseboard_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let args = Args::parse();

    if args.data_dir.exists() && !args.data_dir.is_dir() {
        eprintln!(
            "Error: data_dir '{}' exists but is not a directory",
            args.data_dir.display()
        );
        std::process::exit(1);
    }

    match args.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(serve_args) => serve(&args.data_dir, serve_args).await,
        Command::Seed { file } => {
            commands::seed(&args.data_dir, &file)?;
            Ok(())
        }
        Command::Check => {
            commands::check(&args.data_dir)?;
            Ok(())
        }
    }
}

async fn serve(data_dir: &Path, args: ServeArgs) -> Result<(), Box<dyn Error>> {
    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }

    let auth = AuthConfig::from_sources(
        std::env::var("PULSEBOARD_API_KEYS").ok().as_deref(),
        std::env::var("PULSEBOARD_API_KEY").ok().as_deref(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    tracing::info!(keys = auth.len(), "API key authentication enabled");

    let allowed_origins = parse_cors_origins(std::env::var("PULSEBOARD_CORS_ORIGINS").ok().as_deref());

    let store = load_store(data_dir)?;
    if store.is_empty() {
        tracing::warn!("Record store is empty; run `pulseboard seed --file <json>` to import data");
    }

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let state = AppState {
        store: store.clone(),
        auth: Arc::new(auth),
        prometheus_handle,
        allowed_origins: allowed_origins.clone(),
        start_time: Instant::now(),
    };
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        data_dir = %data_dir.display(),
        records = store.len(),
        cors_origins = ?allowed_origins,
        "pulseboard ready"
    );

    // Spawn store metrics background task
    let metrics_store = store.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(config::METRICS_REFRESH_SECS));
        loop {
            interval.tick().await;
            metrics::update_store_metrics(&metrics_store);
        }
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                wait_for_signal().await;
                let _ = signal_tx.send(());
            })
            .await
    });

    tokio::select! {
        finished = &mut server => finished??,
        _ = signal_rx => {
            let deadline = Duration::from_secs(args.shutdown_timeout);
            match tokio::time::timeout(deadline, &mut server).await {
                Ok(finished) => finished??,
                Err(_) => {
                    tracing::error!(
                        "Shutdown drain timeout ({}s) exceeded, aborting in-flight requests",
                        args.shutdown_timeout
                    );
                    server.abort();
                }
            }
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
