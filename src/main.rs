use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use eventos_api::config::{Config, StoreBackend};
use eventos_api::{build_router, database, AppState};

/// HTTP API over the "eventos" document collection.
#[derive(Parser, Debug)]
#[command(name = "eventos-api", version, about)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Path to the service account key file (overrides GOOGLE_APPLICATION_CREDENTIALS)
    #[arg(long)]
    credentials: Option<String>,

    /// Keep events in process memory instead of Firestore
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    let args = Args::parse();

    init_tracing();
    info!("Starting eventos API server...");

    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(credentials) = args.credentials {
        config.credentials_path = credentials;
    }
    if args.memory {
        config.store_backend = StoreBackend::Memory;
    }
    info!("Configuration loaded");

    let store = database::new_store(&config).await?;
    info!("Document store ready ({:?})", config.store_backend);

    let app = build_router(AppState::new(store));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutting down gracefully...");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eventos_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
