use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use reclaimer::{
    config::ReclaimerConfig,
    db::{DbPool, DbPoolRef},
    metabase::{ObjectStore, SqliteObjectStore},
    observability, payments,
    pending_delete::Chore,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

/// CLI arguments for the reclaimer
#[derive(Parser, Debug)]
#[command(version, about = "Pending-deletion reclamation chore", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file
    #[arg(short, long, global = true, default_value = "reclaimer.toml")]
    config: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run the chore on its interval until interrupted (default)
    Run,
    /// Run every enabled flow once and exit
    ///
    /// Exits non-zero if any flow reported an error.
    Once,
    /// Run database migrations and exit
    Migrate,
    /// Show enabled compile-time features
    Features,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Once) => run_once(&args.config).await,
        Some(Command::Migrate) => run_migrate(&args.config).await,
        Some(Command::Features) => run_features(),
        Some(Command::Run) | None => run_chore(&args.config).await,
    }
}

fn load_config(path: &PathBuf) -> ReclaimerConfig {
    let config = match ReclaimerConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = observability::init_tracing(&config.observability) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    config
}

async fn connect(config: &ReclaimerConfig) -> Arc<DbPool> {
    let db = match DbPool::from_config(&config.database).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if config.database.run_migrations()
        && let Err(e) = db.run_migrations().await
    {
        tracing::error!(error = %e, "Database migrations failed");
        std::process::exit(1);
    }

    db
}

fn build_chore(config: &ReclaimerConfig, db: Arc<DbPool>) -> Chore {
    let objects: Arc<dyn ObjectStore> = match db.pool() {
        DbPoolRef::Sqlite(pool) => Arc::new(SqliteObjectStore::new(pool.clone())),
    };

    let credit_cards = match payments::from_config(&config.payments, db.clone()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize payment provider");
            std::process::exit(1);
        }
    };

    Chore::new(config.pending_delete.clone(), db, objects, credit_cards)
}

async fn run_chore(config_path: &PathBuf) {
    let config = load_config(config_path);
    tracing::info!(config_file = %config_path.display(), "Starting reclaimer");

    if let Err(e) = observability::metrics::init_metrics(&config.observability.metrics) {
        tracing::error!(error = %e, "Failed to initialize metrics");
        std::process::exit(1);
    }

    let db = connect(&config).await;
    let chore = Arc::new(build_chore(&config, db));

    let cancel = CancellationToken::new();
    let task_tracker = TaskTracker::new();
    {
        let chore = chore.clone();
        let cancel = cancel.clone();
        task_tracker.spawn(async move {
            if let Err(e) = chore.run(cancel).await {
                tracing::error!(error = %e, "Pending deletion chore stopped");
            }
        });
    }
    task_tracker.close();

    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, waiting for the current tick to finish...");
        }
        _ = task_tracker.wait() => {}
    }

    cancel.cancel();
    chore.close();

    match tokio::time::timeout(Duration::from_secs(30), task_tracker.wait()).await {
        Ok(()) => tracing::info!("Reclaimer stopped"),
        Err(_) => tracing::warn!("Timeout waiting for the chore to stop"),
    }
}

async fn run_once(config_path: &PathBuf) {
    let config = load_config(config_path);
    if !config.pending_delete.enabled {
        tracing::warn!("pending_delete.enabled is false; running enabled flows once anyway");
    }

    let db = connect(&config).await;
    let chore = build_chore(&config, db);

    let report = chore.run_once().await;
    if !report.is_ok() {
        std::process::exit(1);
    }
}

async fn run_migrate(config_path: &PathBuf) {
    let config = load_config(config_path);

    tracing::info!(
        config_file = %config_path.display(),
        "Running database migrations"
    );

    if config.database.is_none() {
        eprintln!("Error: Database is not configured. Nothing to migrate.");
        std::process::exit(1);
    }

    match DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => tracing::info!("Database migrations completed successfully"),
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    }
}

fn run_features() {
    let version = env!("CARGO_PKG_VERSION");
    let features: &[(&str, bool)] = &[
        ("server", cfg!(feature = "server")),
        ("database-sqlite", cfg!(feature = "database-sqlite")),
        ("native-http", cfg!(feature = "native-http")),
        ("prometheus", cfg!(feature = "prometheus")),
    ];

    println!("reclaimer {}", version);
    for (name, enabled) in features {
        println!("  [{}] {}", if *enabled { "x" } else { " " }, name);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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
}
