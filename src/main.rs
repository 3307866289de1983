use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shaderhub::auth::{PasswordHasher, SessionStore};
use shaderhub::config::ServerConfig;
use shaderhub::error::Error;
use shaderhub::server::validation::{validate_password, validate_username};
use shaderhub::server::{AppState, create_router};
use shaderhub::store::{MemoryStore, Store};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Parser)]
#[command(name = "shaderhub")]
#[command(about = "A shader sharing server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory holding the snapshot file
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Lifetime of a login session, in hours
        #[arg(long, default_value = "24")]
        session_ttl_hours: i64,

        /// Do not seed the default tags into an empty data directory
        #[arg(long)]
        no_seed: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create a user directly in the snapshot file
    CreateUser {
        /// Data directory holding the snapshot file
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,
    },
}

fn run_create_user(data_dir: PathBuf, username: &str, password: &str) -> anyhow::Result<()> {
    let username = username.trim();
    validate_username(username)?;
    validate_password(password)?;

    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    let store = MemoryStore::open(config.snapshot_path())?;
    let hash = PasswordHasher::new().hash(password)?;

    let user = match store.create_user(username, &hash) {
        Ok(user) => user,
        Err(Error::AlreadyExists) => bail!("User '{username}' already exists"),
        Err(e) => return Err(e.into()),
    };
    store.flush()?;

    println!("Created user '{}' with id {}", user.username, user.id);
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let session_ttl = config.session_ttl()?;
    let store = Arc::new(MemoryStore::open(config.snapshot_path())?);

    if config.seed_defaults && store.is_empty() {
        let tags = store.seed_default_tags()?;
        info!("Seeded {} default tags", tags.len());
    }

    let state = Arc::new(AppState::new(
        store.clone(),
        SessionStore::new(session_ttl),
    ));

    let purge_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = purge_state.sessions.purge_expired();
            if purged > 0 {
                info!("Purged {purged} expired sessions");
            }
        }
    });

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, writing final snapshot");
    store.flush()?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shaderhub=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::CreateUser {
                data_dir,
                username,
                password,
            } => {
                run_create_user(data_dir, &username, &password)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            session_ttl_hours,
            no_seed,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir,
                session_ttl_hours,
                seed_defaults: !no_seed,
            };
            serve(config).await?;
        }
    }

    Ok(())
}
