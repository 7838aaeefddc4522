//! LearnSphere - learning-management API server
//! Mission: Serve courses and enrollments behind JWT authentication

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use learnsphere_backend::{
    auth::{JwtHandler, PasswordHasher},
    create_router, AppConfig, AppState,
};
use std::{net::SocketAddr, path::PathBuf};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "learnsphere", version, about = "LearnSphere API server")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(long, env = "LEARNSPHERE_BIND")]
    bind: Option<String>,

    /// Explicit .env file to load before reading configuration
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    load_env(args.env_file.as_deref());
    init_tracing();

    info!("🚀 LearnSphere backend starting");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e).context("Invalid configuration");
        }
    };

    let jwt_handler = JwtHandler::new(&config.jwt_secret, config.token_ttl)?
        .with_leeway(config.token_leeway_secs);
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    let state = AppState::new(&config.database.url, jwt_handler, hasher)
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    info!("Database ready at {}", config.database.url);

    if let Some((email, password)) = &config.bootstrap_admin {
        state
            .users
            .ensure_admin(email, password, &state.hasher)
            .context("Failed to bootstrap admin account")?;
    }

    let accounts = state.users.count_users()?;
    if accounts == 0 {
        warn!("No user accounts exist; set ADMIN_EMAIL and ADMIN_PASSWORD to create an admin");
    } else {
        info!("{} user accounts registered", accounts);
    }

    let app = create_router(state, &config.cors_allowed_origins);

    let addr = args.bind.unwrap_or(config.bind_addr);
    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn load_env(explicit: Option<&std::path::Path>) {
    if let Some(path) = explicit {
        if let Err(e) = dotenv::from_path(path) {
            eprintln!("Could not load {}: {}", path.display(), e);
        }
        return;
    }

    // Standard dotenv search (cwd + parents)
    let _ = dotenv();
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "learnsphere_backend=debug,learnsphere=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
