//! # Reactorcide Service
//!
//! Binary entry point for the Reactorcide HTTP service: loads configuration
//! from the environment, wires the default in-memory application state, and
//! serves the REST/webhook surface built in [`reactorcide_service`].

use reactorcide_service::config::ServiceConfig;
use reactorcide_service::{create_router, AppState};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reactorcide_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting reactorcide service");

    let config_file = std::env::var("REACTORCIDE_CONFIG_FILE").ok();
    let config = match ServiceConfig::load(config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(3);
        }
    };
    let host = config.server.host.clone();
    let port = config.server.port;

    let state = match AppState::new_default(config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    if let Ok(token) = std::env::var("REACTORCIDE_BOOTSTRAP_ADMIN_TOKEN") {
        let user_id = std::env::var("REACTORCIDE_BOOTSTRAP_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        state.bootstrap_admin_token(&token, &user_id);
        info!(user_id = %user_id, "bootstrapped admin token from environment");
    }

    let app = create_router(state);

    let addr = format!("{host}:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server exited with an error");
        std::process::exit(2);
    }
}
